//! Loading options and transport settings

use anyhow::Context;
use map_api::ApiClientConfig;
use std::path::Path;
use std::time::Duration;
use ui_state::UiOptions;

/// Read overlay options from a JSON file
pub fn load_options(path: impl AsRef<Path>) -> anyhow::Result<UiOptions> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read options file {}", path.display()))?;
    let options = UiOptions::from_json_str(&raw)
        .with_context(|| format!("Invalid options in {}", path.display()))?;
    tracing::debug!("Loaded options from {}", path.display());
    Ok(options)
}

/// Transport settings from `MAP_API_BASE_URL`, `MAP_API_KEY` and the
/// optional `MAP_API_TIMEOUT_SECS`
pub fn api_config_from_env() -> anyhow::Result<ApiClientConfig> {
    let base_url = std::env::var("MAP_API_BASE_URL").context("MAP_API_BASE_URL is not set")?;
    let api_key = std::env::var("MAP_API_KEY").context("MAP_API_KEY is not set")?;
    let mut config = ApiClientConfig::new(base_url, api_key);

    if let Ok(raw) = std::env::var("MAP_API_TIMEOUT_SECS") {
        let secs: u64 = raw
            .parse()
            .with_context(|| format!("MAP_API_TIMEOUT_SECS is not a number: {}", raw))?;
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}
