//! Tracing subscriber setup

use anyhow::Context;
use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber
///
/// `RUST_LOG` wins when set; otherwise `default_directive` (e.g.
/// `"info,ui_state=debug"`) is used. Fails if a global subscriber is
/// already installed.
pub fn init(default_directive: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)
            .with_context(|| format!("Invalid log directive \"{}\"", default_directive))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to install tracing subscriber")
}
