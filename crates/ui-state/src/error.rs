//! Error types for the UI layer

use thiserror::Error;

/// Errors raised by store and controller operations
#[derive(Debug, Error)]
pub enum UiError {
    /// An operation was requested in a state that does not allow it
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// A data service call failed
    #[error("API error: {0}")]
    Api(#[from] map_api::Error),

    /// String tables could not be loaded
    #[error("Localization error: {0}")]
    I18n(#[from] i18n::I18nError),

    /// Options could not be parsed
    #[error("Invalid options: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for UI operations
pub type Result<T> = std::result::Result<T, UiError>;
