//! Internationalization for the indoor map UI
//!
//! This crate provides the UI string tables (Fluent resources embedded at
//! build time), locale negotiation, and typed accessors for every label the
//! overlay displays.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod lang;
pub mod translator;

pub use lang::{available_locales, is_supported, language_display_name, negotiate, Locale, DEFAULT_LOCALE};
pub use translator::Localizer;

/// Result type for i18n operations
pub type Result<T> = std::result::Result<T, I18nError>;

/// Errors raised while loading string tables
#[derive(Debug, thiserror::Error)]
pub enum I18nError {
    /// A locale code could not be parsed
    #[error("Invalid language identifier: {0}")]
    InvalidLanguage(String),

    /// A Fluent resource failed to parse or load
    #[error("Invalid resource for {locale}: {message}")]
    Resource {
        /// Locale the resource belongs to
        locale: String,
        /// Parser or bundle error
        message: String,
    },
}
