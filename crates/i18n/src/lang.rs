//! Supported UI locales and language negotiation

use fluent_langneg::{convert_vec_str_to_langids_lossy, negotiate_languages, NegotiationStrategy};
use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

/// Locale used when nothing else matches
pub const DEFAULT_LOCALE: &str = "en";

/// UI locales with an embedded string table: (code, native name)
pub(crate) const SUPPORTED: &[(&str, &str)] = &[
    ("en", "English"),
    ("fr", "Français"),
    ("de", "Deutsch"),
    ("es", "Español"),
];

/// Native names of venue content languages
const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("da", "Dansk"),
    ("de", "Deutsch"),
    ("nl", "Nederlands"),
    ("hu", "Magyar"),
    ("es", "Español"),
    ("fr", "Français"),
    ("en", "English"),
    ("fi", "Suomi"),
    ("ru", "Pусский язык"),
    ("zh", "中文"),
    ("pt", "Português"),
    ("it", "Italiano"),
    ("no", "Norsk"),
    ("ja", "日本語"),
    ("ar", "العربية"),
    ("sv", "Svenska"),
    ("tr", "Türkçe"),
    ("ko", "한국어"),
    ("ca", "català"),
    ("et", "Eesti"),
    ("zf", "正體字"),
];

/// A UI locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    /// Language code (e.g., "fr")
    pub code: String,
    /// Native name (e.g., "Français")
    pub name: String,
}

/// All UI locales
pub fn available_locales() -> Vec<Locale> {
    SUPPORTED
        .iter()
        .map(|(code, name)| Locale {
            code: code.to_string(),
            name: name.to_string(),
        })
        .collect()
}

/// Whether `code` is exactly one of the UI locales
pub fn is_supported(code: &str) -> bool {
    SUPPORTED.iter().any(|(c, _)| *c == code)
}

/// Best UI locale for a requested language tag
///
/// "fr-CA" resolves to "fr"; anything unknown resolves to `DEFAULT_LOCALE`.
pub fn negotiate(requested: &str) -> &'static str {
    let requested = convert_vec_str_to_langids_lossy([requested]);
    let available: Vec<LanguageIdentifier> =
        convert_vec_str_to_langids_lossy(SUPPORTED.iter().map(|(code, _)| *code));
    let default: LanguageIdentifier = DEFAULT_LOCALE.parse().unwrap_or_default();

    let negotiated = negotiate_languages(
        &requested,
        &available,
        Some(&default),
        NegotiationStrategy::Filtering,
    );

    negotiated
        .first()
        .and_then(|langid| {
            SUPPORTED
                .iter()
                .find(|(code, _)| *code == langid.language.as_str())
                .map(|(code, _)| *code)
        })
        .unwrap_or(DEFAULT_LOCALE)
}

/// Native name of a venue content language
pub fn language_display_name(code: &str) -> Option<&'static str> {
    LANGUAGE_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}
