//! Overlay configuration
//!
//! Options arrive as JSON from the host. Every field has a default so a
//! partial document is valid; `normalized` canonicalizes the accent color and
//! resolves the preferred language to a supported UI locale.

use map_api::ContentRestriction;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::Result;

/// Accent color used when none (or an unparsable one) is configured
pub const DEFAULT_MAIN_COLOR: &str = "#C51586";

/// Distance unit for direction summaries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    /// Meters
    #[default]
    #[serde(rename = "m")]
    Metric,
    /// Feet
    #[serde(rename = "ft")]
    Imperial,
}

impl Unit {
    /// Short label ("m" or "ft")
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Metric => "m",
            Unit::Imperial => "ft",
        }
    }

    /// Parse a short label
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "m" => Some(Unit::Metric),
            "ft" => Some(Unit::Imperial),
            _ => None,
        }
    }

    /// Every unit, in display order
    pub fn all() -> Vec<Unit> {
        vec![Unit::Metric, Unit::Imperial]
    }
}

/// Options recognized by the overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiOptions {
    /// Accent color
    pub main_color: String,

    /// UI language
    pub preferred_language: String,

    /// Distance unit
    pub unit: Unit,

    /// Display opening hours on a 24 hour clock
    pub uses24: bool,

    /// Hide the menu button of the search bar
    pub menu_button_hidden: bool,

    /// Hide the follow-user button
    pub follow_user_button_hidden: bool,

    /// Hide the floor controller
    pub floor_controller_hidden: bool,

    /// Place selected when the overlay mounts
    pub center_on_place_id: Option<String>,

    /// Organization and venue scoping of searches
    #[serde(flatten)]
    pub restriction: ContentRestriction,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            main_color: DEFAULT_MAIN_COLOR.to_string(),
            preferred_language: i18n::DEFAULT_LOCALE.to_string(),
            unit: Unit::Metric,
            uses24: true,
            menu_button_hidden: false,
            follow_user_button_hidden: false,
            floor_controller_hidden: false,
            center_on_place_id: None,
            restriction: ContentRestriction::default(),
        }
    }
}

impl UiOptions {
    /// Parse options from a JSON document and normalize them
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: UiOptions = serde_json::from_str(json)?;
        Ok(options.normalized())
    }

    /// Set the UI language
    pub fn with_preferred_language(mut self, language: impl Into<String>) -> Self {
        self.preferred_language = language.into();
        self
    }

    /// Set the distance unit
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    /// Set the place selected at mount
    pub fn with_center_on_place(mut self, place_id: impl Into<String>) -> Self {
        self.center_on_place_id = Some(place_id.into());
        self
    }

    /// Canonical color and a supported UI language
    pub fn normalized(mut self) -> Self {
        self.main_color = match normalize_color(&self.main_color) {
            Some(color) => color,
            None => {
                tracing::warn!("Invalid main color {:?}, using default", self.main_color);
                DEFAULT_MAIN_COLOR.to_lowercase()
            }
        };
        self.preferred_language = i18n::negotiate(&self.preferred_language).to_string();
        self
    }
}

/// Canonicalize a CSS-like color to lowercase `#rrggbb`
///
/// Accepts `#rgb`, `#rrggbb` and `rgb(r, g, b)`.
pub fn normalize_color(input: &str) -> Option<String> {
    static HEX_REGEX: OnceLock<Regex> = OnceLock::new();
    static RGB_REGEX: OnceLock<Regex> = OnceLock::new();

    let input = input.trim();

    let hex = HEX_REGEX.get_or_init(|| Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid regex"));
    if let Some(caps) = hex.captures(input) {
        let digits = caps[1].to_lowercase();
        if digits.len() == 3 {
            let expanded: String = digits.chars().flat_map(|c| [c, c]).collect();
            return Some(format!("#{}", expanded));
        }
        return Some(format!("#{}", digits));
    }

    let rgb = RGB_REGEX.get_or_init(|| {
        Regex::new(r"^rgb\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*\)$").expect("valid regex")
    });
    let caps = rgb.captures(input)?;
    let mut channels = [0u8; 3];
    for (i, channel) in channels.iter_mut().enumerate() {
        *channel = caps[i + 1].parse().ok()?;
    }
    Some(format!(
        "#{:02x}{:02x}{:02x}",
        channels[0], channels[1], channels[2]
    ))
}
