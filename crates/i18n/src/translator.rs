//! Fluent-backed string tables
//!
//! Bundles are built once from the embedded `.ftl` files. The concurrent
//! bundle variant keeps `Localizer` `Send + Sync` so it can be shared by the
//! UI store across tasks.

use fluent::concurrent::FluentBundle;
use fluent::{FluentArgs, FluentResource};
use std::collections::HashMap;
use unic_langid::LanguageIdentifier;

use crate::lang::{negotiate, DEFAULT_LOCALE, SUPPORTED};
use crate::{I18nError, Result};

const RESOURCES: &[(&str, &str)] = &[
    ("en", include_str!("../locales/en/ui.ftl")),
    ("fr", include_str!("../locales/fr/ui.ftl")),
    ("de", include_str!("../locales/de/ui.ftl")),
    ("es", include_str!("../locales/es/ui.ftl")),
];

/// UI string tables for every supported locale
pub struct Localizer {
    bundles: HashMap<&'static str, FluentBundle<FluentResource>>,
}

impl Localizer {
    /// Load the embedded string tables
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();
        for (code, source) in RESOURCES {
            bundles.insert(*code, build_bundle(code, source)?);
        }
        debug_assert_eq!(bundles.len(), SUPPORTED.len());
        Ok(Self { bundles })
    }

    /// Format message `id` in `language`
    ///
    /// Unsupported languages are negotiated to the closest UI locale. A
    /// missing message yields its identifier.
    pub fn format(&self, language: &str, id: &str, args: Option<&FluentArgs>) -> String {
        let locale = negotiate(language);
        let bundle = match self
            .bundles
            .get(locale)
            .or_else(|| self.bundles.get(DEFAULT_LOCALE))
        {
            Some(bundle) => bundle,
            None => return id.to_string(),
        };

        let pattern = match bundle.get_message(id).and_then(|m| m.value()) {
            Some(pattern) => pattern,
            None => {
                tracing::warn!("Missing message {} for locale {}", id, locale);
                return id.to_string();
            }
        };

        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, args, &mut errors);
        if !errors.is_empty() {
            tracing::warn!("Failed to format {} for locale {}: {:?}", id, locale, errors);
        }
        value.into_owned()
    }

    fn format_with(&self, language: &str, id: &str, name: &'static str, value: String) -> String {
        let mut args = FluentArgs::new();
        args.set(name, value);
        self.format(language, id, Some(&args))
    }

    /// "Menu"
    pub fn menu(&self, language: &str) -> String {
        self.format(language, "menu", None)
    }

    /// "Back"
    pub fn back(&self, language: &str) -> String {
        self.format(language, "back", None)
    }

    /// "Directions"
    pub fn direction(&self, language: &str) -> String {
        self.format(language, "direction", None)
    }

    /// Universe selector tooltip
    pub fn change_universe(&self, language: &str) -> String {
        self.format(language, "change-universe", None)
    }

    /// Language selector tooltip
    pub fn change_language(&self, language: &str) -> String {
        self.format(language, "change-language", None)
    }

    /// Floor controller tooltip
    pub fn floor_controller(&self, language: &str) -> String {
        self.format(language, "floor-controller", None)
    }

    /// Follow-user button tooltip
    pub fn use_my_location(&self, language: &str) -> String {
        self.format(language, "use-my-location", None)
    }

    /// Search placeholder outside venues
    pub fn search_global(&self, language: &str) -> String {
        self.format(language, "search-global", None)
    }

    /// Search placeholder inside a venue
    pub fn search_venue(&self, language: &str, venue: &str) -> String {
        self.format_with(language, "search-venue", "venue", venue.to_string())
    }

    /// Search placeholder while a venue loads
    pub fn entering_venue(&self, language: &str, venue: &str) -> String {
        self.format_with(language, "entering-venue", "venue", venue.to_string())
    }

    /// Empty result list label
    pub fn search_no_results(&self, language: &str) -> String {
        self.format(language, "search-no-results", None)
    }

    /// From-field placeholder
    pub fn choose_starting_point(&self, language: &str) -> String {
        self.format(language, "choose-starting-point", None)
    }

    /// To-field placeholder
    pub fn choose_destination(&self, language: &str) -> String {
        self.format(language, "choose-destination", None)
    }

    /// User location endpoint label
    pub fn current_location(&self, language: &str) -> String {
        self.format(language, "current-location", None)
    }

    /// Raw coordinate endpoint label
    pub fn coordinates(&self, language: &str) -> String {
        self.format(language, "coordinates", None)
    }

    /// Start marker label
    pub fn start(&self, language: &str) -> String {
        self.format(language, "start", None)
    }

    /// End marker label
    pub fn destination(&self, language: &str) -> String {
        self.format(language, "destination", None)
    }

    /// "N min"
    pub fn minutes(&self, language: &str, minutes: i64) -> String {
        self.format_with(language, "duration-minutes", "minutes", minutes.to_string())
    }

    /// Travel time below one minute
    pub fn under_a_minute(&self, language: &str) -> String {
        self.format(language, "duration-under-minute", None)
    }

    /// "N m"
    pub fn meters(&self, language: &str, distance: i64) -> String {
        self.format_with(language, "distance-meters", "distance", distance.to_string())
    }

    /// "N ft"
    pub fn feet(&self, language: &str, distance: i64) -> String {
        self.format_with(language, "distance-feet", "distance", distance.to_string())
    }

    /// "Floor N", with `floor` already formatted
    pub fn floor(&self, language: &str, floor: &str) -> String {
        self.format_with(language, "floor", "floor", floor.to_string())
    }

    /// "On floor N", with `floor` already formatted
    pub fn on_floor(&self, language: &str, floor: &str) -> String {
        self.format_with(language, "on-floor", "floor", floor.to_string())
    }

    /// "Outdoor"
    pub fn outdoor(&self, language: &str) -> String {
        self.format(language, "outdoor", None)
    }

    /// Call button
    pub fn call(&self, language: &str) -> String {
        self.format(language, "call", None)
    }

    /// Website button
    pub fn website(&self, language: &str) -> String {
        self.format(language, "website", None)
    }

    /// Share button
    pub fn share(&self, language: &str) -> String {
        self.format(language, "share", None)
    }

    /// Information button
    pub fn information(&self, language: &str) -> String {
        self.format(language, "information", None)
    }

    /// Missing website row
    pub fn website_not_available(&self, language: &str) -> String {
        self.format(language, "website-not-available", None)
    }

    /// Missing phone row
    pub fn phone_not_available(&self, language: &str) -> String {
        self.format(language, "phone-not-available", None)
    }

    /// Missing capacity row
    pub fn capacity_not_available(&self, language: &str) -> String {
        self.format(language, "capacity-not-available", None)
    }

    /// Missing opening hours row
    pub fn opening_hours_not_available(&self, language: &str) -> String {
        self.format(language, "opening-hours-not-available", None)
    }

    /// Missing calendar row
    pub fn schedule_not_available(&self, language: &str) -> String {
        self.format(language, "schedule-not-available", None)
    }

    /// Calendar status when free
    pub fn currently_available(&self, language: &str) -> String {
        self.format(language, "currently-available", None)
    }

    /// Calendar status when booked
    pub fn currently_occupied(&self, language: &str) -> String {
        self.format(language, "currently-occupied", None)
    }

    /// Opening status when open
    pub fn open_now(&self, language: &str) -> String {
        self.format(language, "open-now", None)
    }

    /// Opening status when closed
    pub fn closed_now(&self, language: &str) -> String {
        self.format(language, "closed-now", None)
    }

    /// Day row without intervals
    pub fn closed(&self, language: &str) -> String {
        self.format(language, "closed", None)
    }

    /// Day name, 0 is Sunday
    pub fn day(&self, language: &str, day: u8) -> String {
        self.format(language, &format!("day-{}", day % 7), None)
    }
}

impl std::fmt::Debug for Localizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut locales: Vec<_> = self.bundles.keys().collect();
        locales.sort();
        f.debug_struct("Localizer").field("locales", &locales).finish()
    }
}

fn build_bundle(code: &str, source: &str) -> Result<FluentBundle<FluentResource>> {
    let langid: LanguageIdentifier = code
        .parse()
        .map_err(|_| I18nError::InvalidLanguage(code.to_string()))?;

    let resource = FluentResource::try_new(source.to_string()).map_err(|(_, errors)| I18nError::Resource {
        locale: code.to_string(),
        message: format!("{:?}", errors),
    })?;

    let mut bundle = FluentBundle::new_concurrent(vec![langid]);
    bundle.set_use_isolating(false);
    bundle.add_resource(resource).map_err(|errors| I18nError::Resource {
        locale: code.to_string(),
        message: format!("{:?}", errors),
    })?;

    Ok(bundle)
}
