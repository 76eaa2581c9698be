//! Display formatting of raw domain objects
//!
//! Pure functions, no state. Localized fragments come from the `Localizer`.

use i18n::Localizer;
use map_api::{
    Direction, Floor, MapObject, Place, PlaceDetails, Placelist, SearchObject, Translated,
    Translation,
};
use serde::{Deserialize, Serialize};

use crate::options::Unit;
use crate::surface::NavigationInfo;

const FEET_PER_METER: f64 = 3.28084;

/// One entry of the floor controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorDisplay {
    /// Label
    pub title: String,
    /// Floor number
    pub number: Option<f64>,
}

/// One entry of the language selector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageDisplay {
    /// Language code
    pub code: String,
    /// Native name, when known
    pub value: Option<String>,
}

/// A search result ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// The raw result
    pub object: SearchObject,
    /// Title in the content language
    pub title: String,
    /// Subtitle in the content language
    pub subtitle: Option<String>,
    /// "Floor N" when the result has a floor
    pub floor_label: Option<String>,
}

/// Place details with resolved labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedPlaceDetails {
    /// The raw details
    pub details: PlaceDetails,
    /// Title
    pub title_label: Option<String>,
    /// Subtitle
    pub subtitle_label: Option<String>,
    /// Long description
    pub details_label: Option<String>,
}

/// A place inside a placelist panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedPlace {
    /// The raw place
    pub place: Place,
    /// Title
    pub title_label: Option<String>,
    /// Subtitle
    pub subtitle_label: Option<String>,
    /// "Floor N"
    pub floor_label: Option<String>,
}

/// Placelist panel content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedPlacelist {
    /// The raw placelist
    pub placelist: Placelist,
    /// Title
    pub title_label: Option<String>,
    /// Subtitle
    pub subtitle_label: Option<String>,
    /// Long description
    pub details_label: Option<String>,
    /// Places of the list
    pub places: Vec<FormattedPlace>,
}

/// Clicked content shown while details load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewContent {
    /// The clicked object
    pub object: MapObject,
    /// Title
    pub title_label: Option<String>,
    /// Subtitle
    pub subtitle_label: Option<String>,
}

/// Direction or navigation summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionInfo {
    /// "< 1 min" or "N min"
    pub duration_label: String,
    /// "N m" or "N ft"
    pub distance_label: String,
    /// Set when no direction could be computed
    pub error_label: Option<String>,
}

/// Format a floor number without a trailing ".0"
pub fn format_floor_number(number: f64) -> String {
    if number.fract() == 0.0 {
        format!("{}", number as i64)
    } else {
        format!("{}", number)
    }
}

/// Title of `translations` in `language`, or of the first translation
pub fn title_for_language(translations: &[Translation], language: &str) -> Option<String> {
    Translation::for_language(translations, language).and_then(|t| t.title.clone())
}

/// Floor controller entries
///
/// The short title of the matching translation wins over the number.
pub fn build_floor_displays(floors: &[Floor], language: &str) -> Vec<FloorDisplay> {
    floors
        .iter()
        .map(|floor| {
            let short_title = floor
                .translation(language)
                .and_then(|t| t.short_title.clone())
                .filter(|t| !t.is_empty());
            let title = short_title
                .or_else(|| floor.number.map(format_floor_number))
                .unwrap_or_default();
            FloorDisplay {
                title,
                number: floor.number,
            }
        })
        .collect()
}

/// Language selector entries
pub fn build_language_displays(languages: &[String]) -> Vec<LanguageDisplay> {
    languages
        .iter()
        .map(|code| LanguageDisplay {
            code: code.clone(),
            value: build_language_display(code),
        })
        .collect()
}

/// Native name of a content language
pub fn build_language_display(language: &str) -> Option<String> {
    i18n::language_display_name(language).map(str::to_string)
}

/// Labels of place details in `language`
pub fn build_place_details(details: PlaceDetails, language: &str) -> FormattedPlaceDetails {
    let translation = details.translation(language).cloned();
    FormattedPlaceDetails {
        title_label: translation.as_ref().and_then(|t| t.title.clone()),
        subtitle_label: translation.as_ref().and_then(|t| t.subtitle.clone()),
        details_label: translation.and_then(|t| t.details),
        details,
    }
}

/// Placelist panel in `language`
pub fn build_placelist_details(
    placelist: &Placelist,
    places: &[Place],
    language: &str,
    localizer: &Localizer,
) -> FormattedPlacelist {
    let translation = placelist.translation(language);
    FormattedPlacelist {
        placelist: placelist.clone(),
        title_label: translation.and_then(|t| t.title.clone()),
        subtitle_label: translation.and_then(|t| t.subtitle.clone()),
        details_label: translation.and_then(|t| t.details.clone()),
        places: places
            .iter()
            .map(|place| FormattedPlace {
                title_label: place.title_for(language),
                subtitle_label: place.subtitle_for(language),
                floor_label: place
                    .floor
                    .map(|f| localizer.floor(language, &format_floor_number(f))),
                place: place.clone(),
            })
            .collect(),
    }
}

/// Preview content of a clicked object
pub fn build_preview(object: &MapObject, language: &str) -> PreviewContent {
    PreviewContent {
        title_label: object.title(language),
        subtitle_label: object.subtitle(language),
        object: object.clone(),
    }
}

/// Search results in `language`
///
/// Results without a title in any language are dropped.
pub fn build_search_results(
    results: &[SearchObject],
    language: &str,
    localizer: &Localizer,
) -> Vec<SearchResult> {
    results
        .iter()
        .filter_map(|object| {
            let translation = object.translation(language);
            let title = translation.and_then(|t| t.title.clone())?;
            let floor = match object {
                SearchObject::Place(place) => place.floor,
                _ => None,
            };
            Some(SearchResult {
                title,
                subtitle: translation.and_then(|t| t.subtitle.clone()),
                floor_label: floor.map(|f| localizer.floor(language, &format_floor_number(f))),
                object: object.clone(),
            })
        })
        .collect()
}

fn duration_label(seconds: f64, language: &str, localizer: &Localizer) -> String {
    let minutes = (seconds / 60.0).floor();
    if minutes < 1.0 {
        localizer.under_a_minute(language)
    } else {
        localizer.minutes(language, minutes as i64)
    }
}

fn distance_label(meters: f64, unit: Unit, language: &str, localizer: &Localizer) -> String {
    match unit {
        Unit::Metric => localizer.meters(language, meters.floor() as i64),
        Unit::Imperial => localizer.feet(language, (meters * FEET_PER_METER).floor() as i64),
    }
}

/// Summary of a computed direction
pub fn build_direction_info(
    direction: &Direction,
    unit: Unit,
    language: &str,
    localizer: &Localizer,
) -> DirectionInfo {
    DirectionInfo {
        duration_label: duration_label(direction.traveltime, language, localizer),
        distance_label: distance_label(direction.distance, unit, language, localizer),
        error_label: None,
    }
}

/// Summary of an active navigation
pub fn build_navigation_info(
    info: &NavigationInfo,
    unit: Unit,
    language: &str,
    localizer: &Localizer,
) -> DirectionInfo {
    DirectionInfo {
        duration_label: duration_label(info.duration, language, localizer),
        distance_label: distance_label(info.distance, unit, language, localizer),
        error_label: None,
    }
}

/// Summary shown when no direction could be computed
pub fn build_direction_error(language: &str, localizer: &Localizer) -> DirectionInfo {
    DirectionInfo {
        duration_label: String::new(),
        distance_label: String::new(),
        error_label: Some(localizer.search_no_results(language)),
    }
}
