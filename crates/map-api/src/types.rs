//! Domain types of the indoor map data service
//!
//! The service tags polymorphic payloads with an `objectClass` field. Those
//! payloads are modelled as closed enums (`SearchObject`, `MapObject`,
//! `DirectionPoint`) so every consumer matches exhaustively.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Translations
// =============================================================================

/// Localized labels of a venue, place, placelist or floor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    /// Language code (e.g., "en")
    pub language: String,
    /// Title in this language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Subtitle in this language
    #[serde(default, alias = "subTitle", skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Long description in this language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Short title, used by floors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_title: Option<String>,
}

impl Translation {
    /// Create a translation with a title only
    pub fn new(language: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            title: Some(title.into()),
            subtitle: None,
            details: None,
            short_title: None,
        }
    }

    /// Set the subtitle
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Set the details
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Set the short title
    pub fn with_short_title(mut self, short_title: impl Into<String>) -> Self {
        self.short_title = Some(short_title.into());
        self
    }

    /// Pick the translation for `language`
    ///
    /// Falls back to the first translation when none matches.
    pub fn for_language<'a>(translations: &'a [Translation], language: &str) -> Option<&'a Translation> {
        translations
            .iter()
            .find(|t| t.language == language)
            .or_else(|| translations.first())
    }
}

/// Objects carrying a list of translations
pub trait Translated {
    /// All translations of the object
    fn translations(&self) -> &[Translation];

    /// Translation matching `language`, or the first one
    fn translation(&self, language: &str) -> Option<&Translation> {
        Translation::for_language(self.translations(), language)
    }

    /// Title in `language`, or in the first available language
    fn title_for(&self, language: &str) -> Option<String> {
        self.translation(language).and_then(|t| t.title.clone())
    }

    /// Subtitle in `language`, or in the first available language
    fn subtitle_for(&self, language: &str) -> Option<String> {
        self.translation(language).and_then(|t| t.subtitle.clone())
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// A geographic coordinate, optionally bound to a floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngFloor {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Floor number, absent outdoors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<f64>,
}

impl LatLngFloor {
    /// Create a coordinate
    pub fn new(latitude: f64, longitude: f64, floor: Option<f64>) -> Self {
        Self {
            latitude,
            longitude,
            floor,
        }
    }

    /// Whether the coordinate is bound to an indoor floor
    pub fn is_indoor(&self) -> bool {
        self.floor.is_some()
    }
}

// =============================================================================
// Venue content
// =============================================================================

/// A mapped indoor location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    /// Venue identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Internal name
    pub name: String,
    /// Localized labels
    #[serde(default)]
    pub translations: Vec<Translation>,
    /// Camera target when centering on the venue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_center: Option<LatLngFloor>,
    /// Languages the venue content is available in
    #[serde(default)]
    pub supported_languages: Vec<String>,
}

impl Translated for Venue {
    fn translations(&self) -> &[Translation] {
        &self.translations
    }
}

/// A content variant inside a venue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Universe {
    /// Universe identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name
    pub name: String,
}

/// A floor of the current venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    /// Floor number, absent for outdoor
    #[serde(default)]
    pub number: Option<f64>,
    /// Localized labels
    #[serde(default)]
    pub translations: Vec<Translation>,
}

impl Translated for Floor {
    fn translations(&self) -> &[Translation] {
        &self.translations
    }
}

/// Lightweight place reference delivered by map clicks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacePreview {
    /// Place identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Title as rendered on the map
    #[serde(default)]
    pub title: Option<String>,
    /// Subtitle as rendered on the map
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Venue identifier
    #[serde(default)]
    pub venue_id: Option<String>,
    /// Floor number
    #[serde(default)]
    pub floor: Option<f64>,
    /// Marker position
    #[serde(default)]
    pub marker_coordinate: Option<LatLngFloor>,
}

/// A place of a venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    /// Place identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Venue identifier
    pub venue_id: String,
    /// Internal name
    #[serde(default)]
    pub name: String,
    /// Localized labels
    #[serde(default)]
    pub translations: Vec<Translation>,
    /// Floor number
    #[serde(default)]
    pub floor: Option<f64>,
    /// Marker position
    #[serde(default)]
    pub marker_coordinate: Option<LatLngFloor>,
    /// Camera target when centering on the place
    #[serde(default)]
    pub default_center: Option<LatLngFloor>,
    /// Universes the place belongs to
    #[serde(default)]
    pub universes: Vec<String>,
}

impl Translated for Place {
    fn translations(&self) -> &[Translation] {
        &self.translations
    }
}

/// Floor information attached to place details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorInfo {
    /// Floor number, absent for outdoor places
    #[serde(default)]
    pub number: Option<f64>,
    /// Localized labels
    #[serde(default)]
    pub translations: Vec<Translation>,
}

/// A weekly opening interval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningInterval {
    /// Day of week, 0 is Sunday
    pub day: u8,
    /// Opening time ("HH:MM")
    pub open: String,
    /// Closing time ("HH:MM")
    pub close: String,
}

/// A booking of a place
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Event name
    #[serde(default)]
    pub name: Option<String>,
    /// Start time
    pub start: DateTime<Utc>,
    /// End time
    pub end: DateTime<Utc>,
}

/// Enriched place information shown in the bottom view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDetails {
    /// Place identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Venue identifier
    pub venue_id: String,
    /// Localized labels
    #[serde(default)]
    pub translations: Vec<Translation>,
    /// Floor information
    #[serde(default)]
    pub floor: Option<FloorInfo>,
    /// Phone number
    #[serde(default)]
    pub phone: Option<String>,
    /// Website
    #[serde(default)]
    pub website: Option<String>,
    /// Share link
    #[serde(default)]
    pub share_link: Option<String>,
    /// Capacity in persons
    #[serde(default)]
    pub capacity: Option<u32>,
    /// Weekly opening hours
    #[serde(default)]
    pub opening_hours: Vec<OpeningInterval>,
    /// Bookings, when the place is bookable
    #[serde(default)]
    pub calendar_events: Option<Vec<CalendarEvent>>,
    /// Marker position
    #[serde(default)]
    pub marker_coordinate: Option<LatLngFloor>,
}

impl Translated for PlaceDetails {
    fn translations(&self) -> &[Translation] {
        &self.translations
    }
}

/// A named ordered collection of places
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placelist {
    /// Placelist identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Venue identifier
    pub venue_id: String,
    /// Internal name
    #[serde(default)]
    pub name: String,
    /// Localized labels
    #[serde(default)]
    pub translations: Vec<Translation>,
    /// Identifiers of the places, in order
    #[serde(default)]
    pub place_ids: Vec<String>,
}

impl Translated for Placelist {
    fn translations(&self) -> &[Translation] {
        &self.translations
    }
}

// =============================================================================
// Tagged unions
// =============================================================================

/// An object returned by a search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "objectClass")]
pub enum SearchObject {
    /// A place
    Place(Place),
    /// A placelist
    Placelist(Placelist),
    /// A venue
    Venue(Venue),
}

impl SearchObject {
    /// Identifier of the object
    pub fn id(&self) -> &str {
        match self {
            SearchObject::Place(p) => &p.id,
            SearchObject::Placelist(p) => &p.id,
            SearchObject::Venue(v) => &v.id,
        }
    }

    /// Convert into a selectable map object
    pub fn to_map_object(&self) -> MapObject {
        match self {
            SearchObject::Place(p) => MapObject::Place(p.clone()),
            SearchObject::Placelist(p) => MapObject::Placelist(p.clone()),
            SearchObject::Venue(v) => MapObject::Venue(v.clone()),
        }
    }

    /// Convert into a direction endpoint; venues cannot be endpoints
    pub fn to_direction_point(&self) -> Option<DirectionPoint> {
        match self {
            SearchObject::Place(p) => Some(DirectionPoint::Place(p.clone())),
            SearchObject::Placelist(p) => Some(DirectionPoint::Placelist(p.clone())),
            SearchObject::Venue(_) => None,
        }
    }
}

impl Translated for SearchObject {
    fn translations(&self) -> &[Translation] {
        match self {
            SearchObject::Place(p) => &p.translations,
            SearchObject::Placelist(p) => &p.translations,
            SearchObject::Venue(v) => &v.translations,
        }
    }
}

/// Content that can be selected on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "objectClass")]
pub enum MapObject {
    /// A clicked place, not yet resolved
    PlacePreview(PlacePreview),
    /// A place
    Place(Place),
    /// An enriched place
    PlaceDetails(PlaceDetails),
    /// A placelist
    Placelist(Placelist),
    /// A venue
    Venue(Venue),
}

impl MapObject {
    /// Identifier of the object
    pub fn id(&self) -> &str {
        match self {
            MapObject::PlacePreview(p) => &p.id,
            MapObject::Place(p) => &p.id,
            MapObject::PlaceDetails(p) => &p.id,
            MapObject::Placelist(p) => &p.id,
            MapObject::Venue(v) => &v.id,
        }
    }

    /// Whether the object designates a single place
    pub fn is_place(&self) -> bool {
        matches!(
            self,
            MapObject::PlacePreview(_) | MapObject::Place(_) | MapObject::PlaceDetails(_)
        )
    }

    /// Title in `language`
    pub fn title(&self, language: &str) -> Option<String> {
        match self {
            MapObject::PlacePreview(p) => p.title.clone(),
            MapObject::Place(p) => p.title_for(language),
            MapObject::PlaceDetails(p) => p.title_for(language),
            MapObject::Placelist(p) => p.title_for(language),
            MapObject::Venue(v) => v.title_for(language),
        }
    }

    /// Subtitle in `language`
    pub fn subtitle(&self, language: &str) -> Option<String> {
        match self {
            MapObject::PlacePreview(p) => p.subtitle.clone(),
            MapObject::Place(p) => p.subtitle_for(language),
            MapObject::PlaceDetails(p) => p.subtitle_for(language),
            MapObject::Placelist(p) => p.subtitle_for(language),
            MapObject::Venue(v) => v.subtitle_for(language),
        }
    }

    /// Convert into a direction endpoint; venues cannot be endpoints
    pub fn to_direction_point(&self) -> Option<DirectionPoint> {
        match self {
            MapObject::PlacePreview(p) => Some(DirectionPoint::PlacePreview(p.clone())),
            MapObject::Place(p) => Some(DirectionPoint::Place(p.clone())),
            MapObject::PlaceDetails(p) => Some(DirectionPoint::PlaceDetails(p.clone())),
            MapObject::Placelist(p) => Some(DirectionPoint::Placelist(p.clone())),
            MapObject::Venue(_) => None,
        }
    }

    /// Coordinate to center the camera on when selected
    pub fn camera_coordinate(&self) -> Option<LatLngFloor> {
        match self {
            MapObject::PlacePreview(p) => p.marker_coordinate,
            MapObject::Place(p) => p.default_center.or(p.marker_coordinate),
            MapObject::PlaceDetails(p) => p.marker_coordinate,
            MapObject::Placelist(_) => None,
            MapObject::Venue(v) => v.default_center,
        }
    }
}

/// A direction endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "objectClass")]
pub enum DirectionPoint {
    /// A place
    Place(Place),
    /// A clicked place, not yet resolved
    PlacePreview(PlacePreview),
    /// An enriched place
    PlaceDetails(PlaceDetails),
    /// A placelist; only valid as destination
    Placelist(Placelist),
    /// A raw floor-aware coordinate
    #[serde(rename = "LatLngFloor")]
    Coordinate(LatLngFloor),
}

impl DirectionPoint {
    /// Identifier, absent for coordinates
    pub fn id(&self) -> Option<&str> {
        match self {
            DirectionPoint::Place(p) => Some(&p.id),
            DirectionPoint::PlacePreview(p) => Some(&p.id),
            DirectionPoint::PlaceDetails(p) => Some(&p.id),
            DirectionPoint::Placelist(p) => Some(&p.id),
            DirectionPoint::Coordinate(_) => None,
        }
    }

    /// Whether the endpoint is a placelist
    pub fn is_placelist(&self) -> bool {
        matches!(self, DirectionPoint::Placelist(_))
    }

    /// Whether the endpoint is a raw coordinate
    pub fn is_coordinate(&self) -> bool {
        matches!(self, DirectionPoint::Coordinate(_))
    }

    /// Title in `language`, absent for coordinates
    pub fn title(&self, language: &str) -> Option<String> {
        match self {
            DirectionPoint::Place(p) => p.title_for(language),
            DirectionPoint::PlacePreview(p) => p.title.clone(),
            DirectionPoint::PlaceDetails(p) => p.title_for(language),
            DirectionPoint::Placelist(p) => p.title_for(language),
            DirectionPoint::Coordinate(_) => None,
        }
    }

    /// Convert into selectable map content
    pub fn to_map_object(&self) -> Option<MapObject> {
        match self {
            DirectionPoint::Place(p) => Some(MapObject::Place(p.clone())),
            DirectionPoint::PlacePreview(p) => Some(MapObject::PlacePreview(p.clone())),
            DirectionPoint::PlaceDetails(p) => Some(MapObject::PlaceDetails(p.clone())),
            DirectionPoint::Placelist(p) => Some(MapObject::Placelist(p.clone())),
            DirectionPoint::Coordinate(_) => None,
        }
    }
}

// =============================================================================
// Directions
// =============================================================================

/// A travel mode offered by a venue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionMode {
    /// Mode identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name
    pub name: String,
    /// Mode type (e.g., "walk", "accessible")
    #[serde(rename = "type", default)]
    pub mode_type: Option<String>,
}

/// Reference form of an endpoint, as expected by the routing service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Waypoint {
    /// A place reference
    Place {
        /// Place identifier
        #[serde(rename = "placeId")]
        place_id: String,
    },
    /// A placelist reference; the route targets its closest place
    Placelist {
        /// Placelist identifier
        #[serde(rename = "placeListId")]
        place_list_id: String,
    },
    /// A raw coordinate
    Coordinate(LatLngFloor),
}

/// A computed route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Direction {
    /// Origin of the route
    pub from: Waypoint,
    /// Destination of the route
    pub to: Waypoint,
    /// Length in meters
    pub distance: f64,
    /// Travel time in seconds
    pub traveltime: f64,
    /// Travel mode the route was computed for
    #[serde(default)]
    pub mode: Option<DirectionMode>,
    /// Route geometry, opaque to the UI
    #[serde(flatten)]
    pub route: serde_json::Map<String, serde_json::Value>,
}

/// Body of a routing request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionRequest {
    /// Origin
    pub from: Waypoint,
    /// Destination
    pub to: Waypoint,
    /// Travel mode identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_id: Option<String>,
}

// =============================================================================
// Search
// =============================================================================

/// Kinds of objects a search can return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectClass {
    /// Places
    #[serde(rename = "place")]
    Place,
    /// Placelists
    #[serde(rename = "placeList")]
    Placelist,
    /// Venues
    #[serde(rename = "venue")]
    Venue,
}

/// Search request parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Free-text query
    pub query: String,
    /// Kinds of objects to return
    pub object_classes: Vec<ObjectClass>,
    /// Restrict to one venue
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue_id: Option<String>,
    /// Restrict to several venues
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue_ids: Option<Vec<String>>,
    /// Restrict to one organization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    /// Restrict to one universe
    #[serde(skip_serializing_if = "Option::is_none")]
    pub universe_id: Option<String>,
}

impl SearchParams {
    /// Create parameters for a query over the given object kinds
    pub fn new(query: impl Into<String>, object_classes: Vec<ObjectClass>) -> Self {
        Self {
            query: query.into(),
            object_classes,
            ..Default::default()
        }
    }

    /// Restrict to a venue
    pub fn with_venue(mut self, venue_id: Option<String>) -> Self {
        self.venue_id = venue_id;
        self
    }

    /// Restrict to a universe
    pub fn with_universe(mut self, universe_id: Option<String>) -> Self {
        self.universe_id = universe_id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_translation_fallback() {
        let translations = vec![Translation::new("fr", "Porte"), Translation::new("en", "Door")];
        assert_eq!(
            Translation::for_language(&translations, "en").and_then(|t| t.title.clone()),
            Some("Door".to_string())
        );
        assert_eq!(
            Translation::for_language(&translations, "de").and_then(|t| t.title.clone()),
            Some("Porte".to_string())
        );
        assert!(Translation::for_language(&[], "en").is_none());
    }

    #[test]
    fn test_translation_subtitle_alias() {
        let t: Translation = serde_json::from_value(json!({
            "language": "en",
            "title": "Cafe",
            "subTitle": "Level 2"
        }))
        .unwrap();
        assert_eq!(t.subtitle.as_deref(), Some("Level 2"));
    }

    #[test]
    fn test_search_object_tagged() {
        let obj: SearchObject = serde_json::from_value(json!({
            "objectClass": "Place",
            "_id": "p1",
            "venueId": "v1",
            "translations": [{"language": "en", "title": "Door"}],
            "floor": 1
        }))
        .unwrap();
        match &obj {
            SearchObject::Place(p) => {
                assert_eq!(p.id, "p1");
                assert_eq!(p.floor, Some(1.0));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(obj.title_for("en"), Some("Door".to_string()));
        assert!(obj.to_direction_point().is_some());
    }

    #[test]
    fn test_venue_is_not_an_endpoint() {
        let venue = SearchObject::Venue(Venue {
            id: "v1".to_string(),
            name: "Mall".to_string(),
            translations: vec![],
            default_center: None,
            supported_languages: vec![],
        });
        assert!(venue.to_direction_point().is_none());
        assert!(venue.to_map_object().to_direction_point().is_none());
    }

    #[test]
    fn test_direction_point_coordinate_tag() {
        let point = DirectionPoint::Coordinate(LatLngFloor::new(48.0, 2.0, Some(1.0)));
        let value = serde_json::to_value(&point).unwrap();
        assert_eq!(value["objectClass"], "LatLngFloor");
        assert!(point.is_coordinate());
        assert!(point.id().is_none());
        assert!(point.title("en").is_none());
    }

    #[test]
    fn test_waypoint_untagged() {
        let place: Waypoint = serde_json::from_value(json!({"placeId": "p1"})).unwrap();
        assert_eq!(
            place,
            Waypoint::Place {
                place_id: "p1".to_string()
            }
        );
        let coordinate: Waypoint =
            serde_json::from_value(json!({"latitude": 1.0, "longitude": 2.0, "floor": 0})).unwrap();
        assert_eq!(coordinate, Waypoint::Coordinate(LatLngFloor::new(1.0, 2.0, Some(0.0))));
    }

    #[test]
    fn test_direction_keeps_route() {
        let direction: Direction = serde_json::from_value(json!({
            "from": {"placeId": "a"},
            "to": {"placeId": "b"},
            "distance": 120.5,
            "traveltime": 95,
            "route": [{"floor": 0}]
        }))
        .unwrap();
        assert_eq!(direction.traveltime, 95.0);
        assert!(direction.route.contains_key("route"));
    }

    #[test]
    fn test_search_params_serialization() {
        let params = SearchParams::new("door", vec![ObjectClass::Place, ObjectClass::Placelist])
            .with_venue(Some("v1".to_string()));
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["objectClasses"], json!(["place", "placeList"]));
        assert_eq!(value["venueId"], "v1");
        assert!(value.get("organizationId").is_none());
    }
}
