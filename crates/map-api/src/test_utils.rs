//! Test fixtures and an in-memory `MapApi`
//!
//! Enabled in this crate's tests and, through the `test-utils` feature, in
//! the tests of downstream crates.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

use crate::client::MapApi;
use crate::types::{
    Direction, DirectionRequest, Place, PlaceDetails, Placelist, SearchObject, SearchParams,
};
use crate::{Error, Result};

/// Builders for domain objects
pub mod fixtures {
    use crate::types::*;

    /// Venue with an English title equal to its name
    pub fn venue(id: &str, name: &str) -> Venue {
        Venue {
            id: id.to_string(),
            name: name.to_string(),
            translations: vec![Translation::new("en", name)],
            default_center: Some(LatLngFloor::new(48.85, 2.35, None)),
            supported_languages: vec!["en".to_string(), "fr".to_string()],
        }
    }

    /// Universe
    pub fn universe(id: &str) -> Universe {
        Universe {
            id: id.to_string(),
            name: id.to_string(),
        }
    }

    /// Place on floor 0 of venue "v1" with an English title
    pub fn place(id: &str, title: &str) -> Place {
        Place {
            id: id.to_string(),
            venue_id: "v1".to_string(),
            name: title.to_string(),
            translations: vec![Translation::new("en", title)],
            floor: Some(0.0),
            marker_coordinate: Some(LatLngFloor::new(48.85, 2.35, Some(0.0))),
            default_center: None,
            universes: vec![],
        }
    }

    /// Place with English and French titles
    pub fn bilingual_place(id: &str, en: &str, fr: &str) -> Place {
        Place {
            translations: vec![Translation::new("en", en), Translation::new("fr", fr)],
            ..place(id, en)
        }
    }

    /// Click preview of a place
    pub fn place_preview(id: &str, title: &str) -> PlacePreview {
        PlacePreview {
            id: id.to_string(),
            title: Some(title.to_string()),
            subtitle: None,
            venue_id: Some("v1".to_string()),
            floor: Some(0.0),
            marker_coordinate: Some(LatLngFloor::new(48.85, 2.35, Some(0.0))),
        }
    }

    /// Details of a place on floor 0, without contact data
    pub fn place_details(id: &str, title: &str) -> PlaceDetails {
        PlaceDetails {
            id: id.to_string(),
            venue_id: "v1".to_string(),
            translations: vec![Translation::new("en", title)],
            floor: Some(FloorInfo {
                number: Some(0.0),
                translations: vec![],
            }),
            phone: None,
            website: None,
            share_link: None,
            capacity: None,
            opening_hours: vec![],
            calendar_events: None,
            marker_coordinate: Some(LatLngFloor::new(48.85, 2.35, Some(0.0))),
        }
    }

    /// Placelist of venue "v1"
    pub fn placelist(id: &str, title: &str, place_ids: &[&str]) -> Placelist {
        Placelist {
            id: id.to_string(),
            venue_id: "v1".to_string(),
            name: title.to_string(),
            translations: vec![Translation::new("en", title)],
            place_ids: place_ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Floor with a short title
    pub fn floor(number: f64, short_title: &str) -> Floor {
        Floor {
            number: Some(number),
            translations: vec![Translation::new("en", short_title).with_short_title(short_title)],
        }
    }

    /// Travel mode
    pub fn direction_mode(id: &str) -> DirectionMode {
        DirectionMode {
            id: id.to_string(),
            name: id.to_string(),
            mode_type: Some("walk".to_string()),
        }
    }

    /// Direction between two waypoints
    pub fn direction_between(from: Waypoint, to: Waypoint, distance: f64, traveltime: f64) -> Direction {
        Direction {
            from,
            to,
            distance,
            traveltime,
            mode: None,
            route: serde_json::Map::new(),
        }
    }

    /// Direction between two places
    pub fn direction(from_id: &str, to_id: &str, distance: f64, traveltime: f64) -> Direction {
        direction_between(
            Waypoint::Place {
                place_id: from_id.to_string(),
            },
            Waypoint::Place {
                place_id: to_id.to_string(),
            },
            distance,
            traveltime,
        )
    }
}

#[derive(Default)]
struct StaticData {
    search_results: HashMap<String, Vec<SearchObject>>,
    search_delays: HashMap<String, Duration>,
    fail_search: bool,
    places: HashMap<String, Place>,
    details: HashMap<String, PlaceDetails>,
    details_delay: Option<Duration>,
    fail_details: bool,
    placelists: HashMap<String, Placelist>,
    placelist_places: HashMap<String, Vec<Place>>,
    direction: Option<Direction>,
    direction_delay: Option<Duration>,
    fail_direction: bool,
    main_searches: Vec<SearchObject>,
    main_froms: Vec<SearchObject>,
    calls: HashMap<&'static str, usize>,
    last_search: Option<SearchParams>,
    last_direction: Option<DirectionRequest>,
}

/// In-memory `MapApi` with call counters and per-query delays
#[derive(Default)]
pub struct StaticApi {
    data: Mutex<StaticData>,
}

impl StaticApi {
    /// Create an empty fake
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with `results`
    pub fn with_search_results(self, query: &str, results: Vec<SearchObject>) -> Self {
        self.data.lock().search_results.insert(query.to_string(), results);
        self
    }

    /// Delay the answer to `query`
    pub fn with_search_delay(self, query: &str, delay: Duration) -> Self {
        self.data.lock().search_delays.insert(query.to_string(), delay);
        self
    }

    /// Fail every search with an API error
    pub fn with_failing_search(self) -> Self {
        self.data.lock().fail_search = true;
        self
    }

    /// Register a place
    pub fn with_place(self, place: Place) -> Self {
        self.data.lock().places.insert(place.id.clone(), place);
        self
    }

    /// Register place details
    pub fn with_details(self, details: PlaceDetails) -> Self {
        self.data.lock().details.insert(details.id.clone(), details);
        self
    }

    /// Delay every details lookup
    pub fn with_details_delay(self, delay: Duration) -> Self {
        self.data.lock().details_delay = Some(delay);
        self
    }

    /// Register a placelist and its places
    pub fn with_placelist(self, placelist: Placelist, places: Vec<Place>) -> Self {
        let mut data = self.data.lock();
        data.placelist_places.insert(placelist.id.clone(), places);
        data.placelists.insert(placelist.id.clone(), placelist);
        drop(data);
        self
    }

    /// Answer every routing request with `direction`
    pub fn with_direction(self, direction: Direction) -> Self {
        self.data.lock().direction = Some(direction);
        self
    }

    /// Delay every routing request
    pub fn with_direction_delay(self, delay: Duration) -> Self {
        self.data.lock().direction_delay = Some(delay);
        self
    }

    /// Fail every routing request with an API error
    pub fn with_failing_direction(self) -> Self {
        self.data.lock().fail_direction = true;
        self
    }

    /// Curated search results
    pub fn with_main_searches(self, results: Vec<SearchObject>) -> Self {
        self.data.lock().main_searches = results;
        self
    }

    /// Curated starting points
    pub fn with_main_froms(self, results: Vec<SearchObject>) -> Self {
        self.data.lock().main_froms = results;
        self
    }

    /// Swap the routing answer at runtime
    pub fn set_direction(&self, direction: Option<Direction>) {
        self.data.lock().direction = direction;
    }

    /// Fail every details lookup from now on
    pub fn set_failing_details(&self, fail: bool) {
        self.data.lock().fail_details = fail;
    }

    /// Swap the routing failure flag at runtime
    pub fn set_failing_direction(&self, fail: bool) {
        self.data.lock().fail_direction = fail;
    }

    /// Number of calls to a method, by method name
    pub fn calls(&self, method: &str) -> usize {
        self.data.lock().calls.get(method).copied().unwrap_or(0)
    }

    /// Parameters of the last search
    pub fn last_search(&self) -> Option<SearchParams> {
        self.data.lock().last_search.clone()
    }

    /// Last routing request
    pub fn last_direction(&self) -> Option<DirectionRequest> {
        self.data.lock().last_direction.clone()
    }

    fn record(&self, method: &'static str) {
        *self.data.lock().calls.entry(method).or_insert(0) += 1;
    }

    async fn pause(delay: Option<Duration>) {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl MapApi for StaticApi {
    async fn search(&self, params: &SearchParams) -> Result<Vec<SearchObject>> {
        self.record("search");
        let (delay, fail, results) = {
            let mut data = self.data.lock();
            data.last_search = Some(params.clone());
            (
                data.search_delays.get(&params.query).copied(),
                data.fail_search,
                data.search_results.get(&params.query).cloned().unwrap_or_default(),
            )
        };
        Self::pause(delay).await;
        if fail {
            return Err(Error::Api {
                status: 500,
                message: "search unavailable".to_string(),
            });
        }
        Ok(results)
    }

    async fn place(&self, id: &str) -> Result<Option<Place>> {
        self.record("place");
        Ok(self.data.lock().places.get(id).cloned())
    }

    async fn place_details(&self, id: &str) -> Result<Option<PlaceDetails>> {
        self.record("place_details");
        let (delay, fail, details) = {
            let data = self.data.lock();
            (data.details_delay, data.fail_details, data.details.get(id).cloned())
        };
        Self::pause(delay).await;
        if fail {
            return Err(Error::Api {
                status: 503,
                message: "details unavailable".to_string(),
            });
        }
        Ok(details)
    }

    async fn placelist(&self, id: &str) -> Result<Option<Placelist>> {
        self.record("placelist");
        Ok(self.data.lock().placelists.get(id).cloned())
    }

    async fn places_for_placelist(&self, id: &str) -> Result<Option<Vec<Place>>> {
        self.record("places_for_placelist");
        Ok(self.data.lock().placelist_places.get(id).cloned())
    }

    async fn direction(&self, request: &DirectionRequest) -> Result<Option<Direction>> {
        self.record("direction");
        let (delay, fail, direction) = {
            let mut data = self.data.lock();
            data.last_direction = Some(request.clone());
            (data.direction_delay, data.fail_direction, data.direction.clone())
        };
        Self::pause(delay).await;
        if fail {
            return Err(Error::Api {
                status: 500,
                message: "routing unavailable".to_string(),
            });
        }
        Ok(direction)
    }

    async fn main_searches(&self, _venue_id: &str) -> Result<Vec<SearchObject>> {
        self.record("main_searches");
        Ok(self.data.lock().main_searches.clone())
    }

    async fn main_froms(&self, _venue_id: &str) -> Result<Vec<SearchObject>> {
        self.record("main_froms");
        Ok(self.data.lock().main_froms.clone())
    }
}
