//! Recording map surface and store harness for tests

use async_trait::async_trait;
use i18n::Localizer;
use map_api::test_utils::{fixtures, StaticApi};
use map_api::{ApiService, ContentRestriction, LatLngFloor, MapObject, Universe, Venue};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::interceptor::CallbackInterceptor;
use crate::options::UiOptions;
use crate::state::UiState;
use crate::store::{StoreContext, UiControllerStore};
use crate::surface::{CameraTarget, DirectionOverlay, FollowUserMode, MapSurface, Marker, NavigationRequest};

#[derive(Default)]
struct Records {
    centered: Vec<(CameraTarget, Option<f64>)>,
    floors: Vec<Option<f64>>,
    universes: Vec<String>,
    preferred_languages: Vec<String>,
    venue_languages: Vec<(String, String)>,
    follow_modes: Vec<FollowUserMode>,
    reset_north: usize,
    user_locations: Vec<Option<LatLngFloor>>,
    selected_places: Vec<Option<String>>,
    marker_counts: Vec<usize>,
    directions: Vec<Option<DirectionOverlay>>,
    navigations: Vec<Option<NavigationRequest>>,
}

/// `MapSurface` that records every command it receives
pub struct RecordingSurface {
    zoom: f64,
    follow_mode: Mutex<FollowUserMode>,
    records: Mutex<Records>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    /// Surface at zoom 18 with follow mode off
    pub fn new() -> Self {
        Self {
            zoom: 18.0,
            follow_mode: Mutex::new(FollowUserMode::None),
            records: Mutex::new(Records::default()),
        }
    }

    /// Report `zoom` as the current zoom level
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    /// Camera moves
    pub fn centered(&self) -> Vec<(CameraTarget, Option<f64>)> {
        self.records.lock().centered.clone()
    }

    /// Floors set
    pub fn floors(&self) -> Vec<Option<f64>> {
        self.records.lock().floors.clone()
    }

    /// Identifiers of universes set
    pub fn universes(&self) -> Vec<String> {
        self.records.lock().universes.clone()
    }

    /// Preferred languages set
    pub fn preferred_languages(&self) -> Vec<String> {
        self.records.lock().preferred_languages.clone()
    }

    /// (language, venue id) pairs set
    pub fn venue_languages(&self) -> Vec<(String, String)> {
        self.records.lock().venue_languages.clone()
    }

    /// Follow-user modes set
    pub fn follow_modes(&self) -> Vec<FollowUserMode> {
        self.records.lock().follow_modes.clone()
    }

    /// Number of compass resets
    pub fn reset_north_count(&self) -> usize {
        self.records.lock().reset_north
    }

    /// User locations pushed
    pub fn user_locations(&self) -> Vec<Option<LatLngFloor>> {
        self.records.lock().user_locations.clone()
    }

    /// Identifiers of highlighted places, `None` for a cleared highlight
    pub fn selected_place_ids(&self) -> Vec<Option<String>> {
        self.records.lock().selected_places.clone()
    }

    /// Size of every marker set pushed
    pub fn marker_counts(&self) -> Vec<usize> {
        self.records.lock().marker_counts.clone()
    }

    /// Direction overlays shown or removed
    pub fn directions(&self) -> Vec<Option<DirectionOverlay>> {
        self.records.lock().directions.clone()
    }

    /// Navigation overlays shown or removed
    pub fn navigations(&self) -> Vec<Option<NavigationRequest>> {
        self.records.lock().navigations.clone()
    }
}

#[async_trait]
impl MapSurface for RecordingSurface {
    fn center_on(&self, target: CameraTarget, zoom: Option<f64>) {
        self.records.lock().centered.push((target, zoom));
    }

    async fn zoom(&self) -> f64 {
        self.zoom
    }

    fn set_floor(&self, floor: Option<f64>) {
        self.records.lock().floors.push(floor);
    }

    fn set_universe(&self, universe: &Universe) {
        self.records.lock().universes.push(universe.id.clone());
    }

    fn set_preferred_language(&self, language: &str) {
        self.records.lock().preferred_languages.push(language.to_string());
    }

    fn set_language_for_venue(&self, language: &str, venue: &Venue) {
        self.records
            .lock()
            .venue_languages
            .push((language.to_string(), venue.id.clone()));
    }

    async fn follow_user_mode(&self) -> FollowUserMode {
        *self.follow_mode.lock()
    }

    fn set_follow_user_mode(&self, mode: FollowUserMode) {
        *self.follow_mode.lock() = mode;
        self.records.lock().follow_modes.push(mode);
    }

    fn reset_north(&self) {
        self.records.lock().reset_north += 1;
    }

    fn set_user_location(&self, location: Option<LatLngFloor>) {
        self.records.lock().user_locations.push(location);
    }

    fn set_selected_place(&self, place: Option<MapObject>) {
        self.records
            .lock()
            .selected_places
            .push(place.map(|p| p.id().to_string()));
    }

    fn set_markers(&self, markers: Vec<Marker>) {
        self.records.lock().marker_counts.push(markers.len());
    }

    fn show_direction(&self, overlay: Option<DirectionOverlay>) {
        self.records.lock().directions.push(overlay);
    }

    fn show_navigation(&self, navigation: Option<NavigationRequest>) {
        self.records.lock().navigations.push(navigation);
    }
}

/// Store wired to a `StaticApi` and a `RecordingSurface`
pub struct StoreHarness {
    /// Store under test
    pub store: Arc<UiControllerStore>,
    /// Data fake
    pub api: Arc<StaticApi>,
    /// Surface fake
    pub surface: Arc<RecordingSurface>,
    renders: Arc<Mutex<Vec<(UiState, UiState)>>>,
    errors: Arc<Mutex<Vec<String>>>,
}

impl StoreHarness {
    /// Store with default options and no data
    pub async fn new() -> Self {
        Self::build(StaticApi::new(), None, UiOptions::default())
    }

    /// Store backed by `api`
    pub async fn with_api(api: StaticApi) -> Self {
        Self::build(api, None, UiOptions::default())
    }

    /// Store backed by `api` with custom options
    pub async fn with_options(api: StaticApi, options: UiOptions) -> Self {
        Self::build(api, None, options)
    }

    /// Store backed by `api`, inside venue "v1" ("Mall")
    pub async fn in_venue(api: StaticApi) -> Self {
        let harness = Self::build(api, None, UiOptions::default());
        harness.store.enter_in_venue(&fixtures::venue("v1", "Mall")).await;
        harness
    }

    /// Like `in_venue`, with host hooks
    pub async fn in_venue_with_interceptor(api: StaticApi, interceptor: Arc<dyn CallbackInterceptor>) -> Self {
        let harness = Self::build(api, Some(interceptor), UiOptions::default());
        harness.store.enter_in_venue(&fixtures::venue("v1", "Mall")).await;
        harness
    }

    fn build(api: StaticApi, interceptor: Option<Arc<dyn CallbackInterceptor>>, options: UiOptions) -> Self {
        let api = Arc::new(api);
        let surface = Arc::new(RecordingSurface::new());
        let renders = Arc::new(Mutex::new(Vec::new()));
        let errors = Arc::new(Mutex::new(Vec::new()));
        let localizer = Arc::new(Localizer::new().expect("string tables"));

        let service = ApiService::new(api.clone(), ContentRestriction::default());
        let render_log = renders.clone();
        let error_log = errors.clone();
        let mut context = StoreContext::new(options.normalized(), service, surface.clone(), localizer)
            .with_render(Arc::new(move |old: &UiState, new: &UiState| {
                render_log.lock().push((old.clone(), new.clone()));
            }))
            .with_error_reporter(Arc::new(move |message: &str| {
                error_log.lock().push(message.to_string());
            }));
        if let Some(interceptor) = interceptor {
            context = context.with_interceptor(interceptor);
        }

        Self {
            store: UiControllerStore::new(context),
            api,
            surface,
            renders,
            errors,
        }
    }

    /// Number of store renders so far
    pub fn renders(&self) -> usize {
        self.renders.lock().len()
    }

    /// Most recent (old, new) pair
    pub fn last_render(&self) -> Option<(UiState, UiState)> {
        self.renders.lock().last().cloned()
    }

    /// Every (old, new) pair rendered
    pub fn render_log(&self) -> Vec<(UiState, UiState)> {
        self.renders.lock().clone()
    }

    /// Messages given to the error reporter
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }
}
