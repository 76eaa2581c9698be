//! `MapActionsDispatcher`: the only writer to the map surface
//!
//! The dispatcher owns the map mirror. Each mutation commits a new mirror
//! snapshot, pushes the fields that changed to the surface and hands the
//! (old, new) pair to its render callback. Unchanged snapshots issue no
//! surface command at all.

use map_api::{ApiService, Direction, LatLngFloor, MapObject, Placelist, Universe, Venue};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::interceptor::CallbackInterceptor;
use crate::state::{MapState, RenderFn};
use crate::surface::{
    CameraTarget, DirectionOptions, DirectionOverlay, MapSurface, Marker, NavigationRequest,
};

/// Zoom level above which centering on a placelist zooms out
pub const MAX_PLACELIST_ZOOM: f64 = 19.0;

/// Hook receiving precondition failures
pub type ErrorReporter = Arc<dyn Fn(&str) + Send + Sync>;

/// Sole writer to the map surface
pub struct MapActionsDispatcher {
    surface: Arc<dyn MapSurface>,
    api: ApiService,
    interceptor: Arc<dyn CallbackInterceptor>,
    state: RwLock<MapState>,
    render: RenderFn<MapState>,
    error_reporter: ErrorReporter,
}

impl MapActionsDispatcher {
    /// Create a dispatcher with an empty mirror
    pub fn new(
        surface: Arc<dyn MapSurface>,
        api: ApiService,
        interceptor: Arc<dyn CallbackInterceptor>,
    ) -> Self {
        Self {
            surface,
            api,
            interceptor,
            state: RwLock::new(MapState::default()),
            render: Arc::new(|_, _| {}),
            error_reporter: Arc::new(|message| tracing::error!("{}", message)),
        }
    }

    /// Set the mirror render callback
    pub fn with_render(mut self, render: RenderFn<MapState>) -> Self {
        self.render = render;
        self
    }

    /// Set the error reporting hook
    pub fn with_error_reporter(mut self, reporter: ErrorReporter) -> Self {
        self.error_reporter = reporter;
        self
    }

    /// Snapshot of the mirror
    pub fn state(&self) -> MapState {
        self.state.read().clone()
    }

    fn commit(&self, mutate: impl FnOnce(&mut MapState)) {
        let (old, new) = {
            let mut state = self.state.write();
            let old = state.clone();
            mutate(&mut state);
            if *state == old {
                return;
            }
            (old, state.clone())
        };

        self.push_changes(&old, &new);
        (self.render)(&old, &new);
    }

    fn push_changes(&self, old: &MapState, new: &MapState) {
        if old.user_location != new.user_location {
            self.surface.set_user_location(new.user_location);
        }
        if old.selected_place != new.selected_place {
            self.surface.set_selected_place(new.selected_place.clone());
        }
        if old.markers != new.markers {
            self.surface.set_markers(new.markers.clone());
        }
        if old.direction != new.direction {
            self.surface.show_direction(new.direction.clone());
        }
        if old.navigation != new.navigation {
            self.surface.show_navigation(new.navigation.clone());
        }
    }

    /// Fold store-side selection and markers into the mirror
    ///
    /// Pushes the changed fields to the surface but never renders, so the
    /// store and the dispatcher cannot feed back into each other.
    pub fn sync_state(&self, map: &MapState) {
        let (old, new) = {
            let mut state = self.state.write();
            let old = state.clone();
            state.selected_place = map.selected_place.clone();
            state.markers = map.markers.clone();
            (old, state.clone())
        };
        self.push_changes(&old, &new);
    }

    /// Report a precondition failure to the host
    pub fn fire_error(&self, message: &str) {
        (self.error_reporter)(message);
    }

    /// Highlight a place, centering the camera on it unless `prevent_center`
    pub fn select_place(&self, place: &MapObject, prevent_center: bool) {
        if !prevent_center {
            if let Some(coordinate) = place.camera_coordinate() {
                self.surface.center_on(CameraTarget::Coordinate(coordinate), None);
            }
        }
        self.commit(|state| {
            state.selected_place = Some(place.clone());
            state.markers.clear();
        });
    }

    /// Show markers on every place of a placelist
    pub async fn select_placelist(&self, placelist: &Placelist) {
        let places = match self.api.get_places_for_placelist(placelist).await {
            Ok(places) => places,
            Err(e) => {
                tracing::warn!("Failed to load places of placelist {}: {}", placelist.id, e);
                return;
            }
        };

        self.commit(|state| {
            state.selected_place = None;
            state.markers = places
                .iter()
                .filter_map(|place| place.marker_coordinate)
                .map(|coordinate| Marker { coordinate })
                .collect();
        });
    }

    /// Clear highlight and markers
    pub fn unselect_content(&self) {
        self.commit(|state| {
            state.selected_place = None;
            state.markers.clear();
        });
    }

    /// Move the camera to an object, keeping the current zoom
    pub async fn center_on_place(&self, object: &MapObject) {
        let zoom = self.surface.zoom().await;
        let target = match object {
            MapObject::Venue(venue) => CameraTarget::Venue(venue.id.clone()),
            other => CameraTarget::Place(other.id().to_string()),
        };
        self.surface.center_on(target, Some(zoom));
    }

    /// Move the camera to the venue of a placelist
    pub async fn center_on_placelist(&self, placelist: &Placelist) {
        let zoom = self.surface.zoom().await.min(MAX_PLACELIST_ZOOM);
        self.surface
            .center_on(CameraTarget::Venue(placelist.venue_id.clone()), Some(zoom));
    }

    /// Move the camera to a venue
    pub fn center_on_venue(&self, venue: &Venue) {
        self.surface.center_on(CameraTarget::Venue(venue.id.clone()), None);
    }

    /// Display a direction, replacing any navigation
    pub fn start_direction(
        &self,
        direction: Direction,
        mut options: DirectionOptions,
        start_label: String,
        end_label: String,
    ) {
        options.start_label = Some(start_label);
        options.end_label = Some(end_label);
        self.commit(|state| {
            state.direction = Some(DirectionOverlay { direction, options });
            state.navigation = None;
        });
    }

    /// Remove both overlays
    pub fn stop_direction(&self) {
        self.commit(|state| {
            state.direction = None;
            state.navigation = None;
        });
    }

    /// Start a navigation, replacing any direction
    pub fn start_navigation(&self, navigation: NavigationRequest) {
        self.commit(|state| {
            state.navigation = Some(navigation);
            state.direction = None;
        });
    }

    /// UI language, also used as preferred content language
    pub fn set_language(&self, language: &str) {
        self.surface.set_preferred_language(language);
    }

    /// Content language of a venue
    pub fn set_language_for_venue(&self, language: &str, venue: &Venue) {
        self.surface.set_language_for_venue(language, venue);
    }

    /// Display a universe
    pub fn set_universe(&self, universe: &Universe) {
        self.surface.set_universe(universe);
    }

    /// Display a floor
    pub fn set_floor(&self, floor: Option<f64>) {
        self.surface.set_floor(floor);
    }

    /// Rotate the camera to north
    pub fn reset_north(&self) {
        self.surface.reset_north();
    }

    /// Whether the user position is bound to a floor
    pub fn has_indoor_location(&self) -> bool {
        self.state
            .read()
            .user_location
            .map(|location| location.is_indoor())
            .unwrap_or(false)
    }

    /// Last known user position
    pub fn user_location(&self) -> Option<LatLngFloor> {
        self.state.read().user_location
    }

    /// Update the user position
    pub fn set_user_location(&self, location: Option<LatLngFloor>) {
        self.commit(|state| state.user_location = location);
    }

    /// Advance the follow-user mode
    ///
    /// Without a known location the host hook runs first; the mode still
    /// advances so the surface can start locating.
    pub async fn cycle_follow_user_mode(&self) {
        if self.user_location().is_none() {
            self.interceptor.on_follow_user_button_click_without_location();
        }
        let mode = self.surface.follow_user_mode().await;
        self.surface.set_follow_user_mode(mode.next());
    }
}

impl std::fmt::Debug for MapActionsDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapActionsDispatcher")
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}
