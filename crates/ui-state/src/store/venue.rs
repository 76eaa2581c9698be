//! Venue lifecycle, floors, universes, languages and camera events

use map_api::{DirectionPoint, Floor, LatLngFloor, Translated, Universe, Venue};

use super::UiControllerStore;
use crate::formatter::{build_floor_displays, build_language_display, build_language_displays};
use crate::scheduler::DeferredKey;
use crate::state::UiStatus;
use crate::surface::{Camera, FollowUserMode};
use crate::transitions::{Draft, Effect, Endpoint};

/// Whether `venue` resumes the flow left in the last exited venue
fn is_same_venue(d: &Draft<'_>, venue: &Venue) -> bool {
    d.state
        .controller
        .last_exited_venue
        .as_ref()
        .map(|last| last.id == venue.id)
        .unwrap_or(true)
}

impl UiControllerStore {
    // =========================================================================
    // Venue lifecycle
    // =========================================================================

    /// The camera is about to enter `venue`
    pub async fn will_enter_in_venue(&self, venue: &Venue) {
        self.apply(|d| {
            let title = venue
                .title_for(&d.content_language())
                .unwrap_or_else(|| venue.name.clone());
            d.state.search_bar.search_placeholder = d.localizer().entering_venue(&d.ui_language(), &title);
        })
        .await;
    }

    /// The camera entered `venue`
    ///
    /// Re-entering the venue that was last exited resumes the computed
    /// direction or the selected content; any other venue clears them.
    /// Endpoints picked without a computed direction are left untouched.
    pub async fn enter_in_venue(&self, venue: &Venue) {
        tracing::info!("Entered venue {}", venue.id);
        self.apply(|d| {
            let same = is_same_venue(d, venue);

            if d.state.controller.direction.is_some() {
                if same {
                    d.enter_venue_in_direction();
                } else {
                    d.clear_selection();
                    d.direction_to_default();
                }
            } else if d.state.controller.selected_content.is_some() {
                if same {
                    d.state.bottom_view.hidden = false;
                    d.push(Effect::Schedule(DeferredKey::ReselectContent));
                } else {
                    d.clear_selection();
                    d.show_selectors();
                }
            }

            d.state.controller.venue = Some(venue.clone());
            d.state.search_bar.search_placeholder = d.search_placeholder();
            d.state.search_bar.direction_button_hidden = false;
        })
        .await;
    }

    /// The camera left `venue`
    ///
    /// Direction endpoints and the selected content are kept so that the flow
    /// can resume if the same venue is entered again.
    pub async fn exit_venue(&self, venue: &Venue) {
        tracing::info!("Exited venue {}", venue.id);
        self.apply(|d| {
            d.state.controller.last_exited_venue = Some(venue.clone());
            d.state.controller.venue = None;
            d.state.search_bar.search_placeholder = d.search_placeholder();
            d.state.search_bar.direction_button_hidden = true;

            if d.state.controller.direction.is_some() {
                d.direction_to_exit_venue();
            } else if d.state.controller.selected_content.is_some() {
                d.state.bottom_view.hidden = true;
                d.state.map.selected_place = None;
                d.state.map.markers.clear();
                d.push(Effect::UnselectContent);
            }
            d.push(Effect::Cancel(DeferredKey::ReselectContent));
        })
        .await;
    }

    // =========================================================================
    // Floors
    // =========================================================================

    /// The venue's floors changed
    pub async fn change_floors(&self, floors: Vec<Floor>) {
        self.apply(|d| {
            d.state.floor_controller.floors = build_floor_displays(&floors, &d.content_language());
            d.state.controller.floors = floors;
        })
        .await;
    }

    /// The map started loading `floor`
    pub async fn load_floor(&self, floor: Option<f64>) {
        self.apply(|d| d.state.floor_controller.loading_floor = floor)
            .await;
    }

    /// The map displays `floor`
    pub async fn change_floor(&self, floor: Option<f64>) {
        self.apply(|d| {
            d.state.floor_controller.loading_floor = None;
            d.state.floor_controller.selected_floor = floor;
        })
        .await;
    }

    /// A floor was picked in the floor controller
    pub fn select_floor(&self, floor: Option<f64>) {
        self.dispatcher.set_floor(floor);
    }

    // =========================================================================
    // Universes
    // =========================================================================

    /// The venue's universes changed
    ///
    /// The selector stays hidden with fewer than two universes, and while
    /// content or a direction occupies the bottom view.
    pub async fn change_universes(&self, universes: Vec<Universe>) {
        self.apply(|d| {
            let occupied = d.state.controller.selected_content.is_some() || d.state.status().is_direction();
            d.state.universe_selector.is_hidden = universes.len() <= 1 || occupied;
            d.state.universe_selector.universes = universes;
        })
        .await;
    }

    /// The map displays `universe`
    pub async fn change_universe(&self, universe: Universe) {
        self.apply(|d| {
            d.state.universe_selector.selected_universe = Some(universe);
            d.state.universe_selector.is_expanded = false;
        })
        .await;
    }

    /// A universe was picked in the selector
    pub async fn change_selected_universe(&self, universe: Universe) {
        self.apply(|d| {
            d.state.universe_selector.selected_universe = Some(universe.clone());
            d.state.universe_selector.is_expanded = false;
        })
        .await;
        self.dispatcher.set_universe(&universe);
    }

    /// Open or close the universe selector
    pub async fn toggle_universe_selector(&self) {
        self.apply(|d| {
            d.state.universe_selector.is_expanded = !d.state.universe_selector.is_expanded;
            d.state.language_selector.is_expanded = false;
        })
        .await;
    }

    // =========================================================================
    // Content languages
    // =========================================================================

    /// The venue's content languages changed
    pub async fn change_languages(&self, languages: Vec<String>) {
        self.apply(|d| {
            let occupied = d.state.controller.selected_content.is_some() || d.state.status().is_direction();
            d.state.language_selector.is_hidden = languages.len() <= 1 || occupied;
            d.state.language_selector.languages = build_language_displays(&languages);
        })
        .await;
    }

    /// The map displays venue content in `language`
    pub async fn change_language(&self, language: &str) {
        self.apply(|d| {
            d.state.language_selector.selected_language = build_language_display(language);
            d.state.language_selector.is_expanded = false;
            d.state.controller.language = language.to_string();
            d.relocalize();
        })
        .await;
    }

    /// A content language was picked in the selector
    pub async fn change_selected_language(&self, language: &str) {
        self.apply(|d| d.state.language_selector.is_expanded = false)
            .await;
        match self.state().controller.venue {
            Some(venue) => self.dispatcher.set_language_for_venue(language, &venue),
            None => tracing::warn!("Ignoring content language {} outside a venue", language),
        }
    }

    /// Open or close the language selector
    pub async fn toggle_language_selector(&self) {
        self.apply(|d| {
            d.state.language_selector.is_expanded = !d.state.language_selector.is_expanded;
            d.state.universe_selector.is_expanded = false;
        })
        .await;
    }

    // =========================================================================
    // Camera and user position
    // =========================================================================

    /// The camera moved
    pub async fn on_camera_change(&self, camera: &Camera) {
        self.apply(|d| d.state.controller.heading = camera.bearing)
            .await;
    }

    /// The compass was tapped
    pub fn reset_north(&self) {
        self.dispatcher.reset_north();
    }

    /// The surface reported a new follow-user mode
    pub async fn on_follow_user_mode_change(&self, mode: FollowUserMode) {
        self.apply(|d| d.state.follow_user_button.follow_user_mode = mode)
            .await;
    }

    /// The follow-user button was tapped
    pub async fn follow_user_button_click(&self) {
        self.dispatcher.cycle_follow_user_mode().await;
    }

    // =========================================================================
    // Clicks
    // =========================================================================

    /// A venue was tapped on the map
    pub fn on_venue_click(&self, venue: &Venue) {
        self.dispatcher.center_on_venue(venue);
    }

    /// The map background was tapped
    ///
    /// Clears the selection in the default mode; while a direction field is
    /// focused the coordinate becomes that endpoint.
    pub async fn on_map_click(&self, coordinate: LatLngFloor) {
        let state = self.state();
        let bar = &state.search_direction_bar;
        match state.status() {
            UiStatus::Default => {
                self.apply(|d| {
                    d.clear_selection();
                    d.collapse_selectors();
                    d.show_selectors();
                })
                .await;
            }
            UiStatus::InFromSearch if bar.is_from_focus => {
                self.select_endpoint(Endpoint::From, DirectionPoint::Coordinate(coordinate))
                    .await;
            }
            UiStatus::InToSearch if bar.is_to_focus => {
                self.select_endpoint(Endpoint::To, DirectionPoint::Coordinate(coordinate))
                    .await;
            }
            status => tracing::debug!("Ignoring map click in {:?}", status),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::scheduler::DeferredKey;
    use crate::surface::{Camera, FollowUserMode};
    use crate::test_utils::StoreHarness;
    use crate::UiStatus;
    use map_api::test_utils::{fixtures, StaticApi};
    use map_api::{DirectionPoint, LatLngFloor, MapObject};
    use std::time::Duration;

    fn routed_api() -> StaticApi {
        StaticApi::new()
            .with_place(fixtures::place("a", "Entrance"))
            .with_place(fixtures::place("b", "Shop"))
            .with_details(fixtures::place_details("b", "Shop"))
            .with_direction(fixtures::direction("a", "b", 120.0, 90.0))
    }

    async fn harness_in_direction() -> StoreHarness {
        let harness = StoreHarness::in_venue(routed_api()).await;
        let store = &harness.store;
        store.direction_button_click().await.unwrap();
        store
            .select_from(DirectionPoint::Place(fixtures::place("a", "Entrance")))
            .await;
        store
            .select_to(DirectionPoint::Place(fixtures::place("b", "Shop")))
            .await;
        assert_eq!(store.state().status(), UiStatus::InDirection);
        harness
    }

    #[tokio::test]
    async fn test_will_enter_shows_entering_placeholder() {
        let harness = StoreHarness::new().await;
        harness
            .store
            .will_enter_in_venue(&fixtures::venue("v1", "Mall"))
            .await;
        let placeholder = harness.store.state().search_bar.search_placeholder;
        assert!(placeholder.starts_with("Entering"));
        assert!(placeholder.contains("Mall"));
    }

    #[tokio::test]
    async fn test_enter_and_exit_toggle_direction_button() {
        let harness = StoreHarness::new().await;
        let store = &harness.store;
        let venue = fixtures::venue("v1", "Mall");

        store.enter_in_venue(&venue).await;
        let state = store.state();
        assert!(!state.search_bar.direction_button_hidden);
        assert!(state.search_bar.search_placeholder.contains("Mall"));
        assert_eq!(state.controller.venue.as_ref().map(|v| v.id.as_str()), Some("v1"));

        store.exit_venue(&venue).await;
        let state = store.state();
        assert!(state.search_bar.direction_button_hidden);
        assert!(state.controller.venue.is_none());
        assert_eq!(state.controller.last_exited_venue, Some(venue));
        assert_eq!(state.search_bar.search_placeholder, "Search a venue");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reentering_same_venue_resumes_direction() {
        let harness = harness_in_direction().await;
        let store = &harness.store;
        let venue = fixtures::venue("v1", "Mall");
        let direction = store.state().controller.direction.clone();

        store.exit_venue(&venue).await;
        let state = store.state();
        assert!(state.search_direction_bar.is_hidden);
        assert!(state.bottom_view.hidden);
        assert!(state.controller.direction_from_point.is_some());

        store.enter_in_venue(&venue).await;
        assert!(store.is_pending(DeferredKey::RestartDirection));
        tokio::time::sleep(Duration::from_millis(150)).await;

        let state = store.state();
        assert_eq!(state.status(), UiStatus::InDirection);
        assert!(!state.search_direction_bar.is_hidden);
        assert_eq!(state.controller.direction, direction);
        assert!(state.controller.direction_to_point.is_some());
        let overlay = state.map.direction.unwrap();
        assert!(!overlay.options.center_on_start);
        assert!(!overlay.options.display_starting_floor);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entering_other_venue_clears_direction() {
        let harness = harness_in_direction().await;
        let store = &harness.store;

        store.exit_venue(&fixtures::venue("v1", "Mall")).await;
        store.enter_in_venue(&fixtures::venue("v2", "Station")).await;

        let state = store.state();
        assert_eq!(state.status(), UiStatus::Default);
        assert!(state.controller.direction.is_none());
        assert!(state.controller.direction_from_point.is_none());
        assert!(state.controller.direction_to_point.is_none());
        assert!(state.controller.selected_content.is_none());
        assert!(state.search_bar.search_placeholder.contains("Station"));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(store.state().map.direction.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reentering_same_venue_reselects_content() {
        let harness = StoreHarness::in_venue(routed_api()).await;
        let store = &harness.store;
        let venue = fixtures::venue("v1", "Mall");
        store
            .select_place(&MapObject::Place(fixtures::place("b", "Shop")))
            .await;

        store.exit_venue(&venue).await;
        let state = store.state();
        assert!(state.bottom_view.hidden);
        assert!(state.map.selected_place.is_none());
        assert!(state.controller.selected_content.is_some());

        store.enter_in_venue(&venue).await;
        assert!(!store.state().bottom_view.hidden);
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(
            harness.surface.selected_place_ids().last().cloned().flatten().as_deref(),
            Some("b")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_exit_before_reselect_cancels_it() {
        let harness = StoreHarness::in_venue(routed_api()).await;
        let store = &harness.store;
        let venue = fixtures::venue("v1", "Mall");
        store
            .select_place(&MapObject::Place(fixtures::place("b", "Shop")))
            .await;

        store.exit_venue(&venue).await;
        store.enter_in_venue(&venue).await;
        store.exit_venue(&venue).await;
        assert!(!store.is_pending(DeferredKey::ReselectContent));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(store.state().map.selected_place.is_none());
    }

    #[tokio::test]
    async fn test_entering_other_venue_clears_content() {
        let harness = StoreHarness::in_venue(routed_api()).await;
        let store = &harness.store;
        store
            .select_place(&MapObject::Place(fixtures::place("b", "Shop")))
            .await;

        store.exit_venue(&fixtures::venue("v1", "Mall")).await;
        store.enter_in_venue(&fixtures::venue("v2", "Station")).await;

        let state = store.state();
        assert!(state.controller.selected_content.is_none());
        assert!(state.bottom_view.content.is_none());
        assert!(state.bottom_view.hidden);
    }

    #[tokio::test]
    async fn test_venue_change_keeps_endpoints_without_direction() {
        let harness = StoreHarness::in_venue(routed_api()).await;
        let store = &harness.store;
        store.direction_button_click().await.unwrap();
        store
            .select_from(DirectionPoint::Place(fixtures::place("a", "Entrance")))
            .await;
        assert!(store.state().controller.direction.is_none());

        store.exit_venue(&fixtures::venue("v1", "Mall")).await;
        store.enter_in_venue(&fixtures::venue("v2", "Station")).await;

        let state = store.state();
        assert!(state.status().is_direction());
        assert!(state.controller.direction_from_point.is_some());
        assert!(!state.search_direction_bar.is_hidden);
        assert!(!store.is_pending(DeferredKey::RestartDirection));
    }

    #[tokio::test]
    async fn test_exit_clears_placelist_markers() {
        let placelist = fixtures::placelist("l1", "Toilets", &["a", "b"]);
        let api = StaticApi::new().with_placelist(
            placelist.clone(),
            vec![fixtures::place("a", "A"), fixtures::place("b", "B")],
        );
        let harness = StoreHarness::in_venue(api).await;
        let store = &harness.store;
        store.select_placelist(&placelist).await;
        assert_eq!(store.state().map.markers.len(), 2);

        store.exit_venue(&fixtures::venue("v1", "Mall")).await;

        let state = store.state();
        assert!(state.map.markers.is_empty());
        assert!(state.map.selected_place.is_none());
        assert!(state.controller.selected_content.is_some());
        assert_eq!(harness.surface.marker_counts().last().copied(), Some(0));
    }

    #[tokio::test]
    async fn test_floor_events() {
        let harness = StoreHarness::in_venue(StaticApi::new()).await;
        let store = &harness.store;

        store
            .change_floors(vec![fixtures::floor(0.0, "G"), fixtures::floor(1.0, "1")])
            .await;
        assert_eq!(store.state().floor_controller.floors.len(), 2);
        assert_eq!(store.state().floor_controller.floors[0].title, "G");

        store.load_floor(Some(1.0)).await;
        assert_eq!(store.state().floor_controller.loading_floor, Some(1.0));

        store.change_floor(Some(1.0)).await;
        let floor_controller = store.state().floor_controller;
        assert_eq!(floor_controller.loading_floor, None);
        assert_eq!(floor_controller.selected_floor, Some(1.0));

        store.select_floor(Some(0.0));
        assert_eq!(harness.surface.floors(), vec![Some(0.0)]);
    }

    #[tokio::test]
    async fn test_universe_selector() {
        let harness = StoreHarness::in_venue(StaticApi::new()).await;
        let store = &harness.store;

        store.change_universes(vec![fixtures::universe("u1")]).await;
        assert!(store.state().universe_selector.is_hidden);

        store
            .change_universes(vec![fixtures::universe("u1"), fixtures::universe("u2")])
            .await;
        assert!(!store.state().universe_selector.is_hidden);

        store.toggle_language_selector().await;
        store.toggle_universe_selector().await;
        let state = store.state();
        assert!(state.universe_selector.is_expanded);
        assert!(!state.language_selector.is_expanded);

        store.change_selected_universe(fixtures::universe("u2")).await;
        let state = store.state();
        assert!(!state.universe_selector.is_expanded);
        assert_eq!(state.universe_selector.selected_universe, Some(fixtures::universe("u2")));
        assert_eq!(harness.surface.universes(), vec!["u2".to_string()]);
    }

    #[tokio::test]
    async fn test_selectors_stay_hidden_with_selected_content() {
        let harness = StoreHarness::in_venue(routed_api()).await;
        let store = &harness.store;
        store
            .select_place(&MapObject::Place(fixtures::place("b", "Shop")))
            .await;

        store
            .change_universes(vec![fixtures::universe("u1"), fixtures::universe("u2")])
            .await;
        store
            .change_languages(vec!["en".to_string(), "fr".to_string()])
            .await;

        let state = store.state();
        assert!(state.universe_selector.is_hidden);
        assert!(state.language_selector.is_hidden);

        store.on_map_click(LatLngFloor::new(48.0, 2.0, None)).await;
        let state = store.state();
        assert!(!state.universe_selector.is_hidden);
        assert!(!state.language_selector.is_hidden);
        assert!(state.controller.selected_content.is_none());
    }

    #[tokio::test]
    async fn test_content_language_change() {
        let harness = StoreHarness::in_venue(StaticApi::new()).await;
        let store = &harness.store;

        store
            .change_languages(vec!["en".to_string(), "fr".to_string()])
            .await;
        let languages = store.state().language_selector.languages;
        assert_eq!(languages[1].value.as_deref(), Some("Français"));

        store.change_selected_language("fr").await;
        assert_eq!(
            harness.surface.venue_languages(),
            vec![("fr".to_string(), "v1".to_string())]
        );

        store.change_language("fr").await;
        let state = store.state();
        assert_eq!(state.controller.language, "fr");
        assert_eq!(state.controller.preferred_language, "en");
        assert_eq!(state.language_selector.selected_language.as_deref(), Some("Français"));
    }

    #[tokio::test]
    async fn test_camera_and_follow_mode() {
        let harness = StoreHarness::new().await;
        let store = &harness.store;

        store
            .on_camera_change(&Camera {
                bearing: 42.0,
                zoom: 18.0,
                center: None,
            })
            .await;
        assert_eq!(store.state().controller.heading, 42.0);

        store
            .on_follow_user_mode_change(FollowUserMode::FollowUser)
            .await;
        assert_eq!(
            store.state().follow_user_button.follow_user_mode,
            FollowUserMode::FollowUser
        );

        store.follow_user_button_click().await;
        assert_eq!(harness.surface.follow_modes(), vec![FollowUserMode::FollowUser]);

        store.reset_north();
        assert_eq!(harness.surface.reset_north_count(), 1);
    }

    #[tokio::test]
    async fn test_venue_click_centers_on_venue() {
        let harness = StoreHarness::new().await;
        let venue = fixtures::venue("v1", "Mall");
        harness.store.on_venue_click(&venue);
        assert_eq!(harness.surface.centered().len(), 1);
    }
}
