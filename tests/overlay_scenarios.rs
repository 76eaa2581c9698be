//! End-to-end overlay scenarios
//!
//! Drives a `UiController` over the in-memory data service and a recording
//! map surface, the way a host application would.

use indoor_ui::{HostCommand, MapEvent, UiController, UiEvent};
use map_api::test_utils::{fixtures, StaticApi};
use map_api::{DirectionPoint, MapObject, SearchObject, Venue};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use ui_state::interceptor::CallbackInterceptor;
use ui_state::test_utils::RecordingSurface;
use ui_state::{UiOptions, UiState, UiStatus};

#[derive(Default)]
struct ReadyHook {
    ready: AtomicUsize,
}

impl CallbackInterceptor for ReadyHook {
    fn on_ui_ready(&self) {
        self.ready.fetch_add(1, Ordering::SeqCst);
    }
}

struct Overlay {
    controller: UiController,
    api: Arc<StaticApi>,
    surface: Arc<RecordingSurface>,
    errors: Arc<Mutex<Vec<String>>>,
    hook: Arc<ReadyHook>,
}

impl Overlay {
    fn new(api: StaticApi, options: UiOptions) -> Self {
        let api = Arc::new(api);
        let surface = Arc::new(RecordingSurface::new());
        let errors = Arc::new(Mutex::new(Vec::new()));
        let hook = Arc::new(ReadyHook::default());

        let error_log = errors.clone();
        let context = UiController::context(options, api.clone(), surface.clone())
            .unwrap()
            .with_interceptor(hook.clone())
            .with_error_reporter(Arc::new(move |message: &str| {
                error_log.lock().unwrap().push(message.to_string());
            }));

        Self {
            controller: UiController::new(context),
            api,
            surface,
            errors,
            hook,
        }
    }

    fn state(&self) -> UiState {
        self.controller.state()
    }

    async fn ui(&self, event: UiEvent) {
        self.controller.handle(event.into()).await.unwrap();
    }

    async fn map(&self, event: MapEvent) {
        self.controller.handle(event.into()).await.unwrap();
    }

    async fn host(&self, command: HostCommand) {
        self.controller.handle(command.into()).await.unwrap();
    }
}

fn mall() -> Venue {
    fixtures::venue("v1", "Mall")
}

fn routed_api() -> StaticApi {
    StaticApi::new()
        .with_place(fixtures::place("a", "Entrance"))
        .with_place(fixtures::place("b", "Shop"))
        .with_place(fixtures::place("c", "Cafe"))
        .with_details(fixtures::place_details("a", "Entrance"))
        .with_details(fixtures::place_details("b", "Shop"))
        .with_details(fixtures::place_details("c", "Cafe"))
        .with_search_results(
            "e",
            vec![
                SearchObject::Place(fixtures::place("a", "Entrance")),
                SearchObject::Place(fixtures::place("c", "Cafe")),
            ],
        )
        .with_search_results(
            "s",
            vec![
                SearchObject::Place(fixtures::place("b", "Shop")),
                SearchObject::Placelist(fixtures::placelist("l1", "Shops", &["b"])),
            ],
        )
        .with_placelist(
            fixtures::placelist("l1", "Shops", &["b"]),
            vec![fixtures::place("b", "Shop")],
        )
        .with_direction(fixtures::direction("a", "b", 120.0, 90.0))
}

async fn overlay_in_mall(api: StaticApi) -> Overlay {
    let overlay = Overlay::new(api, UiOptions::default());
    overlay.map(MapEvent::VenueEnter(mall())).await;
    overlay
}

#[tokio::test]
async fn test_direction_button_outside_venue() {
    let overlay = Overlay::new(routed_api(), UiOptions::default());
    let before = overlay.state();

    let result = overlay
        .controller
        .handle(UiEvent::DirectionButtonClick.into())
        .await;

    assert!(result.is_err());
    assert_eq!(overlay.state(), before);
    assert_eq!(overlay.state().status(), UiStatus::Default);
    assert_eq!(overlay.errors.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_every_endpoint_pair_reaches_direction() {
    for from_index in 0..2 {
        for to_index in 0..2 {
            let overlay = overlay_in_mall(routed_api()).await;

            overlay.ui(UiEvent::DirectionButtonClick).await;
            overlay.ui(UiEvent::DirectionFromQueryChange("e".into())).await;
            let from = overlay.state().search_result_list.results.unwrap()[from_index].clone();
            overlay
                .ui(UiEvent::SearchResultSelect {
                    result: from,
                    universe: None,
                })
                .await;

            overlay.ui(UiEvent::DirectionToQueryChange("s".into())).await;
            let to = overlay.state().search_result_list.results.unwrap()[to_index].clone();
            overlay
                .ui(UiEvent::SearchResultSelect {
                    result: to,
                    universe: None,
                })
                .await;

            let state = overlay.state();
            assert_eq!(state.status(), UiStatus::InDirection, "pair {} {}", from_index, to_index);
            assert!(state.controller.direction_from_point.is_some());
            assert!(state.controller.direction_to_point.is_some());
            assert!(!state.search_direction_bar.from_query.is_empty());
            assert!(!state.search_direction_bar.to_query.is_empty());
            assert_eq!(overlay.api.calls("direction"), 1);
        }
    }
}

#[tokio::test]
async fn test_swap_is_an_involution() {
    let overlay = overlay_in_mall(routed_api()).await;
    let store = overlay.controller.store();
    overlay.ui(UiEvent::DirectionButtonClick).await;
    store
        .select_from(DirectionPoint::Place(fixtures::place("c", "Cafe")))
        .await;
    store
        .select_to(DirectionPoint::Place(fixtures::place("b", "Shop")))
        .await;
    let before = overlay.state();

    overlay.ui(UiEvent::SwapFromAndTo).await;
    overlay.ui(UiEvent::SwapFromAndTo).await;

    let after = overlay.state();
    assert_eq!(after.controller.direction_from_point, before.controller.direction_from_point);
    assert_eq!(after.controller.direction_to_point, before.controller.direction_to_point);
    assert_eq!(after.search_direction_bar.from_query, before.search_direction_bar.from_query);
    assert_eq!(after.search_direction_bar.to_query, before.search_direction_bar.to_query);
}

#[tokio::test]
async fn test_failed_direction_leaves_no_overlay() {
    let overlay = overlay_in_mall(routed_api()).await;
    let store = overlay.controller.store();
    overlay
        .map(MapEvent::DirectionModesChange(vec![
            fixtures::direction_mode("walk"),
            fixtures::direction_mode("wheelchair"),
        ]))
        .await;
    overlay.ui(UiEvent::DirectionButtonClick).await;
    store
        .select_from(DirectionPoint::Place(fixtures::place("a", "Entrance")))
        .await;
    store
        .select_to(DirectionPoint::Place(fixtures::place("b", "Shop")))
        .await;
    assert!(overlay.state().map.direction.is_some());

    overlay.api.set_failing_direction(true);
    overlay.host(HostCommand::SetMode("wheelchair".into())).await;

    let state = overlay.state();
    assert!(state.map.direction.is_none());
    assert!(state.map.navigation.is_none());
    assert!(state.controller.direction.is_none());
    assert_eq!(
        state.bottom_view.direction_content.and_then(|c| c.error_label).as_deref(),
        Some("No results")
    );
    assert_eq!(overlay.surface.directions().last().cloned().flatten(), None);
    assert_eq!(
        overlay.api.last_direction().and_then(|r| r.mode_id).as_deref(),
        Some("wheelchair")
    );
}

#[tokio::test]
async fn test_door_without_matches() {
    let overlay = overlay_in_mall(StaticApi::new()).await;

    overlay.ui(UiEvent::SearchFocus).await;
    overlay.ui(UiEvent::SearchQueryChange("door".into())).await;

    let list = overlay.state().search_result_list;
    assert_eq!(list.results, Some(vec![]));
    assert_eq!(list.no_result_label, "No results");
    assert!(list.show_current_location.is_none());
    assert!(!list.is_hidden);
}

#[tokio::test]
async fn test_locale_switch_leaves_no_english_label() {
    let overlay = overlay_in_mall(routed_api()).await;
    overlay.ui(UiEvent::DirectionButtonClick).await;
    overlay
        .controller
        .store()
        .select_from(DirectionPoint::Place(fixtures::place("a", "Entrance")))
        .await;

    overlay.host(HostCommand::SetLocale("fr".into())).await;

    let json = serde_json::to_string(&overlay.state()).unwrap();
    for english in [
        "Back",
        "Directions",
        "Change universe",
        "Change language",
        "Floors",
        "Use my location",
        "No results",
        "Choose a starting point",
        "Choose a destination",
        "Search in Mall",
    ] {
        assert!(
            !json.contains(&format!("\"{}\"", english)),
            "{} still displayed",
            english
        );
    }
    assert!(json.contains("\"Rechercher dans Mall\""));
}

#[tokio::test(start_paused = true)]
async fn test_reentering_venue_restarts_direction() {
    let overlay = overlay_in_mall(routed_api()).await;
    let store = overlay.controller.store();
    overlay.ui(UiEvent::DirectionButtonClick).await;
    store
        .select_from(DirectionPoint::Place(fixtures::place("a", "Entrance")))
        .await;
    store
        .select_to(DirectionPoint::Place(fixtures::place("b", "Shop")))
        .await;
    let direction = overlay.state().controller.direction.clone();
    let shown = overlay.surface.directions().len();

    overlay.map(MapEvent::VenueExit(mall())).await;
    overlay.map(MapEvent::VenueEnter(mall())).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    let state = overlay.state();
    assert_eq!(state.status(), UiStatus::InDirection);
    assert_eq!(state.controller.direction, direction);
    assert!(state.controller.direction_from_point.is_some());
    assert!(state.controller.direction_to_point.is_some());
    assert!(overlay.surface.directions().len() > shown);
    assert!(overlay.surface.directions().last().cloned().flatten().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_entering_other_venue_resets() {
    let overlay = overlay_in_mall(routed_api()).await;
    overlay
        .host(HostCommand::SelectPlace(MapObject::Place(fixtures::place("b", "Shop"))))
        .await;
    overlay.ui(UiEvent::DirectionButtonClick).await;
    overlay
        .controller
        .store()
        .select_from(DirectionPoint::Place(fixtures::place("a", "Entrance")))
        .await;
    assert!(overlay.state().controller.direction.is_some());

    overlay.map(MapEvent::VenueExit(mall())).await;
    overlay
        .map(MapEvent::VenueEnter(fixtures::venue("v2", "Station")))
        .await;
    tokio::time::sleep(Duration::from_secs(1)).await;

    let state = overlay.state();
    assert_eq!(state.status(), UiStatus::Default);
    assert!(state.controller.direction.is_none());
    assert!(state.controller.direction_from_point.is_none());
    assert!(state.controller.direction_to_point.is_none());
    assert!(state.controller.selected_content.is_none());
    assert!(state.map.direction.is_none());
    assert!(state.map.selected_place.is_none());
}

#[tokio::test]
async fn test_mount_selects_configured_place() {
    let options = UiOptions::default().with_center_on_place("b");
    let overlay = Overlay::new(routed_api(), options);

    overlay.controller.mount().await.unwrap();

    let state = overlay.state();
    assert_eq!(
        state.controller.selected_content.as_ref().map(|c| c.id()),
        Some("b")
    );
    assert!(!state.bottom_view.hidden);
    assert_eq!(overlay.hook.ready.load(Ordering::SeqCst), 1);
    assert_eq!(overlay.surface.centered().len(), 1);
}

#[tokio::test]
async fn test_mount_with_unknown_place_fails() {
    let options = UiOptions::default().with_center_on_place("missing");
    let overlay = Overlay::new(routed_api(), options);

    assert!(overlay.controller.mount().await.is_err());
    assert_eq!(overlay.hook.ready.load(Ordering::SeqCst), 0);
}
