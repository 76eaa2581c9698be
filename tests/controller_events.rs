//! Event routing through `UiController::run`

use indoor_ui::{ControllerEvent, HostCommand, MapClick, MapEvent, UiController, UiEvent};
use map_api::test_utils::{fixtures, StaticApi};
use map_api::{LatLngFloor, MapObject, SearchObject};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use ui_state::test_utils::RecordingSurface;
use ui_state::{CameraTarget, UiOptions, UiStatus, Unit};

fn controller(api: StaticApi) -> (UiController, Arc<StaticApi>, Arc<RecordingSurface>) {
    let api = Arc::new(api);
    let surface = Arc::new(RecordingSurface::new());
    let context = UiController::context(UiOptions::default(), api.clone(), surface.clone()).unwrap();
    (UiController::new(context), api, surface)
}

/// Feed `events` to `run` and wait until every handler has finished
async fn drive(controller: &UiController, events: Vec<ControllerEvent>) {
    let (tx, rx) = mpsc::channel(16);
    for event in events {
        tx.send(event).await.unwrap();
    }
    drop(tx);
    controller.run(rx).await;
}

#[tokio::test]
async fn test_run_returns_when_channel_closes() {
    let (controller, _, _) = controller(StaticApi::new());
    let before = controller.state();

    drive(&controller, vec![]).await;

    assert_eq!(controller.state(), before);
}

#[tokio::test]
async fn test_venue_enter_publishes_languages() {
    let (controller, _, _) = controller(StaticApi::new());

    drive(
        &controller,
        vec![MapEvent::VenueEnter(fixtures::venue("v1", "Mall")).into()],
    )
    .await;

    let state = controller.state();
    assert_eq!(state.controller.venue.as_ref().map(|v| v.id.as_str()), Some("v1"));
    assert!(!state.search_bar.direction_button_hidden);
    assert_eq!(state.language_selector.languages.len(), 2);
    assert!(!state.language_selector.is_hidden);
}

#[tokio::test]
async fn test_failing_handler_does_not_stop_the_loop() {
    let (controller, _, surface) = controller(StaticApi::new());

    drive(
        &controller,
        vec![
            UiEvent::DirectionButtonClick.into(),
            UiEvent::CompassClick.into(),
            UiEvent::CompassClick.into(),
        ],
    )
    .await;

    assert_eq!(controller.state().status(), UiStatus::Default);
    assert_eq!(surface.reset_north_count(), 2);
}

#[tokio::test]
async fn test_host_unit_command() {
    let (controller, _, _) = controller(StaticApi::new());

    drive(&controller, vec![HostCommand::SetUnit(Unit::Imperial).into()]).await;

    assert_eq!(controller.store().get_unit(), Unit::Imperial);
}

#[tokio::test]
async fn test_venue_click_centers_on_venue() {
    let (controller, _, surface) = controller(StaticApi::new());

    drive(
        &controller,
        vec![MapEvent::Click(MapClick::Venue(fixtures::venue("v2", "Station"))).into()],
    )
    .await;

    assert_eq!(
        surface.centered(),
        vec![(CameraTarget::Venue("v2".to_string()), None)]
    );
}

#[tokio::test]
async fn test_map_click_clears_selection() {
    let api = StaticApi::new()
        .with_place(fixtures::place("b", "Shop"))
        .with_details(fixtures::place_details("b", "Shop"));
    let (controller, _, _) = controller(api);
    controller
        .handle(MapEvent::VenueEnter(fixtures::venue("v1", "Mall")).into())
        .await
        .unwrap();
    controller
        .handle(HostCommand::SelectPlace(MapObject::Place(fixtures::place("b", "Shop"))).into())
        .await
        .unwrap();
    assert!(controller.state().controller.selected_content.is_some());

    drive(
        &controller,
        vec![MapEvent::Click(MapClick::Map(LatLngFloor::new(48.0, 2.0, None))).into()],
    )
    .await;

    let state = controller.state();
    assert!(state.controller.selected_content.is_none());
    assert!(state.map.selected_place.is_none());
    assert!(state.bottom_view.hidden);
}

#[tokio::test(start_paused = true)]
async fn test_interleaved_queries_settle_consistently() {
    let api = StaticApi::new()
        .with_search_results("d", vec![SearchObject::Place(fixtures::place("desk", "Desk"))])
        .with_search_results("do", vec![SearchObject::Place(fixtures::place("door", "Door"))])
        .with_search_delay("d", Duration::from_millis(200));
    let (controller, _, _) = controller(api);
    controller
        .handle(MapEvent::VenueEnter(fixtures::venue("v1", "Mall")).into())
        .await
        .unwrap();
    controller.handle(UiEvent::SearchFocus.into()).await.unwrap();

    drive(
        &controller,
        vec![
            UiEvent::SearchQueryChange("d".into()).into(),
            UiEvent::SearchQueryChange("do".into()).into(),
        ],
    )
    .await;

    // Handlers run concurrently, so either query may be the last one typed;
    // the list must match it regardless.
    let state = controller.state();
    let titles: Vec<String> = state
        .search_result_list
        .results
        .unwrap()
        .into_iter()
        .map(|r| r.title)
        .collect();
    match state.search_bar.search_query.as_str() {
        "d" => assert_eq!(titles, vec!["Desk"]),
        "do" => assert_eq!(titles, vec!["Door"]),
        other => panic!("unexpected query {}", other),
    }
}

#[tokio::test]
async fn test_search_results_change_replaces_list() {
    let (controller, _, _) = controller(StaticApi::new());
    controller
        .handle(MapEvent::VenueEnter(fixtures::venue("v1", "Mall")).into())
        .await
        .unwrap();

    drive(
        &controller,
        vec![HostCommand::SearchResultsChange(vec![SearchObject::Place(fixtures::place(
            "c", "Cafe",
        ))])
        .into()],
    )
    .await;

    let results = controller.state().search_result_list.results.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Cafe");
}
