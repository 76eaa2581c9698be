//! Event router around the UI state machine

use i18n::Localizer;
use map_api::{ApiService, MapApi};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use ui_state::{MapSurface, Result, StoreContext, UiControllerStore, UiOptions, UiState};

use crate::events::{ControllerEvent, HostCommand, MapClick, MapEvent, UiEvent};

/// Entry point of the overlay
///
/// Owns the store (and through it the dispatcher and data service) and
/// turns inbound events into store operations.
#[derive(Debug, Clone)]
pub struct UiController {
    store: Arc<UiControllerStore>,
}

impl UiController {
    /// Controller over a fully configured context
    pub fn new(context: StoreContext) -> Self {
        Self {
            store: UiControllerStore::new(context),
        }
    }

    /// Context with default hooks for `options`, ready for `with_*` overrides
    ///
    /// The content restriction of `options` scopes every search.
    pub fn context(
        options: UiOptions,
        api: Arc<dyn MapApi>,
        surface: Arc<dyn MapSurface>,
    ) -> Result<StoreContext> {
        let options = options.normalized();
        let localizer = Arc::new(Localizer::new()?);
        let service = ApiService::new(api, options.restriction.clone());
        Ok(StoreContext::new(options, service, surface, localizer))
    }

    /// The state machine
    pub fn store(&self) -> &Arc<UiControllerStore> {
        &self.store
    }

    /// Current snapshot
    pub fn state(&self) -> UiState {
        self.store.state()
    }

    /// Finish initialization once the host has rendered the first snapshot
    ///
    /// Selects `centerOnPlaceId` when configured, then notifies the host.
    pub async fn mount(&self) -> Result<()> {
        self.store.configure_from_api().await?;
        self.store.interceptor().on_ui_ready();
        tracing::info!("Overlay mounted");
        Ok(())
    }

    /// Route one event
    pub async fn handle(&self, event: ControllerEvent) -> Result<()> {
        match event {
            ControllerEvent::Map(event) => {
                self.handle_map_event(event).await;
                Ok(())
            }
            ControllerEvent::Ui(event) => self.handle_ui_event(event).await,
            ControllerEvent::Host(command) => self.handle_host_command(command).await,
        }
    }

    /// Route a map surface event
    pub async fn handle_map_event(&self, event: MapEvent) {
        let store = &self.store;
        match event {
            MapEvent::Click(MapClick::Map(coordinate)) => store.on_map_click(coordinate).await,
            MapEvent::Click(MapClick::Venue(venue)) => store.on_venue_click(&venue),
            MapEvent::Click(MapClick::Place(object)) => store.on_place_click(&object).await,
            MapEvent::VenueWillEnter(venue) => store.will_enter_in_venue(&venue).await,
            MapEvent::VenueEnter(venue) => {
                store.enter_in_venue(&venue).await;
                store.change_languages(venue.supported_languages.clone()).await;
            }
            MapEvent::VenueExit(venue) => store.exit_venue(&venue).await,
            MapEvent::FloorsChange(floors) => store.change_floors(floors).await,
            MapEvent::FloorWillChange(floor) => store.load_floor(floor).await,
            MapEvent::FloorChange(floor) => store.change_floor(floor).await,
            MapEvent::UniversesChange(universes) => store.change_universes(universes).await,
            MapEvent::UniverseChange(universe) => store.change_universe(universe).await,
            MapEvent::LanguageChange(language) => store.change_language(&language).await,
            MapEvent::DirectionModesChange(modes) => store.change_direction_modes(modes).await,
            MapEvent::FollowUserModeChange(mode) => store.on_follow_user_mode_change(mode).await,
            MapEvent::CameraChange(camera) => store.on_camera_change(&camera).await,
            MapEvent::UserLocationChange(location) => store.dispatcher().set_user_location(location),
            MapEvent::NavigationInfo(info) => store.update_navigation_info(info).await,
        }
    }

    /// Route a widget event
    pub async fn handle_ui_event(&self, event: UiEvent) -> Result<()> {
        let store = &self.store;
        match event {
            UiEvent::SearchFocus => store.search_focus().await,
            UiEvent::SearchBlur => store.search_blur().await,
            UiEvent::SearchBackButtonClick => store.search_back_button_click().await,
            UiEvent::SearchQueryChange(query) => store.search_query_change(&query).await,
            UiEvent::SearchResultSelect { result, universe } => {
                store.select_search_result(&result, universe).await
            }
            UiEvent::DirectionButtonClick => store.direction_button_click().await?,
            UiEvent::DirectionBackButtonClick => store.direction_back_button_click().await,
            UiEvent::DirectionFromFocus => store.direction_from_focus().await,
            UiEvent::DirectionFromBlur => store.direction_from_blur().await,
            UiEvent::DirectionToFocus => store.direction_to_focus().await,
            UiEvent::DirectionToBlur => store.direction_to_blur().await,
            UiEvent::DirectionFromQueryChange(query) => {
                store.direction_search_from_query_change(&query).await
            }
            UiEvent::DirectionToQueryChange(query) => store.direction_search_to_query_change(&query).await,
            UiEvent::SelectCurrentLocation => store.select_current_location().await,
            UiEvent::SwapFromAndTo => store.swap_from_and_to().await,
            UiEvent::DirectionModeChange(mode) => store.change_direction_mode(mode).await,
            UiEvent::FloorClick(floor) => store.select_floor(floor),
            UiEvent::ToggleUniverseSelector => store.toggle_universe_selector().await,
            UiEvent::UniverseSelect(universe) => store.change_selected_universe(universe).await,
            UiEvent::ToggleLanguageSelector => store.toggle_language_selector().await,
            UiEvent::LanguageSelect(language) => store.change_selected_language(&language).await,
            UiEvent::FollowUserButtonClick => store.follow_user_button_click().await,
            UiEvent::CompassClick => store.reset_north(),
            UiEvent::BottomViewToggle => store.toggle_bottom_view_expand().await,
            UiEvent::InformationButtonClick => store.on_information_button_click(),
            UiEvent::MenuButtonClick => store.on_menu_button_click(),
        }
        Ok(())
    }

    /// Route a host command
    pub async fn handle_host_command(&self, command: HostCommand) -> Result<()> {
        let store = &self.store;
        match command {
            HostCommand::SetLocale(locale) => store.set_locale(&locale).await?,
            HostCommand::SetUnit(unit) => store.set_unit(unit).await,
            HostCommand::SetMode(mode) => store.set_mode(&mode).await?,
            HostCommand::SelectPlace(object) => store.external_select_place(&object).await,
            HostCommand::SelectPlacelist(placelist) => store.external_select_placelist(&placelist).await,
            HostCommand::SelectPlaceAndGoDirection(object) => {
                store.select_place_and_go_direction(&object).await?
            }
            HostCommand::SetDirection(props) => store.start_direction_from_props(props).await?,
            HostCommand::SetNavigation(request) => store.start_navigation_from_props(request).await?,
            HostCommand::SearchResultsChange(results) => store.search_results_change(results).await,
        }
        Ok(())
    }

    /// Handle events until every sender is dropped
    ///
    /// Each event runs as its own task so that slow lookups do not hold up
    /// later events; the store discards responses that were superseded in
    /// the meantime. Returns once every spawned handler has finished.
    pub async fn run(&self, mut events: mpsc::Receiver<ControllerEvent>) {
        let mut tasks = JoinSet::new();

        while let Some(event) = events.recv().await {
            let controller = self.clone();
            tasks.spawn(async move {
                if let Err(e) = controller.handle(event).await {
                    tracing::warn!("Failed to handle event: {}", e);
                }
            });

            while let Some(finished) = tasks.try_join_next() {
                if let Err(e) = finished {
                    tracing::error!("Event handler panicked: {}", e);
                }
            }
        }

        while let Some(finished) = tasks.join_next().await {
            if let Err(e) = finished {
                tracing::error!("Event handler panicked: {}", e);
            }
        }
        tracing::debug!("Event channel closed");
    }
}
