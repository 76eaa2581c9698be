//! Direction bar, endpoint selection and direction computation

use map_api::{Direction, DirectionMode, DirectionPoint, ObjectClass, SearchParams, Waypoint};

use super::UiControllerStore;
use crate::error::{Result, UiError};
use crate::formatter::{build_navigation_info, build_search_results};
use crate::scheduler::DeferredKey;
use crate::state::{BottomViewContent, UiStatus};
use crate::surface::{DirectionOptions, NavigationInfo, NavigationRequest};
use crate::transitions::{Channel, Effect, Endpoint};

const DIRECTION_OUTSIDE_VENUE: &str = "Must be inside venue to enter in direction";

impl UiControllerStore {
    /// The direction button was tapped
    ///
    /// Opens the direction bar with whatever endpoints are already known
    /// and starts the computation when both are. Outside a venue the error
    /// hook fires and nothing changes.
    pub async fn direction_button_click(&self) -> Result<()> {
        if self.state().controller.venue.is_none() {
            self.dispatcher.fire_error(DIRECTION_OUTSIDE_VENUE);
            return Err(UiError::Precondition(DIRECTION_OUTSIDE_VENUE.to_string()));
        }

        self.apply(|d| d.default_to_direction()).await;
        self.try_to_start_direction().await;

        let state = self.state();
        if state.controller.direction_from_point.is_none() {
            self.direction_search_from_query_change("").await;
        } else if state.controller.direction_to_point.is_none() {
            self.direction_search_to_query_change("").await;
        }
        Ok(())
    }

    /// The direction back button was tapped
    pub async fn direction_back_button_click(&self) {
        self.apply(|d| d.direction_to_default()).await;
    }

    /// The origin field gained focus
    pub async fn direction_from_focus(&self) {
        self.apply(|d| {
            d.push(Effect::Cancel(DeferredKey::FromBlur));
            d.push(Effect::Cancel(DeferredKey::ToBlur));
            d.state.search_container.is_in_search = true;
            d.state.search_direction_bar.is_from_focus = true;
            d.state.search_direction_bar.is_to_focus = false;
            d.state.search_result_list.is_hidden = false;
            d.state.search_result_list.is_in_direction_search = true;
            d.state.controller.status = UiStatus::InFromSearch;
            d.state.bottom_view.hidden = true;
            if d.state.search_direction_bar.from_query == d.current_location_label() {
                d.state.search_direction_bar.from_query.clear();
            }
        })
        .await;
        self.load_suggestions(Endpoint::From).await;
    }

    /// The destination field gained focus
    pub async fn direction_to_focus(&self) {
        self.apply(|d| {
            d.push(Effect::Cancel(DeferredKey::FromBlur));
            d.push(Effect::Cancel(DeferredKey::ToBlur));
            d.state.search_container.is_in_search = true;
            d.state.search_direction_bar.is_to_focus = true;
            d.state.search_direction_bar.is_from_focus = false;
            d.state.search_result_list.is_hidden = false;
            d.state.search_result_list.is_in_direction_search = true;
            d.state.controller.status = UiStatus::InToSearch;
            d.state.bottom_view.hidden = true;
        })
        .await;
        self.load_suggestions(Endpoint::To).await;
    }

    /// The origin field lost focus
    pub async fn direction_from_blur(&self) {
        self.apply(|d| d.push(Effect::Schedule(DeferredKey::FromBlur)))
            .await;
    }

    /// The destination field lost focus
    pub async fn direction_to_blur(&self) {
        self.apply(|d| d.push(Effect::Schedule(DeferredKey::ToBlur)))
            .await;
    }

    /// Curated results for an empty direction field
    async fn load_suggestions(&self, endpoint: Endpoint) {
        let token = self.begin(Channel::Search);
        let venue = self.state().controller.venue;
        let response = match endpoint {
            Endpoint::From => self.api.get_main_froms(venue.as_ref()).await,
            Endpoint::To => self.api.get_main_searches(venue.as_ref()).await,
        };
        let objects = response.unwrap_or_else(|e| {
            tracing::warn!("Failed to load suggestions: {}", e);
            Vec::new()
        });

        self.apply_if_current(Channel::Search, token, |d| {
            let results = build_search_results(&objects, &d.content_language(), d.localizer());
            d.state.search_result_list.results = Some(results);
            d.state.search_result_list.show_current_location =
                if endpoint == Endpoint::From && d.has_indoor_location() {
                    Some(d.current_location_label())
                } else {
                    None
                };
        })
        .await;
    }

    /// The origin text changed
    pub async fn direction_search_from_query_change(&self, query: &str) {
        self.direction_search(Endpoint::From, query).await;
    }

    /// The destination text changed
    pub async fn direction_search_to_query_change(&self, query: &str) {
        self.direction_search(Endpoint::To, query).await;
    }

    async fn direction_search(&self, endpoint: Endpoint, query: &str) {
        self.apply(|d| {
            d.state.search_container.is_in_search = true;
            d.state.search_direction_bar.is_in_search = true;
            match endpoint {
                Endpoint::From => {
                    d.state.search_direction_bar.from_query = query.to_string();
                    d.state.controller.status = UiStatus::InFromSearch;
                }
                Endpoint::To => {
                    d.state.search_direction_bar.to_query = query.to_string();
                    d.state.controller.status = UiStatus::InToSearch;
                }
            }
            d.state.search_result_list.is_hidden = false;
            d.state.search_result_list.is_in_direction_search = true;
            d.state.bottom_view.hidden = true;
        })
        .await;

        let token = self.begin(Channel::Search);
        let state = self.state();
        let venue = state.controller.venue.as_ref();
        let response = if query.is_empty() {
            match endpoint {
                Endpoint::From => self.api.get_main_froms(venue).await,
                Endpoint::To => self.api.get_main_searches(venue).await,
            }
        } else {
            let classes = match endpoint {
                // Placelists cannot be origins
                Endpoint::From => vec![ObjectClass::Place],
                Endpoint::To => vec![ObjectClass::Place, ObjectClass::Placelist],
            };
            let params = SearchParams::new(query, classes)
                .with_venue(venue.map(|v| v.id.clone()))
                .with_universe(state.universe_selector.selected_universe.as_ref().map(|u| u.id.clone()));
            self.api.search(params).await
        };
        let objects = match response {
            Ok(objects) => Some(objects),
            Err(e) => {
                tracing::warn!("Failed to search \"{}\": {}", query, e);
                None
            }
        };

        self.apply_if_current(Channel::Search, token, |d| {
            let language = d.content_language();
            let results = objects.map(|objects| build_search_results(&objects, &language, d.localizer()));
            d.state.search_result_list.results = results;
            d.state.search_result_list.show_current_location =
                if endpoint == Endpoint::From && d.has_indoor_location() {
                    Some(d.current_location_label())
                } else {
                    None
                };
            d.state.search_result_list.universes.clear();
            d.state.search_result_list.current_universe = None;
        })
        .await;
    }

    // =========================================================================
    // Endpoints
    // =========================================================================

    /// Set an endpoint and move on to the next step
    pub(crate) async fn select_endpoint(&self, endpoint: Endpoint, point: DirectionPoint) {
        self.apply(|d| {
            d.set_endpoint(endpoint, point);
            d.set_next_direction_step();
        })
        .await;
        self.try_to_start_direction().await;
    }

    /// Use `point` as origin
    pub async fn select_from(&self, point: DirectionPoint) {
        if point.is_placelist() {
            tracing::warn!("A placelist cannot be a direction origin");
            return;
        }
        self.select_endpoint(Endpoint::From, point).await;
    }

    /// Use `point` as destination
    pub async fn select_to(&self, point: DirectionPoint) {
        if let DirectionPoint::Placelist(placelist) = &point {
            self.select_placelist(placelist).await;
        }
        self.select_endpoint(Endpoint::To, point).await;
    }

    /// Use the user position as origin
    pub async fn select_current_location(&self) {
        if self.dispatcher.user_location().is_none() {
            tracing::warn!("No user location to start a direction from");
            return;
        }
        self.apply(|d| {
            d.set_from_current_location();
            d.set_next_direction_step();
        })
        .await;
        self.try_to_start_direction().await;
    }

    /// Exchange origin and destination
    pub async fn swap_from_and_to(&self) {
        let mut selected = None;
        self.apply(|d| selected = d.swap_from_and_to()).await;
        if let Some(object) = selected {
            self.select_place(&object).await;
        }
        self.try_to_start_direction().await;
    }

    // =========================================================================
    // Modes
    // =========================================================================

    /// The venue's travel modes changed
    ///
    /// Keeps the selected mode when still offered, otherwise picks the first.
    pub async fn change_direction_modes(&self, modes: Vec<DirectionMode>) {
        self.apply(|d| {
            let keep = d
                .state
                .controller
                .direction_mode
                .as_ref()
                .filter(|current| modes.iter().any(|m| m.id == current.id))
                .cloned();
            let selected = keep.or_else(|| modes.first().cloned());
            d.state.search_direction_bar.modes = modes;
            d.state.search_direction_bar.selected_mode = selected.clone();
            d.state.controller.direction_mode = selected;
        })
        .await;
    }

    /// A travel mode was picked
    pub async fn change_direction_mode(&self, mode: DirectionMode) {
        self.apply(|d| {
            d.state.search_direction_bar.selected_mode = Some(mode.clone());
            d.state.controller.direction_mode = Some(mode);
        })
        .await;
        self.try_to_start_direction().await;
    }

    /// Pick a travel mode by identifier
    pub async fn set_mode(&self, mode_id: &str) -> Result<()> {
        let mode = self
            .state()
            .search_direction_bar
            .modes
            .into_iter()
            .find(|m| m.id == mode_id);
        match mode {
            Some(mode) => {
                self.change_direction_mode(mode).await;
                Ok(())
            }
            None => {
                tracing::error!("Mode {} does not exist in this venue", mode_id);
                Err(UiError::Precondition(format!("Unknown direction mode {}", mode_id)))
            }
        }
    }

    // =========================================================================
    // Computation
    // =========================================================================

    /// Compute and display the direction between the current endpoints
    ///
    /// Starts a navigation instead when the origin is the indoor user
    /// position. The host hook may supply the direction; otherwise the data
    /// service computes it. A failure becomes an error label in the bottom
    /// view and removes any overlay.
    pub async fn try_to_start_direction(&self) {
        let state = self.state();
        let controller = &state.controller;
        if controller.status == UiStatus::Default {
            return;
        }
        let (Some(from), Some(to)) = (
            controller.direction_from_point.clone(),
            controller.direction_to_point.clone(),
        ) else {
            return;
        };

        if from.is_coordinate() && self.dispatcher.has_indoor_location() {
            self.start_navigation(None).await;
            return;
        }

        let token = self.begin(Channel::Direction);
        let custom = match (
            &controller.venue,
            &state.universe_selector.selected_universe,
            &controller.direction_mode,
        ) {
            (Some(venue), Some(universe), Some(mode)) => {
                self.interceptor
                    .on_direction_will_start(venue, universe, &from, &to, mode, false)
                    .await
            }
            _ => None,
        };
        let result = match custom {
            Some(direction) => Ok(direction),
            None => {
                self.api
                    .get_direction(&from, &to, controller.direction_mode.as_ref())
                    .await
            }
        };

        match result {
            Ok(direction) => {
                tracing::info!(
                    "Direction computed: {:.0} m, {:.0} s",
                    direction.distance,
                    direction.traveltime
                );
                self.apply_if_current(Channel::Direction, token, |d| {
                    d.apply_direction(direction, DirectionOptions::default())
                })
                .await;
            }
            Err(e) => {
                tracing::warn!("Failed to compute direction: {}", e);
                self.apply_if_current(Channel::Direction, token, |d| d.apply_direction_error())
                    .await;
            }
        }
    }

    /// Hand a navigation to the map
    ///
    /// Without an explicit request one is built towards the current
    /// destination. The host hook may replace it.
    pub async fn start_navigation(&self, request: Option<NavigationRequest>) {
        let state = self.state();
        let request = match request {
            Some(request) => request,
            None => match state.controller.direction_to_point.clone() {
                Some(to) => NavigationRequest::new(to, state.controller.direction_mode.clone()),
                None => {
                    tracing::warn!("Cannot start a navigation without destination");
                    return;
                }
            },
        };
        let request = match (&state.controller.venue, &state.universe_selector.selected_universe) {
            (Some(venue), Some(universe)) => self
                .interceptor
                .on_navigation_requested(venue, universe, &request)
                .unwrap_or(request),
            _ => request,
        };

        self.apply(|d| {
            d.push(Effect::Invalidate(Channel::Direction));
            d.push(Effect::Cancel(DeferredKey::StopDirection));
            if d.state.controller.direction_from_point.is_some()
                && d.state.controller.direction_to_point.is_some()
            {
                d.set_next_direction_step();
            }
        })
        .await;
        self.dispatcher.start_navigation(request);
    }

    /// The map reported navigation progress
    pub async fn update_navigation_info(&self, info: NavigationInfo) {
        self.apply(|d| {
            d.state.controller.navigation_info = Some(info.clone());
            let lang = d.ui_language();
            d.state.bottom_view.direction_content = Some(build_navigation_info(
                &info,
                d.state.controller.unit,
                &lang,
                d.localizer(),
            ));
            d.state.bottom_view.hidden = false;
            d.state.bottom_view.expanded = false;
        })
        .await;
    }

    // =========================================================================
    // Host-driven overlays
    // =========================================================================

    async fn resolve_waypoint(&self, waypoint: &Waypoint) -> map_api::Result<DirectionPoint> {
        Ok(match waypoint {
            Waypoint::Place { place_id } => DirectionPoint::Place(self.api.get_place(place_id).await?),
            Waypoint::Placelist { place_list_id } => {
                DirectionPoint::Placelist(self.api.get_placelist(place_list_id).await?)
            }
            Waypoint::Coordinate(coordinate) => DirectionPoint::Coordinate(*coordinate),
        })
    }

    /// Display a direction computed by the host
    ///
    /// `None` leaves the direction flow like the back button.
    pub async fn start_direction_from_props(&self, props: Option<(Direction, DirectionOptions)>) -> Result<()> {
        let Some((direction, options)) = props else {
            self.direction_back_button_click().await;
            return Ok(());
        };

        let (from, to) = tokio::try_join!(
            self.resolve_waypoint(&direction.from),
            self.resolve_waypoint(&direction.to)
        )?;
        let panel = match &to {
            DirectionPoint::Place(place) => match self.api.get_place_details(&place.id).await {
                Ok(details) => Some(self.place_content(details, &self.state().controller.language)),
                Err(e) => {
                    tracing::warn!("Failed to load destination details {}: {}", place.id, e);
                    None
                }
            },
            _ => None,
        };

        self.apply(|d| {
            d.state.search_bar.is_hidden = true;
            d.state.search_bar.is_in_search = false;
            d.state.search_direction_bar.is_hidden = false;
            d.hide_selectors();
            if let Some(panel) = panel {
                d.state.bottom_view.content = Some(BottomViewContent::Place(panel));
                d.state.controller.selected_content = to.to_map_object();
            }
            if let Some(mode) = direction.mode.clone() {
                d.state.search_direction_bar.selected_mode = Some(mode.clone());
                d.state.controller.direction_mode = Some(mode);
            }
            d.set_endpoint(Endpoint::From, from);
            d.set_endpoint(Endpoint::To, to);
            d.push(Effect::Invalidate(Channel::Direction));
            d.apply_direction(direction, options);
        })
        .await;
        Ok(())
    }

    /// Start a navigation requested by the host from the user position
    ///
    /// `None` leaves the direction flow like the back button.
    pub async fn start_navigation_from_props(&self, request: Option<NavigationRequest>) -> Result<()> {
        let Some(request) = request else {
            self.direction_back_button_click().await;
            return Ok(());
        };
        if self.dispatcher.user_location().is_none() {
            let message = "A navigation needs a user location";
            self.dispatcher.fire_error(message);
            return Err(UiError::Precondition(message.to_string()));
        }

        self.apply(|d| {
            d.state.search_bar.is_hidden = true;
            d.state.search_bar.is_in_search = false;
            d.state.search_direction_bar.is_hidden = false;
            d.hide_selectors();
            d.set_from_current_location();
            d.set_endpoint(Endpoint::To, request.destination.clone());
            if let Some(mode) = request.mode.clone() {
                d.state.search_direction_bar.selected_mode = Some(mode.clone());
                d.state.controller.direction_mode = Some(mode);
            }
            d.set_next_direction_step();
        })
        .await;
        self.start_navigation(Some(request)).await;
        Ok(())
    }
}
