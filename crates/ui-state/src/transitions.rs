//! Pure transition helpers
//!
//! Store operations open a `Draft` over a copy of the current snapshot,
//! reshape it through the helpers below and record side effects. The store
//! commits the draft as the next snapshot, renders the (old, new) pair and
//! only then executes the effects, so no helper ever talks to the map
//! surface or the data service directly.

use i18n::Localizer;
use map_api::{Direction, DirectionPoint, LatLngFloor, MapObject, Placelist, Translated};

use crate::formatter::{
    build_direction_error, build_direction_info, build_floor_displays, build_navigation_info,
    build_preview, build_search_results, DirectionInfo,
};
use crate::scheduler::DeferredKey;
use crate::state::{BottomViewContent, UiState, UiStatus};
use crate::surface::DirectionOptions;

/// Asynchronous request channels guarded by generation tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Result list lookups
    Search,
    /// Direction computation
    Direction,
    /// Selected content details
    Content,
}

/// Which direction field an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Origin field
    From,
    /// Destination field
    To,
}

/// Side effect recorded by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Highlight a place on the map
    SelectPlace {
        /// Place to highlight
        place: MapObject,
        /// Keep the camera where it is
        prevent_center: bool,
    },
    /// Show markers for a placelist
    SelectPlacelist(Placelist),
    /// Clear highlight and markers
    UnselectContent,
    /// Draw a direction overlay
    StartDirection {
        /// Route to draw
        direction: Direction,
        /// Overlay options
        options: DirectionOptions,
        /// Origin label
        start_label: String,
        /// Destination label
        end_label: String,
    },
    /// Remove direction and navigation overlays
    StopDirection,
    /// Run a deferred transition after its delay
    Schedule(DeferredKey),
    /// Drop a pending deferred transition
    Cancel(DeferredKey),
    /// Discard in-flight responses of a channel
    Invalidate(Channel),
}

/// Mutable copy of the snapshot plus the effects of one transition
pub struct Draft<'a> {
    /// Next snapshot under construction
    pub state: UiState,
    localizer: &'a Localizer,
    user_location: Option<LatLngFloor>,
    effects: Vec<Effect>,
}

impl<'a> Draft<'a> {
    /// Open a draft over `state`
    ///
    /// `user_location` is the dispatcher's view of the user position at the
    /// time the transition starts.
    pub fn new(state: UiState, localizer: &'a Localizer, user_location: Option<LatLngFloor>) -> Self {
        Self {
            state,
            localizer,
            user_location,
            effects: Vec::new(),
        }
    }

    /// Record a side effect
    pub fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    /// Effects recorded so far
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Consume the draft
    pub fn finish(self) -> (UiState, Vec<Effect>) {
        (self.state, self.effects)
    }

    /// Localizer for labels
    pub fn localizer(&self) -> &'a Localizer {
        self.localizer
    }

    /// UI language
    pub fn ui_language(&self) -> String {
        self.state.controller.preferred_language.clone()
    }

    /// Venue content language
    pub fn content_language(&self) -> String {
        self.state.controller.language.clone()
    }

    /// Whether the user position is bound to a floor
    pub fn has_indoor_location(&self) -> bool {
        self.user_location.map(|l| l.is_indoor()).unwrap_or(false)
    }

    /// "Current location" label in the UI language
    pub fn current_location_label(&self) -> String {
        self.localizer.current_location(&self.ui_language())
    }

    fn is_user_location(&self, point: &DirectionPoint) -> bool {
        match (point, self.user_location) {
            (DirectionPoint::Coordinate(c), Some(user)) => *c == user,
            _ => false,
        }
    }

    // =========================================================================
    // Widgets
    // =========================================================================

    /// Empty the result list
    pub fn clear_results(&mut self) {
        let list = &mut self.state.search_result_list;
        list.results = None;
        list.universes.clear();
        list.current_universe = None;
        list.show_current_location = None;
    }

    /// Collapse both selectors
    pub fn collapse_selectors(&mut self) {
        self.state.universe_selector.is_expanded = false;
        self.state.language_selector.is_expanded = false;
    }

    /// Hide both selectors
    pub fn hide_selectors(&mut self) {
        self.collapse_selectors();
        self.state.universe_selector.is_hidden = true;
        self.state.language_selector.is_hidden = true;
    }

    /// Show the selectors that offer a choice
    pub fn show_selectors(&mut self) {
        self.state.universe_selector.is_hidden = self.state.universe_selector.universes.len() <= 1;
        self.state.language_selector.is_hidden = self.state.language_selector.languages.len() <= 1;
    }

    /// Search bar placeholder for the current venue
    pub fn search_placeholder(&self) -> String {
        let lang = self.ui_language();
        match &self.state.controller.venue {
            Some(venue) => {
                let title = venue
                    .title_for(&self.content_language())
                    .unwrap_or_else(|| venue.name.clone());
                self.localizer.search_venue(&lang, &title)
            }
            None => self.localizer.search_global(&lang),
        }
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Enter the main search
    pub fn default_to_search(&mut self) {
        self.state.search_container.is_in_search = true;
        self.state.search_bar.is_in_search = true;
        self.state.search_bar.search_query.clear();
        self.state.search_result_list.is_hidden = false;
        self.state.search_result_list.is_in_direction_search = false;
        self.state.bottom_view.hidden = true;
        self.state.controller.status = UiStatus::InSearch;
        self.push(Effect::Cancel(DeferredKey::SearchBlur));
    }

    /// Leave the main search
    pub fn search_to_default(&mut self) {
        self.state.search_result_list.is_hidden = true;
        self.clear_results();
        self.state.search_bar.is_in_search = false;
        self.state.search_bar.search_query.clear();
        self.state.search_container.is_in_search = false;
        self.state.controller.status = UiStatus::Default;
        self.push(Effect::Invalidate(Channel::Search));
    }

    /// Rebuild result titles from the held objects
    pub fn relocalize_results(&mut self) {
        let lang = self.content_language();
        if let Some(results) = &self.state.search_result_list.results {
            let objects: Vec<_> = results.iter().map(|r| r.object.clone()).collect();
            self.state.search_result_list.results =
                Some(build_search_results(&objects, &lang, self.localizer));
        }
    }

    // =========================================================================
    // Direction flow
    // =========================================================================

    /// Query text for an endpoint
    pub fn endpoint_query(&self, point: &DirectionPoint) -> String {
        if self.is_user_location(point) {
            return self.current_location_label();
        }
        match point {
            DirectionPoint::Coordinate(_) => self.localizer.coordinates(&self.ui_language()),
            other => other.title(&self.content_language()).unwrap_or_default(),
        }
    }

    /// Set an endpoint and its query text
    pub fn set_endpoint(&mut self, endpoint: Endpoint, point: DirectionPoint) {
        let query = self.endpoint_query(&point);
        match endpoint {
            Endpoint::From => {
                self.state.controller.direction_from_point = Some(point);
                self.state.search_direction_bar.from_query = query;
            }
            Endpoint::To => {
                self.state.controller.direction_to_point = Some(point);
                self.state.search_direction_bar.to_query = query;
            }
        }
    }

    /// Use the user position as origin
    pub fn set_from_current_location(&mut self) -> bool {
        match self.user_location {
            Some(location) => {
                self.state.controller.direction_from_point = Some(DirectionPoint::Coordinate(location));
                self.state.search_direction_bar.from_query = self.current_location_label();
                true
            }
            None => false,
        }
    }

    /// Focus the first missing endpoint, or enter `InDirection`
    pub fn set_next_direction_step(&mut self) {
        let controller = &self.state.controller;
        if controller.direction_from_point.is_none() {
            self.state.search_direction_bar.is_from_focus = true;
            self.state.search_direction_bar.is_to_focus = false;
            self.state.controller.status = UiStatus::InFromSearch;
            self.clear_results();
        } else if controller.direction_to_point.is_none() {
            self.state.search_direction_bar.is_to_focus = true;
            self.state.search_direction_bar.is_from_focus = false;
            self.state.controller.status = UiStatus::InToSearch;
            self.clear_results();
        } else {
            self.state.search_result_list.is_in_direction_search = false;
            self.state.search_result_list.is_hidden = true;
            self.clear_results();
            self.state.search_direction_bar.is_from_focus = false;
            self.state.search_direction_bar.is_to_focus = false;
            self.state.search_container.is_in_search = false;
            self.state.controller.status = UiStatus::InDirection;
        }
    }

    /// Open the direction bar from the default mode
    pub fn default_to_direction(&mut self) {
        self.state.search_bar.search_query.clear();
        self.state.search_bar.is_hidden = true;
        self.state.search_bar.is_in_search = false;
        self.state.search_result_list.is_hidden = false;
        self.clear_results();
        self.state.search_direction_bar.is_hidden = false;
        self.hide_selectors();

        if self.has_indoor_location() {
            self.set_from_current_location();
        }
        if let Some(content) = self.state.controller.selected_content.clone() {
            if let Some(point) = content.to_direction_point() {
                if let Some(title) = content.title(&self.content_language()) {
                    self.state.search_direction_bar.to_query = title;
                }
                self.state.controller.direction_to_point = Some(point);
            }
        }

        self.push(Effect::Cancel(DeferredKey::SearchBlur));
        self.push(Effect::Cancel(DeferredKey::StopDirection));
        self.set_next_direction_step();
    }

    /// Close the direction bar and restore the default mode
    pub fn direction_to_default(&mut self) {
        self.state.controller.status = UiStatus::Default;
        self.state.search_bar.is_hidden = false;
        self.state.search_bar.is_in_search = false;
        self.state.search_result_list.is_hidden = true;
        self.state.search_result_list.is_in_direction_search = false;
        self.clear_results();
        let bar = &mut self.state.search_direction_bar;
        bar.is_hidden = true;
        bar.is_in_search = false;
        bar.is_from_focus = false;
        bar.is_to_focus = false;
        bar.from_query.clear();
        bar.to_query.clear();
        self.state.search_container.is_in_search = false;
        self.state.controller.direction_from_point = None;
        self.state.controller.direction_to_point = None;
        self.state.controller.direction = None;
        self.state.controller.navigation_info = None;

        match self.state.controller.selected_content.clone() {
            Some(content) => {
                self.state.bottom_view.hidden = false;
                self.hide_selectors();
                match content {
                    MapObject::Placelist(placelist) => self.push(Effect::SelectPlacelist(placelist)),
                    MapObject::Venue(_) => {}
                    place => self.push(Effect::SelectPlace {
                        place,
                        prevent_center: false,
                    }),
                }
            }
            None => {
                self.show_selectors();
                self.state.bottom_view.hidden = true;
            }
        }
        self.state.bottom_view.direction_content = None;

        self.push(Effect::Invalidate(Channel::Direction));
        self.push(Effect::Invalidate(Channel::Search));
        self.push(Effect::Cancel(DeferredKey::FromBlur));
        self.push(Effect::Cancel(DeferredKey::ToBlur));
        self.push(Effect::Cancel(DeferredKey::RestartDirection));
        self.push(Effect::Schedule(DeferredKey::StopDirection));
    }

    /// Hide direction widgets while outside the venue
    ///
    /// Endpoints and the computed direction are kept so the flow can resume
    /// when the same venue is entered again.
    pub fn direction_to_exit_venue(&mut self) {
        self.state.search_bar.is_hidden = false;
        self.state.search_bar.is_in_search = false;
        self.state.search_result_list.is_hidden = true;
        self.clear_results();
        self.state.search_direction_bar.is_hidden = true;
        self.state.search_container.is_in_search = false;
        self.state.bottom_view.hidden = true;
        self.push(Effect::Invalidate(Channel::Search));
        self.push(Effect::Cancel(DeferredKey::RestartDirection));
    }

    /// Show direction widgets again and redraw the overlay shortly after
    pub fn enter_venue_in_direction(&mut self) {
        self.state.search_bar.is_hidden = true;
        self.state.search_bar.is_in_search = true;
        self.state.search_direction_bar.is_hidden = false;
        self.state.search_container.is_in_search = false;
        self.state.bottom_view.hidden = false;
        self.push(Effect::Schedule(DeferredKey::RestartDirection));
    }

    /// Overlay labels: the endpoint titles, or the generic start/destination
    pub fn direction_labels(&self) -> (String, String) {
        let lang = self.ui_language();
        let label = |point: &Option<DirectionPoint>, query: &str, fallback: String| match point {
            Some(DirectionPoint::Coordinate(_)) | None => fallback,
            Some(_) if query.is_empty() => fallback,
            Some(_) => query.to_string(),
        };
        (
            label(
                &self.state.controller.direction_from_point,
                &self.state.search_direction_bar.from_query,
                self.localizer.start(&lang),
            ),
            label(
                &self.state.controller.direction_to_point,
                &self.state.search_direction_bar.to_query,
                self.localizer.destination(&lang),
            ),
        )
    }

    /// Record a computed direction and draw it
    pub fn apply_direction(&mut self, direction: Direction, options: DirectionOptions) {
        self.set_next_direction_step();
        self.state.controller.direction = Some(direction.clone());
        self.state.controller.navigation_info = None;
        self.state.bottom_view.direction_content = self.direction_summary();
        self.state.bottom_view.hidden = false;
        self.state.bottom_view.expanded = false;

        let (start_label, end_label) = self.direction_labels();
        self.push(Effect::Cancel(DeferredKey::StopDirection));
        self.push(Effect::UnselectContent);
        self.push(Effect::StartDirection {
            direction,
            options,
            start_label,
            end_label,
        });
    }

    /// Record a failed computation and remove any partial overlay
    pub fn apply_direction_error(&mut self) {
        self.set_next_direction_step();
        self.state.controller.direction = None;
        self.state.controller.navigation_info = None;
        self.state.bottom_view.direction_content =
            Some(build_direction_error(&self.ui_language(), self.localizer));
        self.state.bottom_view.hidden = false;
        self.push(Effect::StopDirection);
    }

    /// Exchange origin and destination
    ///
    /// A placelist cannot be an origin, so swapping one out of the
    /// destination leaves the origin empty. Returns the old origin when it
    /// should become the selected content.
    pub fn swap_from_and_to(&mut self) -> Option<MapObject> {
        let old_from = self.state.controller.direction_from_point.take();
        let old_to = self.state.controller.direction_to_point.take();
        let old_from_query = std::mem::take(&mut self.state.search_direction_bar.from_query);
        let old_to_query = std::mem::take(&mut self.state.search_direction_bar.to_query);

        match old_to {
            Some(DirectionPoint::Placelist(_)) => {}
            other => {
                self.state.controller.direction_from_point = other;
                self.state.search_direction_bar.from_query = old_to_query;
            }
        }
        self.state.controller.direction_to_point = old_from.clone();
        self.state.search_direction_bar.to_query = old_from_query;

        self.set_next_direction_step();

        match old_from {
            Some(point @ DirectionPoint::Place(_)) | Some(point @ DirectionPoint::PlaceDetails(_)) => {
                point.to_map_object()
            }
            _ => None,
        }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Show a clicked object while its details load
    pub fn show_preview(&mut self, object: &MapObject) {
        if self.state.controller.venue.is_some() {
            self.state.bottom_view.hidden = false;
            self.hide_selectors();
        }
        self.state.bottom_view.content =
            Some(BottomViewContent::Preview(build_preview(object, &self.content_language())));
        self.state.controller.selected_content = Some(object.clone());
        self.state.map.selected_place = Some(object.clone());
        self.state.map.markers.clear();
        self.push(Effect::Cancel(DeferredKey::ReselectContent));
    }

    /// Drop the selected content
    pub fn clear_selection(&mut self) {
        self.state.controller.selected_content = None;
        self.state.bottom_view.content = None;
        self.state.bottom_view.hidden = true;
        self.state.bottom_view.expanded = false;
        self.state.search_bar.is_hidden = false;
        self.state.map.selected_place = None;
        self.state.map.markers.clear();
        self.push(Effect::Invalidate(Channel::Content));
        self.push(Effect::Cancel(DeferredKey::ReselectContent));
        self.push(Effect::UnselectContent);
    }

    // =========================================================================
    // Localization
    // =========================================================================

    /// Direction panel summary in the current language and unit
    ///
    /// Navigation progress wins over the static direction while a navigation
    /// is drawn; a failed computation keeps its error label.
    pub fn direction_summary(&self) -> Option<DirectionInfo> {
        let lang = self.ui_language();
        let unit = self.state.controller.unit;
        let failed = self
            .state
            .bottom_view
            .direction_content
            .as_ref()
            .map(|info| info.error_label.is_some())
            .unwrap_or(false);
        let navigation = self
            .state
            .controller
            .navigation_info
            .as_ref()
            .filter(|_| self.state.map.navigation.is_some());

        if let Some(info) = navigation {
            Some(build_navigation_info(info, unit, &lang, self.localizer))
        } else if let Some(direction) = &self.state.controller.direction {
            Some(build_direction_info(direction, unit, &lang, self.localizer))
        } else if failed {
            Some(build_direction_error(&lang, self.localizer))
        } else {
            None
        }
    }

    /// Re-derive every localized label from the current languages
    pub fn relocalize(&mut self) {
        let lang = self.ui_language();
        let l = self.localizer;

        self.state.universe_selector.tooltip_message = l.change_universe(&lang);
        self.state.language_selector.tooltip_message = l.change_language(&lang);
        self.state.search_bar.menu_tooltip_message = l.menu(&lang);
        self.state.search_bar.back_tooltip_message = l.back(&lang);
        self.state.search_bar.direction_tooltip_message = l.direction(&lang);
        self.state.search_bar.search_placeholder = self.search_placeholder();
        self.state.search_result_list.no_result_label = l.search_no_results(&lang);
        if self.state.search_result_list.show_current_location.is_some() {
            self.state.search_result_list.show_current_location = Some(l.current_location(&lang));
        }
        self.state.search_direction_bar.from_placeholder = l.choose_starting_point(&lang);
        self.state.search_direction_bar.to_placeholder = l.choose_destination(&lang);
        if let Some(from) = self.state.controller.direction_from_point.clone() {
            self.state.search_direction_bar.from_query = self.endpoint_query(&from);
        }
        if let Some(to) = self.state.controller.direction_to_point.clone() {
            self.state.search_direction_bar.to_query = self.endpoint_query(&to);
        }
        self.state.floor_controller.tooltip_message = l.floor_controller(&lang);
        self.state.floor_controller.floors =
            build_floor_displays(&self.state.controller.floors, &self.content_language());
        self.state.follow_user_button.tooltip_message = l.use_my_location(&lang);
        self.state.bottom_view.language = lang.clone();

        if self.state.bottom_view.direction_content.is_some() {
            self.state.bottom_view.direction_content = self.direction_summary();
        }
        if let Some(BottomViewContent::Preview(preview)) = &self.state.bottom_view.content {
            let object = preview.object.clone();
            self.state.bottom_view.content =
                Some(BottomViewContent::Preview(build_preview(&object, &self.content_language())));
        }
        self.relocalize_results();
    }
}
