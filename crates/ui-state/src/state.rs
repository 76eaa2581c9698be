//! View-state tree
//!
//! `UiState` is the root snapshot owned by the store. Each field is a flat
//! slice consumed by exactly one widget, except `controller` (the state
//! machine itself) and `map` (the mirror shared with the dispatcher).

use i18n::Localizer;
use map_api::{
    Direction, DirectionMode, DirectionPoint, Floor, LatLngFloor, MapObject, Universe, Venue,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::content::PlaceContent;
use crate::formatter::{
    DirectionInfo, FloorDisplay, FormattedPlacelist, LanguageDisplay, PreviewContent, SearchResult,
};
use crate::options::{UiOptions, Unit};
use crate::surface::{DirectionOverlay, FollowUserMode, Marker, NavigationInfo, NavigationRequest};

/// Callback receiving every (old, new) snapshot pair
pub type RenderFn<S> = Arc<dyn Fn(&S, &S) + Send + Sync>;

/// Mode of the overlay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UiStatus {
    /// Browsing the map
    #[default]
    Default,
    /// Typing in the main search bar
    InSearch,
    /// Picking the direction origin
    InFromSearch,
    /// Picking the direction destination
    InToSearch,
    /// A direction is displayed or being computed
    InDirection,
}

impl UiStatus {
    /// Whether the status belongs to the direction flow
    pub fn is_direction(&self) -> bool {
        matches!(
            self,
            UiStatus::InFromSearch | UiStatus::InToSearch | UiStatus::InDirection
        )
    }
}

/// State machine slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerState {
    /// Current mode
    pub status: UiStatus,
    /// Venue the camera is in
    pub venue: Option<Venue>,
    /// Venue most recently exited
    pub last_exited_venue: Option<Venue>,
    /// Content shown in the bottom view
    pub selected_content: Option<MapObject>,
    /// Direction origin
    pub direction_from_point: Option<DirectionPoint>,
    /// Direction destination
    pub direction_to_point: Option<DirectionPoint>,
    /// Selected travel mode
    pub direction_mode: Option<DirectionMode>,
    /// Last computed direction
    pub direction: Option<Direction>,
    /// Last progress of the active navigation
    pub navigation_info: Option<NavigationInfo>,
    /// Floors of the current venue
    pub floors: Vec<Floor>,
    /// UI language
    pub preferred_language: String,
    /// Venue content language
    pub language: String,
    /// Distance unit
    pub unit: Unit,
    /// Camera heading in degrees
    pub heading: f64,
    /// Accent color
    pub main_color: String,
}

/// Universe selector slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniverseSelectorState {
    /// Dropdown open
    pub is_expanded: bool,
    /// Widget hidden
    pub is_hidden: bool,
    /// Universes of the current venue
    pub universes: Vec<Universe>,
    /// Displayed universe
    pub selected_universe: Option<Universe>,
    /// Tooltip
    pub tooltip_message: String,
    /// Accent color
    pub main_color: String,
}

/// Language selector slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageSelectorState {
    /// Dropdown open
    pub is_expanded: bool,
    /// Widget hidden
    pub is_hidden: bool,
    /// Content languages of the current venue
    pub languages: Vec<LanguageDisplay>,
    /// Native name of the displayed language
    pub selected_language: Option<String>,
    /// Tooltip
    pub tooltip_message: String,
    /// Accent color
    pub main_color: String,
}

/// Container around the search widgets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchContainerState {
    /// A result list is open
    pub is_in_search: bool,
    /// Accent color
    pub main_color: String,
}

/// Main search bar slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchBarState {
    /// Text field focused
    pub is_in_search: bool,
    /// Widget hidden
    pub is_hidden: bool,
    /// Current query
    pub search_query: String,
    /// Placeholder
    pub search_placeholder: String,
    /// Direction button hidden (no venue)
    pub direction_button_hidden: bool,
    /// Menu button hidden by configuration
    pub menu_button_hidden: bool,
    /// Menu tooltip
    pub menu_tooltip_message: String,
    /// Back tooltip
    pub back_tooltip_message: String,
    /// Direction tooltip
    pub direction_tooltip_message: String,
    /// Accent color
    pub main_color: String,
}

/// Result list slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultListState {
    /// Results belong to a direction field
    pub is_in_direction_search: bool,
    /// Widget hidden
    pub is_hidden: bool,
    /// Results; `None` while nothing has been fetched
    pub results: Option<Vec<SearchResult>>,
    /// "Current location" entry label, when offered
    pub show_current_location: Option<String>,
    /// Label shown for an empty result list
    pub no_result_label: String,
    /// Universes used to group results
    pub universes: Vec<Universe>,
    /// Universe displayed on the map
    pub current_universe: Option<Universe>,
    /// Accent color
    pub main_color: String,
}

/// Direction bar slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDirectionBarState {
    /// Widget hidden
    pub is_hidden: bool,
    /// Origin placeholder
    pub from_placeholder: String,
    /// Destination placeholder
    pub to_placeholder: String,
    /// Origin field text
    pub from_query: String,
    /// Destination field text
    pub to_query: String,
    /// Travel modes of the venue
    pub modes: Vec<DirectionMode>,
    /// Selected travel mode
    pub selected_mode: Option<DirectionMode>,
    /// A field is being edited
    pub is_in_search: bool,
    /// Destination field focused
    pub is_to_focus: bool,
    /// Origin field focused
    pub is_from_focus: bool,
    /// Accent color
    pub main_color: String,
}

/// Floor controller slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorControllerState {
    /// Hidden by configuration
    pub is_hidden: bool,
    /// Floors, top to bottom as provided
    pub floors: Vec<FloorDisplay>,
    /// Displayed floor
    pub selected_floor: Option<f64>,
    /// Floor being loaded
    pub loading_floor: Option<f64>,
    /// Tooltip
    pub tooltip_message: String,
    /// Accent color
    pub main_color: String,
}

/// Content of the bottom view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BottomViewContent {
    /// Clicked place while its details load
    Preview(PreviewContent),
    /// Place with rows and buttons
    Place(PlaceContent),
    /// Placelist with its places
    Placelist(FormattedPlacelist),
}

impl BottomViewContent {
    /// Identifier of the displayed object
    pub fn id(&self) -> &str {
        match self {
            BottomViewContent::Preview(p) => p.object.id(),
            BottomViewContent::Place(p) => &p.details.details.id,
            BottomViewContent::Placelist(p) => &p.placelist.id,
        }
    }

    /// Displayed title
    pub fn title_label(&self) -> Option<&str> {
        match self {
            BottomViewContent::Preview(p) => p.title_label.as_deref(),
            BottomViewContent::Place(p) => p.details.title_label.as_deref(),
            BottomViewContent::Placelist(p) => p.title_label.as_deref(),
        }
    }
}

/// Bottom view slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BottomViewState {
    /// Expanded to full height
    pub expanded: bool,
    /// Widget hidden
    pub hidden: bool,
    /// UI language for static labels
    pub language: String,
    /// Selected content
    pub content: Option<BottomViewContent>,
    /// Direction or navigation summary
    pub direction_content: Option<DirectionInfo>,
    /// Accent color
    pub main_color: String,
}

/// Follow-user button slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUserButtonState {
    /// Hidden by configuration
    pub is_hidden: bool,
    /// Mode reported by the surface
    pub follow_user_mode: FollowUserMode,
    /// Tooltip
    pub tooltip_message: String,
    /// Accent color
    pub main_color: String,
}

/// Mirror of what the map surface displays
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapState {
    /// User position
    pub user_location: Option<LatLngFloor>,
    /// Markers
    pub markers: Vec<Marker>,
    /// Highlighted place
    pub selected_place: Option<MapObject>,
    /// Direction overlay
    pub direction: Option<DirectionOverlay>,
    /// Navigation overlay
    pub navigation: Option<NavigationRequest>,
}

/// Root snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    /// Map mirror
    pub map: MapState,
    /// State machine
    pub controller: ControllerState,
    /// Universe selector
    pub universe_selector: UniverseSelectorState,
    /// Language selector
    pub language_selector: LanguageSelectorState,
    /// Search container
    pub search_container: SearchContainerState,
    /// Search bar
    pub search_bar: SearchBarState,
    /// Result list
    pub search_result_list: SearchResultListState,
    /// Direction bar
    pub search_direction_bar: SearchDirectionBarState,
    /// Floor controller
    pub floor_controller: FloorControllerState,
    /// Bottom view
    pub bottom_view: BottomViewState,
    /// Follow-user button
    pub follow_user_button: FollowUserButtonState,
}

impl UiState {
    /// Localized default state for `options`
    pub fn new(options: &UiOptions, localizer: &Localizer) -> Self {
        let lang = options.preferred_language.as_str();
        let color = options.main_color.clone();

        Self {
            map: MapState::default(),
            controller: ControllerState {
                status: UiStatus::Default,
                venue: None,
                last_exited_venue: None,
                selected_content: None,
                direction_from_point: None,
                direction_to_point: None,
                direction_mode: None,
                direction: None,
                navigation_info: None,
                floors: vec![],
                preferred_language: lang.to_string(),
                language: lang.to_string(),
                unit: options.unit,
                heading: 0.0,
                main_color: color.clone(),
            },
            universe_selector: UniverseSelectorState {
                is_expanded: false,
                is_hidden: false,
                universes: vec![],
                selected_universe: None,
                tooltip_message: localizer.change_universe(lang),
                main_color: color.clone(),
            },
            language_selector: LanguageSelectorState {
                is_expanded: false,
                is_hidden: false,
                languages: vec![],
                selected_language: i18n::language_display_name(lang).map(str::to_string),
                tooltip_message: localizer.change_language(lang),
                main_color: color.clone(),
            },
            search_container: SearchContainerState {
                is_in_search: false,
                main_color: color.clone(),
            },
            search_bar: SearchBarState {
                is_in_search: false,
                is_hidden: false,
                search_query: String::new(),
                search_placeholder: localizer.search_global(lang),
                direction_button_hidden: true,
                menu_button_hidden: options.menu_button_hidden,
                menu_tooltip_message: localizer.menu(lang),
                back_tooltip_message: localizer.back(lang),
                direction_tooltip_message: localizer.direction(lang),
                main_color: color.clone(),
            },
            search_result_list: SearchResultListState {
                is_in_direction_search: false,
                is_hidden: true,
                results: None,
                show_current_location: None,
                no_result_label: localizer.search_no_results(lang),
                universes: vec![],
                current_universe: None,
                main_color: color.clone(),
            },
            search_direction_bar: SearchDirectionBarState {
                is_hidden: true,
                from_placeholder: localizer.choose_starting_point(lang),
                to_placeholder: localizer.choose_destination(lang),
                from_query: String::new(),
                to_query: String::new(),
                modes: vec![],
                selected_mode: None,
                is_in_search: false,
                is_to_focus: false,
                is_from_focus: false,
                main_color: color.clone(),
            },
            floor_controller: FloorControllerState {
                is_hidden: options.floor_controller_hidden,
                floors: vec![],
                selected_floor: None,
                loading_floor: None,
                tooltip_message: localizer.floor_controller(lang),
                main_color: color.clone(),
            },
            bottom_view: BottomViewState {
                expanded: false,
                hidden: true,
                language: lang.to_string(),
                content: None,
                direction_content: None,
                main_color: color.clone(),
            },
            follow_user_button: FollowUserButtonState {
                is_hidden: options.follow_user_button_hidden,
                follow_user_mode: FollowUserMode::None,
                tooltip_message: localizer.use_my_location(lang),
                main_color: color,
            },
        }
    }

    /// Current mode
    pub fn status(&self) -> UiStatus {
        self.controller.status
    }
}
