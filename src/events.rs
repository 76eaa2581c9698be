//! Inbound events routed by the controller

use map_api::{
    Direction, DirectionMode, Floor, LatLngFloor, MapObject, Placelist, SearchObject, Universe, Venue,
};
use ui_state::formatter::SearchResult;
use ui_state::{Camera, DirectionOptions, FollowUserMode, NavigationInfo, NavigationRequest, Unit};

/// What a map click hit
#[derive(Debug, Clone, PartialEq)]
pub enum MapClick {
    /// Empty map
    Map(LatLngFloor),
    /// A venue outline
    Venue(Venue),
    /// A place
    Place(MapObject),
}

/// Events emitted by the map surface
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The user tapped the map
    Click(MapClick),
    /// The camera is about to enter a venue
    VenueWillEnter(Venue),
    /// The camera entered a venue
    VenueEnter(Venue),
    /// The camera left a venue
    VenueExit(Venue),
    /// The venue's floors changed
    FloorsChange(Vec<Floor>),
    /// A floor started loading
    FloorWillChange(Option<f64>),
    /// A floor is displayed
    FloorChange(Option<f64>),
    /// The venue's universes changed
    UniversesChange(Vec<Universe>),
    /// A universe is displayed
    UniverseChange(Universe),
    /// The venue content language changed
    LanguageChange(String),
    /// The venue's travel modes changed
    DirectionModesChange(Vec<DirectionMode>),
    /// The follow-user mode changed
    FollowUserModeChange(FollowUserMode),
    /// The camera moved
    CameraChange(Camera),
    /// The user position changed
    UserLocationChange(Option<LatLngFloor>),
    /// Navigation progress
    NavigationInfo(NavigationInfo),
}

/// Events emitted by the overlay widgets
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Search field focused
    SearchFocus,
    /// Search field blurred
    SearchBlur,
    /// Search back button
    SearchBackButtonClick,
    /// Search text changed
    SearchQueryChange(String),
    /// A result was tapped
    SearchResultSelect {
        /// Tapped result
        result: SearchResult,
        /// Universe group the result was listed under
        universe: Option<Universe>,
    },
    /// Direction button of the search bar
    DirectionButtonClick,
    /// Direction back button
    DirectionBackButtonClick,
    /// Origin field focused
    DirectionFromFocus,
    /// Origin field blurred
    DirectionFromBlur,
    /// Destination field focused
    DirectionToFocus,
    /// Destination field blurred
    DirectionToBlur,
    /// Origin text changed
    DirectionFromQueryChange(String),
    /// Destination text changed
    DirectionToQueryChange(String),
    /// "Current location" entry tapped
    SelectCurrentLocation,
    /// Swap button
    SwapFromAndTo,
    /// Travel mode picked
    DirectionModeChange(DirectionMode),
    /// Floor picked in the floor controller
    FloorClick(Option<f64>),
    /// Universe selector button
    ToggleUniverseSelector,
    /// Universe picked
    UniverseSelect(Universe),
    /// Language selector button
    ToggleLanguageSelector,
    /// Content language picked
    LanguageSelect(String),
    /// Follow-user button
    FollowUserButtonClick,
    /// Compass
    CompassClick,
    /// Bottom view handle
    BottomViewToggle,
    /// Information button of the place panel
    InformationButtonClick,
    /// Menu button of the search bar
    MenuButtonClick,
}

/// Commands issued by the host application
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    /// Switch the UI language
    SetLocale(String),
    /// Switch the distance unit
    SetUnit(Unit),
    /// Pick a travel mode by identifier
    SetMode(String),
    /// Select a place and center on it
    SelectPlace(MapObject),
    /// Select a placelist and center on its venue
    SelectPlacelist(Placelist),
    /// Select a place and open the direction flow towards it
    SelectPlaceAndGoDirection(MapObject),
    /// Display a host-computed direction, or leave the direction flow
    SetDirection(Option<(Direction, DirectionOptions)>),
    /// Start a navigation from the user position, or leave the direction flow
    SetNavigation(Option<NavigationRequest>),
    /// Replace the result list
    SearchResultsChange(Vec<SearchObject>),
}

/// Any event the controller accepts
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// From the map surface
    Map(MapEvent),
    /// From the overlay widgets
    Ui(UiEvent),
    /// From the host
    Host(HostCommand),
}

impl From<MapEvent> for ControllerEvent {
    fn from(event: MapEvent) -> Self {
        ControllerEvent::Map(event)
    }
}

impl From<UiEvent> for ControllerEvent {
    fn from(event: UiEvent) -> Self {
        ControllerEvent::Ui(event)
    }
}

impl From<HostCommand> for ControllerEvent {
    fn from(command: HostCommand) -> Self {
        ControllerEvent::Host(command)
    }
}
