//! Contract of the map rendering surface
//!
//! The surface is the native map view. Only `MapActionsDispatcher` holds a
//! handle to it; everything else goes through the dispatcher.

use async_trait::async_trait;
use map_api::{Direction, DirectionMode, DirectionPoint, LatLngFloor, MapObject, Universe, Venue};
use serde::{Deserialize, Serialize};

/// Default distance in meters before navigation recomputes the route
pub const DEFAULT_OUT_OF_PATH_DISTANCE: f64 = 15.0;

/// Where to point the camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CameraTarget {
    /// A coordinate
    Coordinate(LatLngFloor),
    /// A place, by identifier
    Place(String),
    /// A venue, by identifier
    Venue(String),
}

/// Follow-user mode of the map camera
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUserMode {
    /// Camera is free
    #[default]
    None,
    /// Camera follows the user position
    FollowUser,
    /// Camera follows position and heading
    FollowUserAndHeading,
}

impl FollowUserMode {
    /// Mode after a tap on the follow-user button
    pub fn next(self) -> Self {
        match self {
            FollowUserMode::None => FollowUserMode::FollowUser,
            FollowUserMode::FollowUser => FollowUserMode::FollowUserAndHeading,
            FollowUserMode::FollowUserAndHeading => FollowUserMode::None,
        }
    }
}

/// A marker drawn on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Marker position
    pub coordinate: LatLngFloor,
}

/// Display options of a direction overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionOptions {
    /// Move the camera to the route start
    pub center_on_start: bool,
    /// Switch to the starting floor
    pub display_starting_floor: bool,
    /// Start marker label
    pub start_label: Option<String>,
    /// End marker label
    pub end_label: Option<String>,
}

impl Default for DirectionOptions {
    fn default() -> Self {
        Self {
            center_on_start: true,
            display_starting_floor: true,
            start_label: None,
            end_label: None,
        }
    }
}

impl DirectionOptions {
    /// Set whether the camera centers on the route start
    pub fn with_center_on_start(mut self, center: bool) -> Self {
        self.center_on_start = center;
        self
    }

    /// Set whether the map switches to the starting floor
    pub fn with_display_starting_floor(mut self, display: bool) -> Self {
        self.display_starting_floor = display;
        self
    }
}

/// A direction displayed on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionOverlay {
    /// The route
    pub direction: Direction,
    /// How to display it
    pub options: DirectionOptions,
}

/// A live navigation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationRequest {
    /// Where to go
    pub destination: DirectionPoint,
    /// Travel mode
    pub mode: Option<DirectionMode>,
    /// Display options
    pub options: DirectionOptions,
    /// Distance in meters before the route is recomputed
    pub out_of_path_distance: f64,
}

impl NavigationRequest {
    /// Request with default options
    pub fn new(destination: DirectionPoint, mode: Option<DirectionMode>) -> Self {
        Self {
            destination,
            mode,
            options: DirectionOptions::default(),
            out_of_path_distance: DEFAULT_OUT_OF_PATH_DISTANCE,
        }
    }
}

/// Progress reported by an active navigation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationInfo {
    /// Remaining time in seconds
    pub duration: f64,
    /// Remaining distance in meters
    pub distance: f64,
}

/// Camera position reported by the surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Heading in degrees
    pub bearing: f64,
    /// Zoom level
    pub zoom: f64,
    /// Center of the view
    pub center: Option<LatLngFloor>,
}

/// Commands and queries accepted by the map rendering surface
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MapSurface: Send + Sync {
    /// Move the camera
    fn center_on(&self, target: CameraTarget, zoom: Option<f64>);

    /// Current zoom level
    async fn zoom(&self) -> f64;

    /// Display a floor
    fn set_floor(&self, floor: Option<f64>);

    /// Display a universe
    fn set_universe(&self, universe: &Universe);

    /// Language used when entering venues
    fn set_preferred_language(&self, language: &str);

    /// Content language of a venue
    fn set_language_for_venue(&self, language: &str, venue: &Venue);

    /// Current follow-user mode
    async fn follow_user_mode(&self) -> FollowUserMode;

    /// Change the follow-user mode
    fn set_follow_user_mode(&self, mode: FollowUserMode);

    /// Rotate the camera to north
    fn reset_north(&self);

    /// Show or hide the user location
    fn set_user_location(&self, location: Option<LatLngFloor>);

    /// Highlight a place, or clear the highlight
    fn set_selected_place(&self, place: Option<MapObject>);

    /// Replace the markers
    fn set_markers(&self, markers: Vec<Marker>);

    /// Show or hide the direction overlay
    fn show_direction(&self, overlay: Option<DirectionOverlay>);

    /// Show or hide the navigation overlay
    fn show_navigation(&self, navigation: Option<NavigationRequest>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_user_mode_cycle() {
        let mode = FollowUserMode::None;
        assert_eq!(mode.next(), FollowUserMode::FollowUser);
        assert_eq!(mode.next().next(), FollowUserMode::FollowUserAndHeading);
        assert_eq!(mode.next().next().next(), FollowUserMode::None);
    }

    #[test]
    fn test_direction_options_default() {
        let options = DirectionOptions::default();
        assert!(options.center_on_start);
        assert!(options.display_starting_floor);

        let options = options.with_center_on_start(false).with_display_starting_floor(false);
        assert!(!options.center_on_start);
        assert!(!options.display_starting_floor);
    }

    #[test]
    fn test_navigation_request_defaults() {
        let request = NavigationRequest::new(
            DirectionPoint::Coordinate(LatLngFloor::new(1.0, 2.0, Some(0.0))),
            None,
        );
        assert_eq!(request.out_of_path_distance, 15.0);
        assert!(request.options.center_on_start);
    }
}
