//! Host hooks around default overlay behavior
//!
//! Every hook has a default implementation, so a host implements only the
//! ones it cares about and injects the result at construction.

use async_trait::async_trait;
use map_api::{Direction, DirectionMode, DirectionPoint, MapObject, Universe, Venue};

use crate::content::{ButtonContent, RowContent};
use crate::formatter::FormattedPlaceDetails;
use crate::surface::NavigationRequest;

/// Hooks a host application can override
#[async_trait]
pub trait CallbackInterceptor: Send + Sync {
    /// The overlay is mounted and its initial state is rendered
    fn on_ui_ready(&self) {
        tracing::debug!("onUiReady");
    }

    /// Called before the data service computes a direction
    ///
    /// Returning a direction skips the data service.
    async fn on_direction_will_start(
        &self,
        _venue: &Venue,
        _universe: &Universe,
        _from: &DirectionPoint,
        _to: &DirectionPoint,
        _mode: &DirectionMode,
        _is_navigation: bool,
    ) -> Option<Direction> {
        tracing::debug!("onDirectionWillStart");
        None
    }

    /// Called before a navigation is handed to the map
    ///
    /// Returning a request replaces the one built by the overlay.
    fn on_navigation_requested(
        &self,
        _venue: &Venue,
        _universe: &Universe,
        _navigation: &NavigationRequest,
    ) -> Option<NavigationRequest> {
        tracing::debug!("onNavigationRequested");
        None
    }

    /// Whether the place panel shows an information button
    fn should_display_information_button(&self, _details: &FormattedPlaceDetails) -> bool {
        true
    }

    /// The information button was tapped
    fn on_information_button_click(&self, object: &MapObject) {
        tracing::debug!("onInformationButtonClick {}", object.id());
    }

    /// The menu button was tapped
    fn on_menu_button_click(&self) {
        tracing::debug!("onMenuButtonClick");
    }

    /// The follow-user button was tapped while no location is known
    fn on_follow_user_button_click_without_location(&self) {
        tracing::debug!("onFollowUserButtonClickWithoutLocation");
    }

    /// Last chance to edit the place panel before it is rendered
    fn on_place_selected(
        &self,
        details: &FormattedPlaceDetails,
        _rows: &mut Vec<RowContent>,
        _buttons: &mut Vec<ButtonContent>,
    ) {
        tracing::debug!("onPlaceSelected {}", details.details.id);
    }
}

/// Interceptor keeping every default
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultInterceptor;

impl CallbackInterceptor for DefaultInterceptor {}

#[cfg(test)]
mod tests {
    use super::*;
    use map_api::test_utils::fixtures;
    use map_api::LatLngFloor;

    struct FixedDirection;

    #[async_trait]
    impl CallbackInterceptor for FixedDirection {
        async fn on_direction_will_start(
            &self,
            _venue: &Venue,
            _universe: &Universe,
            _from: &DirectionPoint,
            _to: &DirectionPoint,
            _mode: &DirectionMode,
            _is_navigation: bool,
        ) -> Option<Direction> {
            Some(fixtures::direction("a", "b", 10.0, 10.0))
        }
    }

    #[tokio::test]
    async fn test_default_hooks() {
        let interceptor = DefaultInterceptor;
        let venue = fixtures::venue("v1", "Mall");
        let universe = fixtures::universe("u1");
        let from = DirectionPoint::Coordinate(LatLngFloor::new(1.0, 1.0, Some(0.0)));
        let to = DirectionPoint::Place(fixtures::place("b", "B"));
        let mode = fixtures::direction_mode("walk");

        let direction = interceptor
            .on_direction_will_start(&venue, &universe, &from, &to, &mode, false)
            .await;
        assert!(direction.is_none());

        let navigation = NavigationRequest::new(to.clone(), Some(mode));
        assert!(interceptor
            .on_navigation_requested(&venue, &universe, &navigation)
            .is_none());

        let details = crate::formatter::build_place_details(fixtures::place_details("p1", "P"), "en");
        assert!(interceptor.should_display_information_button(&details));
    }

    #[tokio::test]
    async fn test_override_single_hook() {
        let interceptor = FixedDirection;
        let venue = fixtures::venue("v1", "Mall");
        let universe = fixtures::universe("u1");
        let point = DirectionPoint::Place(fixtures::place("a", "A"));
        let mode = fixtures::direction_mode("walk");

        let direction = interceptor
            .on_direction_will_start(&venue, &universe, &point, &point, &mode, false)
            .await;
        assert_eq!(direction.map(|d| d.distance), Some(10.0));

        let details = crate::formatter::build_place_details(fixtures::place_details("p1", "P"), "en");
        assert!(interceptor.should_display_information_button(&details));
    }
}
