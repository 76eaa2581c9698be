//! `ApiService`: the facade the UI layer queries
//!
//! Merges the content restriction into every search, converts empty lookups
//! into `Error::NotFound` and routing failures into `Error::Direction`.
//! No caching, no retries.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::client::MapApi;
use crate::types::{
    Direction, DirectionMode, DirectionPoint, DirectionRequest, Place, PlaceDetails, Placelist,
    SearchObject, SearchParams, Venue, Waypoint,
};
use crate::{Error, Result};

/// Organization/venue scoping applied to every search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRestriction {
    /// Only return content of this organization
    #[serde(
        rename = "restrictContentToOrganizationId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub organization_id: Option<String>,
    /// Only return content of this venue
    #[serde(
        rename = "restrictContentToVenueId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub venue_id: Option<String>,
    /// Only return content of these venues
    #[serde(
        rename = "restrictContentToVenueIds",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub venue_ids: Option<Vec<String>>,
}

impl ContentRestriction {
    /// Overlay the restriction on caller parameters
    pub fn apply(&self, mut params: SearchParams) -> SearchParams {
        if let Some(venue_id) = &self.venue_id {
            params.venue_id = Some(venue_id.clone());
        }
        if let Some(venue_ids) = &self.venue_ids {
            params.venue_ids = Some(venue_ids.clone());
        }
        if let Some(organization_id) = &self.organization_id {
            params.organization_id = Some(organization_id.clone());
        }
        params
    }
}

/// Facade over a `MapApi` transport
#[derive(Clone)]
pub struct ApiService {
    api: Arc<dyn MapApi>,
    restriction: ContentRestriction,
}

impl ApiService {
    /// Create a service over a transport
    pub fn new(api: Arc<dyn MapApi>, restriction: ContentRestriction) -> Self {
        Self { api, restriction }
    }

    /// Restriction merged into searches
    pub fn restriction(&self) -> &ContentRestriction {
        &self.restriction
    }

    /// Search, scoped by the content restriction
    pub async fn search(&self, params: SearchParams) -> Result<Vec<SearchObject>> {
        let params = self.restriction.apply(params);
        self.api.search(&params).await
    }

    /// Curated search results of a venue; empty without venue
    pub async fn get_main_searches(&self, venue: Option<&Venue>) -> Result<Vec<SearchObject>> {
        match venue {
            Some(venue) => self.api.main_searches(&venue.id).await,
            None => Ok(Vec::new()),
        }
    }

    /// Curated starting points of a venue; empty without venue
    pub async fn get_main_froms(&self, venue: Option<&Venue>) -> Result<Vec<SearchObject>> {
        match venue {
            Some(venue) => self.api.main_froms(&venue.id).await,
            None => Ok(Vec::new()),
        }
    }

    /// Fetch a place
    pub async fn get_place(&self, id: &str) -> Result<Place> {
        self.api
            .place(id)
            .await?
            .ok_or_else(|| Error::not_found("Place", id))
    }

    /// Fetch the details of a place
    pub async fn get_place_details(&self, id: &str) -> Result<PlaceDetails> {
        self.api
            .place_details(id)
            .await?
            .ok_or_else(|| Error::not_found("PlaceDetails", id))
    }

    /// Fetch a placelist
    pub async fn get_placelist(&self, id: &str) -> Result<Placelist> {
        self.api
            .placelist(id)
            .await?
            .ok_or_else(|| Error::not_found("Placelist", id))
    }

    /// Fetch the places of a placelist
    pub async fn get_places_for_placelist(&self, placelist: &Placelist) -> Result<Vec<Place>> {
        self.api
            .places_for_placelist(&placelist.id)
            .await?
            .ok_or_else(|| Error::not_found("Placelist", placelist.id.as_str()))
    }

    /// Compute a direction between two endpoints
    ///
    /// Detailed endpoints are resolved to their place first, then every
    /// endpoint is reduced to a reference.
    pub async fn get_direction(
        &self,
        from: &DirectionPoint,
        to: &DirectionPoint,
        mode: Option<&DirectionMode>,
    ) -> Result<Direction> {
        let request = DirectionRequest {
            from: self.waypoint(from).await?,
            to: self.waypoint(to).await?,
            mode_id: mode.map(|m| m.id.clone()),
        };

        match self.api.direction(&request).await {
            Ok(Some(direction)) => Ok(direction),
            Ok(None) => Err(Error::Direction(format!(
                "No direction found from {:?} to {:?}",
                request.from, request.to
            ))),
            Err(e) => Err(Error::Direction(e.to_string())),
        }
    }

    async fn waypoint(&self, point: &DirectionPoint) -> Result<Waypoint> {
        Ok(match point {
            DirectionPoint::PlaceDetails(details) => {
                let place = self.get_place(&details.id).await?;
                Waypoint::Place { place_id: place.id }
            }
            DirectionPoint::Place(place) => Waypoint::Place {
                place_id: place.id.clone(),
            },
            DirectionPoint::PlacePreview(preview) => Waypoint::Place {
                place_id: preview.id.clone(),
            },
            DirectionPoint::Placelist(placelist) => Waypoint::Placelist {
                place_list_id: placelist.id.clone(),
            },
            DirectionPoint::Coordinate(coordinate) => Waypoint::Coordinate(*coordinate),
        })
    }
}

impl std::fmt::Debug for ApiService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiService")
            .field("restriction", &self.restriction)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockMapApi;
    use crate::test_utils::fixtures;
    use crate::types::{LatLngFloor, ObjectClass};

    fn service(mock: MockMapApi, restriction: ContentRestriction) -> ApiService {
        ApiService::new(Arc::new(mock), restriction)
    }

    #[test]
    fn test_restriction_overrides_params() {
        let restriction = ContentRestriction {
            organization_id: Some("org".to_string()),
            venue_id: Some("v-restricted".to_string()),
            venue_ids: Some(vec!["a".to_string(), "b".to_string()]),
        };
        let params = SearchParams::new("door", vec![ObjectClass::Place]).with_venue(Some("v1".to_string()));
        let merged = restriction.apply(params);
        assert_eq!(merged.venue_id.as_deref(), Some("v-restricted"));
        assert_eq!(merged.venue_ids, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(merged.organization_id.as_deref(), Some("org"));
        assert_eq!(merged.query, "door");
    }

    #[test]
    fn test_empty_restriction_keeps_params() {
        let params = SearchParams::new("door", vec![ObjectClass::Place]).with_venue(Some("v1".to_string()));
        assert_eq!(ContentRestriction::default().apply(params.clone()), params);
    }

    #[tokio::test]
    async fn test_search_forwards_merged_params() {
        let mut mock = MockMapApi::new();
        mock.expect_search()
            .withf(|p: &SearchParams| p.organization_id.as_deref() == Some("org") && p.query == "cafe")
            .times(1)
            .returning(|_| Ok(vec![SearchObject::Place(fixtures::place("p1", "Cafe"))]));

        let restriction = ContentRestriction {
            organization_id: Some("org".to_string()),
            ..Default::default()
        };
        let results = service(mock, restriction)
            .search(SearchParams::new("cafe", vec![ObjectClass::Place]))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_search_error_propagates() {
        let mut mock = MockMapApi::new();
        mock.expect_search().returning(|_| {
            Err(Error::Api {
                status: 503,
                message: "unavailable".to_string(),
            })
        });

        let err = service(mock, ContentRestriction::default())
            .search(SearchParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_main_searches_without_venue_is_empty() {
        let mut mock = MockMapApi::new();
        mock.expect_main_searches().never();
        mock.expect_main_froms().never();

        let service = service(mock, ContentRestriction::default());
        assert!(service.get_main_searches(None).await.unwrap().is_empty());
        assert!(service.get_main_froms(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_main_froms_with_venue() {
        let mut mock = MockMapApi::new();
        mock.expect_main_froms()
            .withf(|id: &str| id == "v1")
            .returning(|_| Ok(vec![SearchObject::Place(fixtures::place("entrance", "Entrance"))]));

        let venue = fixtures::venue("v1", "Mall");
        let results = service(mock, ContentRestriction::default())
            .get_main_froms(Some(&venue))
            .await
            .unwrap();
        assert_eq!(results[0].id(), "entrance");
    }

    #[tokio::test]
    async fn test_lookup_empty_is_not_found() {
        let mut mock = MockMapApi::new();
        mock.expect_place().returning(|_| Ok(None));
        mock.expect_place_details().returning(|_| Ok(None));
        mock.expect_placelist().returning(|_| Ok(None));

        let service = service(mock, ContentRestriction::default());
        assert!(service.get_place("missing").await.unwrap_err().is_not_found());
        assert!(service.get_place_details("missing").await.unwrap_err().is_not_found());
        assert!(service.get_placelist("missing").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_direction_downgrades_details() {
        let mut mock = MockMapApi::new();
        mock.expect_place()
            .withf(|id: &str| id == "p1")
            .times(1)
            .returning(|_| Ok(Some(fixtures::place("p1", "Door"))));
        mock.expect_direction()
            .withf(|r: &DirectionRequest| {
                r.from
                    == Waypoint::Place {
                        place_id: "p1".to_string(),
                    }
                    && r.to == Waypoint::Coordinate(LatLngFloor::new(1.0, 2.0, Some(0.0)))
                    && r.mode_id.as_deref() == Some("walk")
            })
            .times(1)
            .returning(|r| Ok(Some(fixtures::direction_between(r.from.clone(), r.to.clone(), 42.0, 30.0))));

        let from = DirectionPoint::PlaceDetails(fixtures::place_details("p1", "Door"));
        let to = DirectionPoint::Coordinate(LatLngFloor::new(1.0, 2.0, Some(0.0)));
        let mode = fixtures::direction_mode("walk");
        let direction = service(mock, ContentRestriction::default())
            .get_direction(&from, &to, Some(&mode))
            .await
            .unwrap();
        assert_eq!(direction.distance, 42.0);
    }

    #[tokio::test]
    async fn test_direction_failure_is_direction_error() {
        let mut mock = MockMapApi::new();
        mock.expect_direction().times(1).returning(|_| Ok(None));

        let from = DirectionPoint::Place(fixtures::place("a", "A"));
        let to = DirectionPoint::Placelist(fixtures::placelist("l1", "Toilets", &["b"]));
        let err = service(mock, ContentRestriction::default())
            .get_direction(&from, &to, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Direction(_)));
    }

    #[tokio::test]
    async fn test_direction_transport_error_is_direction_error() {
        let mut mock = MockMapApi::new();
        mock.expect_direction().returning(|_| {
            Err(Error::Api {
                status: 500,
                message: "routing down".to_string(),
            })
        });

        let from = DirectionPoint::Place(fixtures::place("a", "A"));
        let to = DirectionPoint::Place(fixtures::place("b", "B"));
        let err = service(mock, ContentRestriction::default())
            .get_direction(&from, &to, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("routing down"));
    }
}
