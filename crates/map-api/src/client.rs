//! Transport contract of the map data service
//!
//! `MapApi` is the raw call surface: lookups return `Ok(None)` when the
//! backend has nothing for the identifier, and `ApiService` turns that into
//! `Error::NotFound`.

use async_trait::async_trait;

use crate::types::{
    Direction, DirectionRequest, Place, PlaceDetails, Placelist, SearchObject, SearchParams,
};
use crate::Result;

/// Raw access to the map data service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MapApi: Send + Sync {
    /// Full-text search
    async fn search(&self, params: &SearchParams) -> Result<Vec<SearchObject>>;

    /// Fetch a place by identifier
    async fn place(&self, id: &str) -> Result<Option<Place>>;

    /// Fetch the enriched details of a place
    async fn place_details(&self, id: &str) -> Result<Option<PlaceDetails>>;

    /// Fetch a placelist by identifier
    async fn placelist(&self, id: &str) -> Result<Option<Placelist>>;

    /// Fetch the places of a placelist
    async fn places_for_placelist(&self, id: &str) -> Result<Option<Vec<Place>>>;

    /// Compute a route between two references
    async fn direction(&self, request: &DirectionRequest) -> Result<Option<Direction>>;

    /// Curated default search results of a venue
    async fn main_searches(&self, venue_id: &str) -> Result<Vec<SearchObject>>;

    /// Curated default starting points of a venue
    async fn main_froms(&self, venue_id: &str) -> Result<Vec<SearchObject>>;
}
