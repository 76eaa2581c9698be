//! Indoor map data API
//!
//! This crate provides the domain model of the indoor map data service
//! (venues, places, placelists, directions), the transport contract used to
//! reach it, a REST implementation of that contract, and the `ApiService`
//! facade that the UI layer talks to.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod http;
pub mod service;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use client::MapApi;
pub use http::{ApiClientConfig, HttpMapApi};
pub use service::{ApiService, ContentRestriction};
pub use types::{
    CalendarEvent, Direction, DirectionMode, DirectionPoint, Floor, FloorInfo, LatLngFloor,
    MapObject, ObjectClass, OpeningInterval, Place, PlaceDetails, PlacePreview, Placelist,
    SearchObject, SearchParams, Translated, Translation, Universe, Venue, Waypoint,
};

/// Result type for map API operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for map API operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API error with status code and message
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from server
        message: String,
    },

    /// A lookup by identifier returned nothing
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of object that was looked up
        kind: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// The routing service could not compute a direction
    #[error("Direction error: {0}")]
    Direction(String),
}

impl Error {
    /// Build a not-found error for the given object kind
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Check whether this error is a missing lookup
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
