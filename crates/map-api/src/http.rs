//! REST transport for the map data service

use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Response as ReqwestResponse, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::client::MapApi;
use crate::types::{
    Direction, DirectionRequest, Place, PlaceDetails, Placelist, SearchObject, SearchParams,
};
use crate::{Error, Result};

// =============================================================================
// Client Configuration
// =============================================================================

/// Configuration for the REST transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiClientConfig {
    /// Base service URL (e.g., "https://api.example.com")
    pub base_url: String,
    /// API key sent with every request
    pub api_key: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl ApiClientConfig {
    /// Create a config for a service URL and API key
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
            user_agent: format!("indoor-ui/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Error body returned by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    message: String,
}

// =============================================================================
// Client Implementation
// =============================================================================

/// `MapApi` over HTTP
#[derive(Debug, Clone)]
pub struct HttpMapApi {
    client: ReqwestClient,
    config: ApiClientConfig,
}

impl HttpMapApi {
    /// Create a transport from its configuration
    pub fn new(config: ApiClientConfig) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the client configuration
    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T>(&self, path: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .client
            .get(self.url(path))
            .query(&[("api_key", &self.config.api_key)])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.url(path))
            .query(&[("api_key", &self.config.api_key)])
            .json(body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Parse a response; 404 means the lookup found nothing
    async fn parse_response<T>(response: ReqwestResponse) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorResponse>(&error_body) {
                Ok(error_response) => error_response.message,
                Err(_) => format!("HTTP {}: {}", status.as_u16(), error_body),
            };
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() || body.trim() == "null" {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&body)?))
    }
}

#[async_trait]
impl MapApi for HttpMapApi {
    async fn search(&self, params: &SearchParams) -> Result<Vec<SearchObject>> {
        tracing::debug!("search: {:?}", params.query);
        Ok(self.post_json("search", params).await?.unwrap_or_default())
    }

    async fn place(&self, id: &str) -> Result<Option<Place>> {
        self.get_json(&format!("places/{}", id)).await
    }

    async fn place_details(&self, id: &str) -> Result<Option<PlaceDetails>> {
        self.get_json(&format!("places/{}/details", id)).await
    }

    async fn placelist(&self, id: &str) -> Result<Option<Placelist>> {
        self.get_json(&format!("placeLists/{}", id)).await
    }

    async fn places_for_placelist(&self, id: &str) -> Result<Option<Vec<Place>>> {
        self.get_json(&format!("placeLists/{}/places", id)).await
    }

    async fn direction(&self, request: &DirectionRequest) -> Result<Option<Direction>> {
        self.post_json("directions", request).await
    }

    async fn main_searches(&self, venue_id: &str) -> Result<Vec<SearchObject>> {
        Ok(self
            .get_json(&format!("venues/{}/mainSearches", venue_id))
            .await?
            .unwrap_or_default())
    }

    async fn main_froms(&self, venue_id: &str) -> Result<Vec<SearchObject>> {
        Ok(self
            .get_json(&format!("venues/{}/mainFroms", venue_id))
            .await?
            .unwrap_or_default())
    }
}
