//! Forward geocoding for collection addresses.
//!
//! Resolves a seller's collection address to a point on the map via a
//! Nominatim-compatible search endpoint. Resolved addresses are cached
//! in-memory for 24 hours.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use farmgate_core::types::GeoPoint;

use crate::config::GeocoderConfig;

/// Errors that can occur when geocoding an address.
#[derive(Debug, Error)]
pub enum GeocoderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The endpoint had no match for the address.
    #[error("No match for address: {0}")]
    NoMatch(String),
}

/// Client for the geocoding endpoint.
#[derive(Clone)]
pub struct Geocoder {
    inner: Arc<GeocoderInner>,
}

struct GeocoderInner {
    client: reqwest::Client,
    endpoint: String,
    cache: Cache<String, GeoPoint>,
}

/// One match from the search endpoint. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
}

impl Geocoder {
    /// Create a new geocoder client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocoderError> {
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(24 * 60 * 60))
            .build();

        let client = reqwest::Client::builder()
            .user_agent("farmgate-server")
            .build()?;

        Ok(Self {
            inner: Arc::new(GeocoderInner {
                client,
                endpoint: config.endpoint.clone(),
                cache,
            }),
        })
    }

    /// Resolve an address to a point.
    ///
    /// # Errors
    ///
    /// Returns `GeocoderError::NoMatch` if the endpoint has no result for
    /// the address, or another variant if the request itself fails.
    pub async fn geocode(&self, address: &str) -> Result<GeoPoint, GeocoderError> {
        let cache_key = address.trim().to_lowercase();

        if let Some(point) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for address");
            return Ok(point);
        }

        let url = format!("{}/search", self.inner.endpoint);
        let response = self
            .inner
            .client
            .get(&url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GeocoderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let matches: Vec<SearchResult> = response
            .json()
            .await
            .map_err(|e| GeocoderError::Parse(e.to_string()))?;

        let hit = matches
            .into_iter()
            .next()
            .ok_or_else(|| GeocoderError::NoMatch(address.to_string()))?;

        let longitude: f64 = hit
            .lon
            .parse()
            .map_err(|e| GeocoderError::Parse(format!("bad longitude {:?}: {e}", hit.lon)))?;
        let latitude: f64 = hit
            .lat
            .parse()
            .map_err(|e| GeocoderError::Parse(format!("bad latitude {:?}: {e}", hit.lat)))?;

        let point = GeoPoint::new(longitude, latitude)
            .map_err(|e| GeocoderError::Parse(e.to_string()))?;

        self.inner.cache.insert(cache_key, point).await;
        Ok(point)
    }
}
