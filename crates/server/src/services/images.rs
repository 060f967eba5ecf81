//! Image hosting uploads.
//!
//! Listings carry hosted image URLs, not blobs. Clients send a base64
//! payload; this client forwards it to the configured hosting endpoint and
//! hands back the hosted URL.

use base64::{Engine, engine::general_purpose::STANDARD};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use crate::config::ImageStoreConfig;

/// Errors that can occur when uploading an image.
#[derive(Debug, Error)]
pub enum ImageStoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The payload is not usable base64.
    #[error("Invalid image payload: {0}")]
    InvalidPayload(String),
}

/// Client for the image hosting endpoint.
#[derive(Clone)]
pub struct ImageStore {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: UploadData,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
}

impl ImageStore {
    /// Create a new image store client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ImageStoreConfig) -> Result<Self, ImageStoreError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.expose_secret().to_string(),
        })
    }

    /// Upload a base64 image payload and return the hosted URL.
    ///
    /// Accepts both a bare base64 string and a full `data:` URL.
    ///
    /// # Errors
    ///
    /// Returns `ImageStoreError::InvalidPayload` if the payload does not
    /// decode, or another variant if the upload itself fails.
    pub async fn upload(&self, payload: &str) -> Result<String, ImageStoreError> {
        let encoded = payload
            .rsplit_once("base64,")
            .map_or(payload, |(_, rest)| rest)
            .trim();

        let decoded = STANDARD
            .decode(encoded)
            .map_err(|e| ImageStoreError::InvalidPayload(e.to_string()))?;
        if decoded.is_empty() {
            return Err(ImageStoreError::InvalidPayload("empty image".to_string()));
        }

        let form = [("key", self.api_key.as_str()), ("image", encoded)];
        let response = self.client.post(&self.endpoint).form(&form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ImageStoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| ImageStoreError::Parse(e.to_string()))?;

        Ok(upload.data.url)
    }
}
