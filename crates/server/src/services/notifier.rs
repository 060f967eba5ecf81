//! Order notification delivery.
//!
//! Posts order lifecycle messages to the configured notification endpoint.
//! Delivery is best-effort: callers spawn these off the request path and a
//! failed delivery never fails the order it describes.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use thiserror::Error;

use farmgate_core::types::{Email, Price};

use crate::config::NotifierConfig;
use crate::models::Order;

/// Errors that can occur when delivering a notification.
#[derive(Debug, Error)]
pub enum NotifierError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to build the request.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Client for the order notification endpoint.
#[derive(Clone)]
pub struct NotifierClient {
    client: reqwest::Client,
    endpoint: String,
}

impl NotifierClient {
    /// Create a new notifier client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &NotifierConfig) -> Result<Self, NotifierError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value)
                .map_err(|e| NotifierError::Parse(format!("Invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Tell the buyer their order went in.
    ///
    /// # Errors
    ///
    /// Returns error if the delivery request fails.
    pub async fn order_placed(&self, email: &Email, order: &Order) -> Result<(), NotifierError> {
        let body = serde_json::json!({
            "to": email.as_str(),
            "template": "order-placed",
            "order": {
                "id": order.id.as_str(),
                "total": Price::gbp(order.order_total).to_string(),
                "items": order
                    .items
                    .iter()
                    .map(|item| serde_json::json!({
                        "name": item.product_name,
                        "quantity": item.quantity.get(),
                        "lineTotal": Price::gbp(item.line_total()).to_string(),
                    }))
                    .collect::<Vec<_>>(),
            },
        });

        self.deliver(body).await
    }

    /// Tell the buyer their order moved to a new status.
    ///
    /// # Errors
    ///
    /// Returns error if the delivery request fails.
    pub async fn order_status_changed(
        &self,
        email: &Email,
        order: &Order,
    ) -> Result<(), NotifierError> {
        let body = serde_json::json!({
            "to": email.as_str(),
            "template": "order-status",
            "order": {
                "id": order.id.as_str(),
                "status": order.status.to_string(),
                "total": Price::gbp(order.order_total).to_string(),
            },
        });

        self.deliver(body).await
    }

    async fn deliver(&self, body: serde_json::Value) -> Result<(), NotifierError> {
        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NotifierError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
