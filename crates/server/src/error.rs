//! Unified error handling.
//!
//! Provides a unified `AppError` type that maps every failure class to a
//! response status and the `{success: false, message, errors?}` envelope.
//! All route handlers should return `Result<T, AppError>`.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::db::users::CartError;
use crate::services::images::ImageStoreError;

/// Field-keyed validation messages.
///
/// Keys are request field names, values the messages recorded against that
/// field. The map is ordered so the envelope is stable for clients and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// An empty set of errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A set with a single field error.
    #[must_use]
    pub fn of(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Fold another set into this one.
    pub fn merge(&mut self, other: Self) {
        for (field, mut messages) in other.errors {
            self.errors.entry(field).or_default().append(&mut messages);
        }
    }

    /// Whether no field has an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The fields that have errors, in key order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.errors {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Application-level error type for the marketplace service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Document store operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Cart mutation was rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Image storage operation failed.
    #[error("Image store error: {0}")]
    Images(#[from] ImageStoreError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request carries no usable identity.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// One or more request fields failed validation.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// State conflict, such as a duplicate identifier.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(
            self,
            Self::Database(_) | Self::Cart(CartError::Repository(_)) | Self::Images(_)
        ) {
            tracing::error!(error = %self, "Request error");
        }

        let status = match &self {
            Self::Database(err) | Self::Cart(CartError::Repository(err)) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Cart(CartError::UserNotFound | CartError::LineNotFound { .. }) => {
                StatusCode::NOT_FOUND
            }
            Self::Cart(CartError::CapacityExceeded { .. }) => StatusCode::CONFLICT,
            Self::Images(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(err) | Self::Cart(CartError::Repository(err)) => match err {
                RepositoryError::NotFound => "Not found".to_string(),
                RepositoryError::Conflict(msg) => msg.clone(),
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    "Internal server error".to_string()
                }
            },
            Self::Cart(err) => err.to_string(),
            Self::Images(_) => "External service error".to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Validation(_) => "Validation failed".to_string(),
            Self::Unauthorized(msg) | Self::Conflict(msg) | Self::BadRequest(msg) => msg.clone(),
        };

        let mut body = serde_json::json!({
            "success": false,
            "message": message,
        });
        if let Self::Validation(errors) = &self {
            if let Ok(map) = serde_json::to_value(errors) {
                body["errors"] = map;
            }
        }

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product p-123".to_string());
        assert_eq!(err.to_string(), "Not found: product p-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Validation(ValidationErrors::of("page", "bad"))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Conflict("id already taken".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::CapacityExceeded {
                product: "p-1".to_string(),
            })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::UserNotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::LineNotFound {
                product: "p-1".to_string(),
            })),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::DataCorruption(
                "bad decimal".to_string(),
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_errors_accumulate_and_merge() {
        let mut errors = ValidationErrors::of("page", "expected an integer");
        errors.add("page", "second message");
        errors.add("origin", "unparseable");

        let mut other = ValidationErrors::of("limit", "negative");
        other.merge(errors);

        let fields: Vec<&str> = other.fields().collect();
        assert_eq!(fields, ["limit", "origin", "page"]);
        assert!(!other.is_empty());
    }

    #[test]
    fn test_validation_errors_display() {
        let mut errors = ValidationErrors::of("origin", "unparseable");
        errors.add("page", "expected an integer");
        assert_eq!(
            errors.to_string(),
            "origin: unparseable; page: expected an integer"
        );
    }

    #[test]
    fn test_validation_errors_serialize_as_field_map() {
        let errors = ValidationErrors::of("origin", "unparseable");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({ "origin": ["unparseable"] }));
    }
}
