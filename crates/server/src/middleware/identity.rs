//! Identity extraction for route handlers.
//!
//! The service sits behind a gateway that authenticates callers and injects
//! the buyer or seller id in the `x-farmgate-identity` header. Handlers that
//! act on someone's behalf take the [`Identity`] extractor; requests without
//! a usable header are rejected before the handler runs.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};

use farmgate_core::types::UserId;

use crate::error::AppError;

/// The HTTP header carrying the authenticated caller's id.
pub const IDENTITY_HEADER: &str = "x-farmgate-identity";

/// Extractor that requires an authenticated identity.
///
/// # Example
///
/// ```rust,ignore
/// async fn cart_handler(
///     Identity(user_id): Identity,
/// ) -> impl IntoResponse {
///     format!("cart of {user_id}")
/// }
/// ```
#[derive(Debug)]
pub struct Identity(pub UserId);

/// Error returned when the identity header is absent or unusable.
#[derive(Debug)]
pub enum IdentityRejection {
    /// No identity header on the request.
    Missing,
    /// Header present but empty or not valid header text.
    Malformed,
}

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        let message = match self {
            Self::Missing => "identity header missing",
            Self::Malformed => "identity header malformed",
        };
        AppError::Unauthorized(message.to_string()).into_response()
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = IdentityRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(IDENTITY_HEADER)
            .ok_or(IdentityRejection::Missing)?;

        let value = header
            .to_str()
            .map_err(|_| IdentityRejection::Malformed)?
            .trim();
        if value.is_empty() {
            return Err(IdentityRejection::Malformed);
        }

        Ok(Self(UserId::from(value)))
    }
}
