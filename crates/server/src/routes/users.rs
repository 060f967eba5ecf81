//! User route handlers: profile bootstrap and self-lookup.
//!
//! There is no registration flow here; the gateway owns credentials. These
//! endpoints exist so the marketplace has a profile document to hang the
//! cart and notification email off.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use farmgate_core::{Email, UserId};

use crate::db::UserRepository;
use crate::error::{AppError, Result, ValidationErrors};
use crate::middleware::Identity;
use crate::models::User;
use crate::state::AppState;

use super::cart::CartLineView;
use super::rfc3339;

/// A user profile as the API renders it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone: String,
    pub cart: Vec<CartLineView>,
    pub created_at: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id.into_inner(),
            name: user.name,
            email: user.email.into_inner(),
            address: user.address,
            phone: user.phone,
            cart: user.cart.into_iter().map(CartLineView::from).collect(),
            created_at: rfc3339(user.created_at),
        }
    }
}

/// Response carrying a user profile.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub message: String,
    pub user: UserView,
}

/// Request to create a profile.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Profile ID; generated when absent. The gateway supplies its own
    /// subject ID here so the identity header lines up.
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone: String,
}

/// Create a user profile with an empty cart.
///
/// POST /api/users
///
/// # Errors
///
/// Returns `AppError::Validation` for a rejected name or email and
/// `AppError::Conflict` if the ID is already taken.
#[instrument(skip(state, request))]
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation(ValidationErrors::of(
            "name",
            "must not be empty",
        )));
    }
    let email = request
        .email
        .parse::<Email>()
        .map_err(|e| AppError::Validation(ValidationErrors::of("email", e.to_string())))?;

    let user = User {
        id: request.id.map_or_else(UserId::generate, UserId::new),
        name: request.name,
        email,
        address: request.address,
        phone: request.phone,
        cart: Vec::new(),
        created_at: Utc::now(),
    };
    UserRepository::new(state.db()).create(&user).await?;

    Ok(Json(UserResponse {
        success: true,
        message: "User created".to_owned(),
        user: user.into(),
    }))
}

/// Fetch the calling user's own profile.
///
/// GET /api/users/me
///
/// # Errors
///
/// Returns `AppError::NotFound` if no profile exists for the identity.
#[instrument(skip(state), fields(user = %user_id))]
pub async fn me(
    State(state): State<AppState>,
    Identity(user_id): Identity,
) -> Result<Json<UserResponse>> {
    let user = UserRepository::new(state.db())
        .get(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_owned()))?;

    Ok(Json(UserResponse {
        success: true,
        message: "User fetched".to_owned(),
        user: user.into(),
    }))
}
