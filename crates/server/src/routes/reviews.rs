//! Review route handlers.
//!
//! Posting a review recomputes the product's stored mean rating. The
//! recompute is derived data: if it fails, the review still stands and the
//! failure is logged.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use farmgate_core::{ProductId, ReviewId, UserId};

use crate::db::{ProductRepository, ReviewRepository};
use crate::error::{AppError, Result, ValidationErrors};
use crate::middleware::Identity;
use crate::models::{Reply, Review};
use crate::state::AppState;

use super::rfc3339;

/// A reply as the API renders it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyView {
    pub user_id: UserId,
    pub reply: String,
    pub replied_at: String,
}

impl From<Reply> for ReplyView {
    fn from(reply: Reply) -> Self {
        Self {
            user_id: reply.user_id,
            reply: reply.reply,
            replied_at: rfc3339(reply.replied_at),
        }
    }
}

/// A review as the API renders it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub id: String,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub rating: String,
    pub text: String,
    pub likes: i64,
    pub replies: Vec<ReplyView>,
    pub edited: bool,
    pub posted_at: String,
}

impl From<Review> for ReviewView {
    fn from(review: Review) -> Self {
        Self {
            id: review.id.into_inner(),
            product_id: review.product_id,
            user_id: review.user_id,
            rating: review.rating.to_string(),
            text: review.text,
            likes: review.likes,
            replies: review.replies.into_iter().map(ReplyView::from).collect(),
            edited: review.edited,
            posted_at: rfc3339(review.posted_at),
        }
    }
}

/// Response carrying a single review.
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub success: bool,
    pub message: String,
    pub review: ReviewView,
}

/// Response carrying a product's reviews.
#[derive(Debug, Serialize)]
pub struct ReviewsResponse {
    pub success: bool,
    pub message: String,
    pub reviews: Vec<ReviewView>,
}

// ============================================================================
// Create and list
// ============================================================================

/// Request to post a review.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub product_id: ProductId,
    pub rating: Decimal,
    pub text: String,
}

/// Post a review for a product.
///
/// POST /api/reviews
///
/// # Errors
///
/// Returns `AppError::Validation` for an out-of-range rating or empty text
/// and `AppError::NotFound` if the product does not exist.
#[instrument(skip(state, request), fields(user = %user_id))]
pub async fn create(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Json(request): Json<CreateReviewRequest>,
) -> Result<Json<ReviewResponse>> {
    let mut errors = ValidationErrors::new();
    if request.rating < Decimal::ONE || request.rating > Decimal::from(5) {
        errors.add("rating", "must be between 1 and 5");
    }
    if request.text.trim().is_empty() {
        errors.add("text", "must not be empty");
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let products = ProductRepository::new(state.db());
    if products.get(&request.product_id).await?.is_none() {
        return Err(AppError::NotFound("Product".to_owned()));
    }

    let review = Review {
        id: ReviewId::generate(),
        product_id: request.product_id,
        user_id,
        rating: request.rating,
        text: request.text,
        likes: 0,
        replies: Vec::new(),
        edited: false,
        posted_at: Utc::now(),
    };
    ReviewRepository::new(state.db()).create(&review).await?;

    refresh_product_rating(&state, &review.product_id).await;

    Ok(Json(ReviewResponse {
        success: true,
        message: "Review posted".to_owned(),
        review: review.into(),
    }))
}

/// List a product's reviews, newest first.
///
/// GET /api/products/{id}/reviews
///
/// # Errors
///
/// Returns `AppError::Database` if the read fails.
#[instrument(skip(state))]
pub async fn for_product(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<ReviewsResponse>> {
    let reviews = ReviewRepository::new(state.db())
        .for_product(&product_id)
        .await?;

    Ok(Json(ReviewsResponse {
        success: true,
        message: "Reviews fetched".to_owned(),
        reviews: reviews.into_iter().map(ReviewView::from).collect(),
    }))
}

// ============================================================================
// Interactions
// ============================================================================

/// Like a review.
///
/// POST /api/reviews/{id}/like
///
/// Likes are unattributed; the same caller can like twice.
///
/// # Errors
///
/// Returns `AppError::NotFound` if no such review exists.
#[instrument(skip(state))]
pub async fn like(
    State(state): State<AppState>,
    _identity: Identity,
    Path(id): Path<ReviewId>,
) -> Result<Json<ReviewResponse>> {
    let review = ReviewRepository::new(state.db()).like(&id).await?;

    Ok(Json(ReviewResponse {
        success: true,
        message: "Review liked".to_owned(),
        review: review.into(),
    }))
}

/// Request to reply under a review.
#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub reply: String,
}

/// Reply under a review.
///
/// POST /api/reviews/{id}/replies
///
/// # Errors
///
/// Returns `AppError::Validation` for an empty reply and
/// `AppError::NotFound` if no such review exists.
#[instrument(skip(state, request), fields(user = %user_id))]
pub async fn reply(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(id): Path<ReviewId>,
    Json(request): Json<ReplyRequest>,
) -> Result<Json<ReviewResponse>> {
    if request.reply.trim().is_empty() {
        return Err(AppError::Validation(ValidationErrors::of(
            "reply",
            "must not be empty",
        )));
    }

    let reply = Reply {
        user_id,
        reply: request.reply,
        replied_at: Utc::now(),
    };
    let review = ReviewRepository::new(state.db()).reply(&id, &reply).await?;

    Ok(Json(ReviewResponse {
        success: true,
        message: "Reply posted".to_owned(),
        review: review.into(),
    }))
}

/// Request to edit a review's text.
#[derive(Debug, Deserialize)]
pub struct EditReviewRequest {
    pub text: String,
}

/// Edit the calling author's own review text.
///
/// PUT /api/reviews/{id}
///
/// Only the text can change; the rating is fixed at posting. The review is
/// marked edited from then on.
///
/// # Errors
///
/// Returns `AppError::Validation` for empty text and `AppError::NotFound`
/// if the review does not exist or belongs to another author.
#[instrument(skip(state, request), fields(user = %user_id))]
pub async fn edit(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(id): Path<ReviewId>,
    Json(request): Json<EditReviewRequest>,
) -> Result<Json<ReviewResponse>> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation(ValidationErrors::of(
            "text",
            "must not be empty",
        )));
    }

    let review = ReviewRepository::new(state.db())
        .edit_text(&id, &user_id, &request.text)
        .await?;

    Ok(Json(ReviewResponse {
        success: true,
        message: "Review updated".to_owned(),
        review: review.into(),
    }))
}

/// Recompute and store the product's mean rating, rounded to two decimal
/// places. A product with no reviews goes back to zero.
async fn refresh_product_rating(state: &AppState, product_id: &ProductId) {
    let mean = match ReviewRepository::new(state.db()).mean_rating(product_id).await {
        Ok(Some(mean)) => mean.round_dp(2),
        Ok(None) => Decimal::ZERO,
        Err(e) => {
            tracing::warn!("Failed to recompute product rating: {e}");
            return;
        }
    };

    if let Err(e) = ProductRepository::new(state.db())
        .set_rating(product_id, mean)
        .await
    {
        tracing::warn!("Failed to store recomputed rating: {e}");
    }
}
