//! Listing route handlers: product detail plus the seller-facing CRUD.
//!
//! Create and update geocode the collection address so the listing can take
//! part in proximity search. Geocoding is best-effort: a failure is logged
//! and the listing is saved without a collection point.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use farmgate_core::{Category, ProductId, SellerId};

use crate::db::{ProductPatch, ProductRepository};
use crate::error::{AppError, Result, ValidationErrors};
use crate::middleware::Identity;
use crate::models::{GeoJsonPoint, Product};
use crate::state::AppState;

use super::rfc3339;

/// A product as the API renders it: prices and rating as decimal strings,
/// timestamps as RFC 3339.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub sale_price: String,
    pub market_price: String,
    pub quantity: i64,
    pub image: String,
    pub catalogue: Vec<String>,
    pub seller_id: SellerId,
    pub available_from: String,
    pub listed_at: String,
    pub collection_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_point: Option<GeoJsonPoint>,
    pub category: Category,
    pub rating: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.into_inner(),
            name: product.name,
            description: product.description,
            sale_price: product.sale_price.to_string(),
            market_price: product.market_price.to_string(),
            quantity: product.quantity,
            image: product.image,
            catalogue: product.catalogue,
            seller_id: product.seller_id,
            available_from: rfc3339(product.available_from),
            listed_at: rfc3339(product.listed_at),
            collection_address: product.collection_address,
            collection_point: product.collection_point,
            category: product.category,
            rating: product.rating.to_string(),
            notes: product.notes,
        }
    }
}

/// Response carrying a single product.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub success: bool,
    pub message: String,
    pub product: ProductView,
}

/// Response carrying no payload.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

// ============================================================================
// Detail
// ============================================================================

/// Fetch one listing.
///
/// GET /api/products/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` if no such product exists.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductResponse>> {
    let product = ProductRepository::new(state.db())
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_owned()))?;

    Ok(Json(ProductResponse {
        success: true,
        message: "Product fetched".to_owned(),
        product: product.into(),
    }))
}

// ============================================================================
// Create
// ============================================================================

/// Request to create a listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    /// Listing ID; generated when absent.
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub sale_price: Decimal,
    pub market_price: Decimal,
    pub quantity: i64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub catalogue: Vec<String>,
    /// Defaults to now, making the listing immediately available.
    pub available_from: Option<DateTime<Utc>>,
    pub collection_address: String,
    pub category: Category,
    pub notes: Option<String>,
}

impl CreateProductRequest {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "must not be empty");
        }
        if self.sale_price <= Decimal::ZERO {
            errors.add("salePrice", "must be positive");
        }
        if self.market_price <= Decimal::ZERO {
            errors.add("marketPrice", "must be positive");
        }
        if self.quantity < 0 {
            errors.add("quantity", "must not be negative");
        }
        if self.collection_address.trim().is_empty() {
            errors.add("collectionAddress", "must not be empty");
        }
        errors
    }
}

/// Create a listing owned by the calling seller.
///
/// POST /api/products
///
/// # Errors
///
/// Returns `AppError::Validation` for rejected fields and
/// `AppError::Conflict` if a client-supplied ID is already taken.
#[instrument(skip(state, request), fields(seller = %seller_id))]
pub async fn create(
    State(state): State<AppState>,
    Identity(seller_id): Identity,
    Json(request): Json<CreateProductRequest>,
) -> Result<Json<ProductResponse>> {
    let errors = request.validate();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let collection_point = geocode_address(&state, &request.collection_address).await;

    let now = Utc::now();
    let product = Product {
        id: request.id.map_or_else(ProductId::generate, ProductId::new),
        name: request.name,
        description: request.description,
        sale_price: request.sale_price,
        market_price: request.market_price,
        quantity: request.quantity,
        image: request.image,
        catalogue: request.catalogue,
        seller_id,
        available_from: request.available_from.unwrap_or(now),
        listed_at: now,
        collection_address: request.collection_address,
        collection_point,
        category: request.category,
        rating: Decimal::ZERO,
        notes: request.notes,
    };

    ProductRepository::new(state.db()).create(&product).await?;

    Ok(Json(ProductResponse {
        success: true,
        message: "Product listed".to_owned(),
        product: product.into(),
    }))
}

// ============================================================================
// Update
// ============================================================================

/// Request to update a listing. Absent fields are left untouched.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sale_price: Option<Decimal>,
    pub market_price: Option<Decimal>,
    pub quantity: Option<i64>,
    pub image: Option<String>,
    pub catalogue: Option<Vec<String>>,
    pub available_from: Option<DateTime<Utc>>,
    pub collection_address: Option<String>,
    pub category: Option<Category>,
    pub notes: Option<String>,
}

impl UpdateProductRequest {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.name.as_ref().is_some_and(|name| name.trim().is_empty()) {
            errors.add("name", "must not be empty");
        }
        if self.sale_price.is_some_and(|price| price <= Decimal::ZERO) {
            errors.add("salePrice", "must be positive");
        }
        if self.market_price.is_some_and(|price| price <= Decimal::ZERO) {
            errors.add("marketPrice", "must be positive");
        }
        if self.quantity.is_some_and(|quantity| quantity < 0) {
            errors.add("quantity", "must not be negative");
        }
        if self
            .collection_address
            .as_ref()
            .is_some_and(|address| address.trim().is_empty())
        {
            errors.add("collectionAddress", "must not be empty");
        }
        errors
    }
}

/// Update the calling seller's own listing.
///
/// PUT /api/products/{id}
///
/// A changed collection address is re-geocoded; if geocoding fails the old
/// collection point is left in place.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the product does not exist or belongs to
/// another seller, and `AppError::BadRequest` for an empty patch.
#[instrument(skip(state, request), fields(seller = %seller_id))]
pub async fn update(
    State(state): State<AppState>,
    Identity(seller_id): Identity,
    Path(id): Path<ProductId>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>> {
    let errors = request.validate();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let collection_point = match &request.collection_address {
        Some(address) => geocode_address(&state, address).await,
        None => None,
    };

    let patch = ProductPatch {
        name: request.name,
        description: request.description,
        sale_price: request.sale_price,
        market_price: request.market_price,
        quantity: request.quantity,
        image: request.image,
        catalogue: request.catalogue,
        available_from: request.available_from,
        collection_address: request.collection_address,
        collection_point,
        category: request.category,
        notes: request.notes,
    };
    if patch.is_empty() {
        return Err(AppError::BadRequest("no fields to update".to_owned()));
    }

    let product = ProductRepository::new(state.db())
        .update(&id, &seller_id, patch)
        .await?;

    Ok(Json(ProductResponse {
        success: true,
        message: "Product updated".to_owned(),
        product: product.into(),
    }))
}

// ============================================================================
// Delete
// ============================================================================

/// Delete the calling seller's own listing.
///
/// DELETE /api/products/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` if the product does not exist or belongs to
/// another seller.
#[instrument(skip(state), fields(seller = %seller_id))]
pub async fn remove(
    State(state): State<AppState>,
    Identity(seller_id): Identity,
    Path(id): Path<ProductId>,
) -> Result<Json<MessageResponse>> {
    ProductRepository::new(state.db())
        .delete(&id, &seller_id)
        .await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Product removed".to_owned(),
    }))
}

// ============================================================================
// Images
// ============================================================================

/// Request to upload a listing image.
#[derive(Debug, Deserialize)]
pub struct UploadImageRequest {
    /// Base64 image payload, with or without a data-URL prefix.
    pub image: String,
}

/// Response from uploading a listing image.
#[derive(Debug, Serialize)]
pub struct UploadImageResponse {
    pub success: bool,
    pub message: String,
    pub url: String,
}

/// Upload an image and return its hosted URL.
///
/// POST /api/images
///
/// # Errors
///
/// Returns `AppError::BadRequest` when no image host is configured and
/// `AppError::Images` when the host rejects the upload.
#[instrument(skip(state, request))]
pub async fn upload_image(
    State(state): State<AppState>,
    _identity: Identity,
    Json(request): Json<UploadImageRequest>,
) -> Result<Json<UploadImageResponse>> {
    let Some(images) = state.images() else {
        return Err(AppError::BadRequest(
            "image uploads are not configured".to_owned(),
        ));
    };

    let url = images.upload(&request.image).await?;

    Ok(Json(UploadImageResponse {
        success: true,
        message: "Image uploaded".to_owned(),
        url,
    }))
}

async fn geocode_address(state: &AppState, address: &str) -> Option<GeoJsonPoint> {
    match state.geocoder().geocode(address).await {
        Ok(point) => Some(GeoJsonPoint::from(point)),
        Err(e) => {
            tracing::warn!("Failed to geocode collection address: {e}");
            None
        }
    }
}
