//! Cart route handlers.
//!
//! The cart lives embedded in the buyer's user document; every mutation
//! returns the cart as it stands afterwards so clients never need a
//! follow-up read. Line prices and names are add-time snapshots.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use farmgate_core::{LineQuantity, ProductId, SellerId};

use crate::db::{ProductRepository, UserRepository};
use crate::error::{AppError, Result, ValidationErrors};
use crate::middleware::Identity;
use crate::models::CartLine;
use crate::state::AppState;

/// A cart line as the API renders it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub product_id: ProductId,
    pub seller_id: SellerId,
    pub quantity: u32,
    pub name: String,
    pub price: String,
    pub image: String,
}

impl From<CartLine> for CartLineView {
    fn from(line: CartLine) -> Self {
        Self {
            product_id: line.product_id,
            seller_id: line.seller_id,
            quantity: line.quantity.get(),
            name: line.name,
            price: line.price.to_string(),
            image: line.image,
        }
    }
}

/// Response carrying the full cart.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub success: bool,
    pub message: String,
    pub cart: Vec<CartLineView>,
}

fn cart_response(message: &str, cart: Vec<CartLine>) -> CartResponse {
    CartResponse {
        success: true,
        message: message.to_owned(),
        cart: cart.into_iter().map(CartLineView::from).collect(),
    }
}

/// Fetch the calling buyer's cart.
///
/// GET /api/cart
///
/// # Errors
///
/// Returns `AppError::Cart` if the user does not exist.
#[instrument(skip(state), fields(user = %user_id))]
pub async fn show(
    State(state): State<AppState>,
    Identity(user_id): Identity,
) -> Result<Json<CartResponse>> {
    let cart = UserRepository::new(state.db()).cart(&user_id).await?;
    Ok(Json(cart_response("Cart fetched", cart)))
}

/// Request to add a product to the cart.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Add a product to the cart, merging into an existing line if one exists.
///
/// POST /api/cart
///
/// The line snapshots the product's current name, price and image.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the product does not exist and
/// `AppError::Cart` when the merged line would exceed the per-product cap.
#[instrument(skip(state), fields(user = %user_id))]
pub async fn add(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartResponse>> {
    let quantity = parse_quantity(request.quantity)?;

    let product = ProductRepository::new(state.db())
        .get(&request.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_owned()))?;

    let line = CartLine {
        product_id: product.id,
        seller_id: product.seller_id,
        quantity,
        name: product.name,
        price: product.sale_price,
        image: product.image,
    };

    let cart = UserRepository::new(state.db())
        .add_to_cart(&user_id, line)
        .await?;

    Ok(Json(cart_response("Product added to cart", cart)))
}

/// Request to overwrite a cart line's quantity.
#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: u32,
}

/// Overwrite the quantity of an existing cart line.
///
/// PUT /api/cart/{product_id}
///
/// Unlike add, this never merges; the stored quantity becomes exactly the
/// requested one.
///
/// # Errors
///
/// Returns `AppError::Cart` if the user or the line does not exist.
#[instrument(skip(state), fields(user = %user_id))]
pub async fn set_quantity(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(product_id): Path<ProductId>,
    Json(request): Json<SetQuantityRequest>,
) -> Result<Json<CartResponse>> {
    let quantity = parse_quantity(request.quantity)?;

    let cart = UserRepository::new(state.db())
        .set_cart_quantity(&user_id, &product_id, quantity)
        .await?;

    Ok(Json(cart_response("Cart updated", cart)))
}

/// Remove a product's line from the cart.
///
/// DELETE /api/cart/{product_id}
///
/// Removing a product that is not in the cart is a no-op, not an error.
///
/// # Errors
///
/// Returns `AppError::Cart` if the user does not exist.
#[instrument(skip(state), fields(user = %user_id))]
pub async fn remove(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(product_id): Path<ProductId>,
) -> Result<Json<CartResponse>> {
    let cart = UserRepository::new(state.db())
        .remove_from_cart(&user_id, &product_id)
        .await?;

    Ok(Json(cart_response("Product removed from cart", cart)))
}

fn parse_quantity(quantity: u32) -> Result<LineQuantity> {
    LineQuantity::new(quantity)
        .map_err(|e| AppError::Validation(ValidationErrors::of("quantity", e.to_string())))
}
