//! Checkout route handler.
//!
//! Placing an order snapshots the chosen cart lines into an immutable order
//! document. Only the order insert can fail the request: once it lands, the
//! cart cleanup, stock decrements and the confirmation email are best-effort
//! follow-ups that are logged when they go wrong.

use std::collections::BTreeSet;

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use farmgate_core::{OrderId, OrderStatus, ProductId};

use crate::db::{OrderRepository, ProductRepository, UserRepository};
use crate::error::{AppError, Result, ValidationErrors};
use crate::middleware::Identity;
use crate::models::{CartLine, Order, OrderItem};
use crate::state::AppState;

use super::orders::{OrderResponse, OrderView};

/// Request to place an order.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Cart lines to purchase. Absent means the whole cart.
    #[serde(default)]
    pub product_ids: Option<Vec<ProductId>>,
}

/// Place an order from the calling buyer's cart.
///
/// POST /api/checkout
///
/// Totals come from the cart's snapshot prices. After the order is stored,
/// exactly the purchased lines are removed from the cart, so anything added
/// since the client last looked survives checkout.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the user does not exist and
/// `AppError::Validation` when no selected line is in the cart.
#[instrument(skip(state, request), fields(user = %user_id))]
pub async fn place_order(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<OrderResponse>> {
    let users = UserRepository::new(state.db());
    let user = users
        .get(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_owned()))?;

    let lines: Vec<CartLine> = match &request.product_ids {
        Some(selection) => {
            let wanted: BTreeSet<&str> = selection.iter().map(ProductId::as_str).collect();
            user.cart
                .iter()
                .filter(|line| wanted.contains(line.product_id.as_str()))
                .cloned()
                .collect()
        }
        None => user.cart.clone(),
    };
    if lines.is_empty() {
        return Err(AppError::Validation(ValidationErrors::of(
            "cart",
            "no cart lines to check out",
        )));
    }

    let items: Vec<OrderItem> = lines
        .iter()
        .map(|line| OrderItem {
            product_id: line.product_id.clone(),
            seller_id: line.seller_id.clone(),
            product_name: line.name.clone(),
            quantity: line.quantity,
            order_price: line.price,
        })
        .collect();
    let order_total = Order::total_of(&items);

    let now = Utc::now();
    let order = Order {
        id: OrderId::generate(),
        user_id: user.id.clone(),
        placed_at: now,
        updated_at: now,
        items,
        order_total,
        status: OrderStatus::default(),
    };

    OrderRepository::new(state.db()).create(&order).await?;

    // The order stands from here; cleanup failures are logged, not returned.
    let purchased: Vec<ProductId> = lines.iter().map(|line| line.product_id.clone()).collect();
    if let Err(e) = users.clear_cart_lines(&user_id, &purchased).await {
        tracing::warn!("Failed to clear purchased cart lines: {e}");
    }

    let products = ProductRepository::new(state.db());
    for line in &lines {
        if let Err(e) = products
            .decrement_stock(&line.product_id, line.quantity.get())
            .await
        {
            tracing::warn!(product = %line.product_id, "Failed to decrement stock: {e}");
        }
    }

    if let Some(notifier) = state.notifier() {
        let notifier = notifier.clone();
        let email = user.email.clone();
        let order = order.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.order_placed(&email, &order).await {
                tracing::warn!("Failed to deliver order confirmation: {e}");
            }
        });
    }

    Ok(Json(OrderResponse {
        success: true,
        message: "Order placed".to_owned(),
        order: OrderView::from(order),
    }))
}
