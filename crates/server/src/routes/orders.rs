//! Order route handlers.
//!
//! Reads are scoped to the calling buyer for the list endpoint; detail and
//! status live behind the same gateway identity but are not ownership
//! checked, since sellers drive fulfilment through them.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use farmgate_core::{OrderId, OrderStatus, ProductId, SellerId, UserId};

use crate::db::{OrderRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::Identity;
use crate::models::{Order, OrderItem};
use crate::state::AppState;

use super::rfc3339;

/// One purchased line as the API renders it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
    pub product_id: ProductId,
    pub seller_id: SellerId,
    pub product_name: String,
    pub quantity: u32,
    pub order_price: String,
    pub line_total: String,
}

impl From<OrderItem> for OrderItemView {
    fn from(item: OrderItem) -> Self {
        let line_total = item.line_total().to_string();
        Self {
            product_id: item.product_id,
            seller_id: item.seller_id,
            product_name: item.product_name,
            quantity: item.quantity.get(),
            order_price: item.order_price.to_string(),
            line_total,
        }
    }
}

/// An order as the API renders it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: String,
    pub user_id: UserId,
    pub placed_at: String,
    pub updated_at: String,
    pub items: Vec<OrderItemView>,
    pub order_total: String,
    pub status: OrderStatus,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.into_inner(),
            user_id: order.user_id,
            placed_at: rfc3339(order.placed_at),
            updated_at: rfc3339(order.updated_at),
            items: order.items.into_iter().map(OrderItemView::from).collect(),
            order_total: order.order_total.to_string(),
            status: order.status,
        }
    }
}

/// Response carrying a single order.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub message: String,
    pub order: OrderView,
}

/// Response carrying a list of orders.
#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub success: bool,
    pub message: String,
    pub orders: Vec<OrderView>,
}

/// List the calling buyer's orders, newest first.
///
/// GET /api/orders
///
/// # Errors
///
/// Returns `AppError::Database` if the read fails.
#[instrument(skip(state), fields(user = %user_id))]
pub async fn index(
    State(state): State<AppState>,
    Identity(user_id): Identity,
) -> Result<Json<OrdersResponse>> {
    let orders = OrderRepository::new(state.db()).for_user(&user_id).await?;

    Ok(Json(OrdersResponse {
        success: true,
        message: "Orders fetched".to_owned(),
        orders: orders.into_iter().map(OrderView::from).collect(),
    }))
}

/// Fetch one order.
///
/// GET /api/orders/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` if no such order exists.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    _identity: Identity,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderResponse>> {
    let order = OrderRepository::new(state.db())
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_owned()))?;

    Ok(Json(OrderResponse {
        success: true,
        message: "Order fetched".to_owned(),
        order: order.into(),
    }))
}

/// Request to overwrite an order's status.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: OrderStatus,
}

/// Overwrite an order's status.
///
/// PUT /api/orders/{id}/status
///
/// Any status can replace any other, including re-opening a terminal one;
/// refund and return flows run on the same endpoint as fulfilment.
///
/// # Errors
///
/// Returns `AppError::NotFound` if no such order exists.
#[instrument(skip(state))]
pub async fn set_status(
    State(state): State<AppState>,
    _identity: Identity,
    Path(id): Path<OrderId>,
    Json(request): Json<SetStatusRequest>,
) -> Result<Json<OrderResponse>> {
    let order = OrderRepository::new(state.db())
        .set_status(&id, request.status)
        .await?;

    notify_status_changed(&state, &order);

    Ok(Json(OrderResponse {
        success: true,
        message: "Order status updated".to_owned(),
        order: order.into(),
    }))
}

/// Tell the buyer their order moved. Fire-and-forget: delivery problems are
/// logged and never fail the transition.
fn notify_status_changed(state: &AppState, order: &Order) {
    let Some(notifier) = state.notifier() else {
        return;
    };
    let notifier = notifier.clone();
    let state = state.clone();
    let order = order.clone();

    tokio::spawn(async move {
        let buyer = match UserRepository::new(state.db()).get(&order.user_id).await {
            Ok(Some(buyer)) => buyer,
            Ok(None) => {
                tracing::warn!(order = %order.id, "Order buyer no longer exists, skipping notification");
                return;
            }
            Err(e) => {
                tracing::warn!("Failed to load buyer for status notification: {e}");
                return;
            }
        };

        if let Err(e) = notifier.order_status_changed(&buyer.email, &order).await {
            tracing::warn!("Failed to deliver status notification: {e}");
        }
    });
}
