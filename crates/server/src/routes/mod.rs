//! HTTP route handlers for the marketplace API.
//!
//! Every response body carries the same envelope: `success`, a short
//! human-readable `message`, and the payload under a resource-named key.
//! Buyer and seller identity comes from the gateway header; see
//! [`crate::middleware::Identity`].
//!
//! # Route Structure
//!
//! ```text
//! # Catalog (public)
//! GET    /api/products              - Composed catalog query
//! GET    /api/products/{id}         - Listing detail
//! GET    /api/products/{id}/reviews - Reviews for a listing, newest first
//!
//! # Listings (sellers)
//! POST   /api/products              - Create a listing
//! PUT    /api/products/{id}         - Update own listing
//! DELETE /api/products/{id}         - Delete own listing
//! POST   /api/images                - Upload a listing image
//!
//! # Cart (buyers)
//! GET    /api/cart                  - Current cart
//! POST   /api/cart                  - Add a line (capped merge)
//! PUT    /api/cart/{product_id}     - Overwrite a line's quantity
//! DELETE /api/cart/{product_id}     - Remove a line
//!
//! # Checkout and orders
//! POST   /api/checkout              - Place an order from cart lines
//! GET    /api/orders                - Own orders, newest first
//! GET    /api/orders/{id}           - Order detail
//! PUT    /api/orders/{id}/status    - Overwrite order status
//!
//! # Reviews
//! POST   /api/reviews               - Post a review
//! PUT    /api/reviews/{id}          - Edit own review text
//! POST   /api/reviews/{id}/like     - Like a review
//! POST   /api/reviews/{id}/replies  - Reply to a review
//!
//! # Users
//! POST   /api/users                 - Create a profile
//! GET    /api/users/me              - Own profile
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;

use axum::{
    Router,
    routing::{get, post, put},
};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::state::AppState;

/// Render a timestamp for the wire: RFC 3339, millisecond precision, UTC.
pub(crate) fn rfc3339(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
        .route("/{id}/reviews", get(reviews::for_product))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add))
        .route(
            "/{product_id}",
            put(cart::set_quantity).delete(cart::remove),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", put(orders::set_status))
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(reviews::create))
        .route("/{id}", put(reviews::edit))
        .route("/{id}/like", post(reviews::like))
        .route("/{id}/replies", post(reviews::reply))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(users::create))
        .route("/me", get(users::me))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog and listings
        .nest("/api/products", product_routes())
        // Image uploads for listings
        .route("/api/images", post(products::upload_image))
        // Cart routes
        .nest("/api/cart", cart_routes())
        // Checkout
        .route("/api/checkout", post(checkout::place_order))
        // Order routes
        .nest("/api/orders", order_routes())
        // Review routes
        .nest("/api/reviews", review_routes())
        // User routes
        .nest("/api/users", user_routes())
}
