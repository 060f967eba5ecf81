//! Integration tests for cart business rules.
//!
//! The per-line quantity cap is enforced inside the store's update filter
//! rather than in handler code, so these tests pin down the arithmetic that
//! filter relies on, the exact document shape cart lines are stored in, and
//! the messages cart failures render into the response envelope. None of
//! them need a running store; the live counterparts sit in `store_roundtrip`.

use std::str::FromStr;

use mongodb::bson::{Bson, Decimal128, doc};
use rust_decimal::Decimal;

use farmgate_core::{LineQuantity, ProductId, SellerId};
use farmgate_server::db::CartError;
use farmgate_server::models::CartLine;
use farmgate_server::routes::cart::CartLineView;

fn line(quantity: u32, price: &str) -> CartLine {
    CartLine {
        product_id: ProductId::new("p-1"),
        seller_id: SellerId::new("s-1"),
        quantity: LineQuantity::new(quantity).expect("valid quantity"),
        name: "Bramley apples".to_owned(),
        price: Decimal::from_str(price).expect("valid price"),
        image: "apples.jpg".to_owned(),
    }
}

// =============================================================================
// Cap Guard Arithmetic
// =============================================================================

/// The merge update only matches lines with `quantity <= headroom(requested)`.
/// That filter must admit exactly the (stored, requested) pairs whose sum
/// stays within the cap, for every pair both values can take.
#[test]
fn test_increment_guard_admits_exactly_the_in_cap_pairs() {
    for stored in 1..=LineQuantity::MAX {
        for requested in 1..=LineQuantity::MAX {
            let quantity = LineQuantity::new(requested).expect("in range");
            let guard_matches = stored <= quantity.headroom();
            let within_cap = stored + requested <= LineQuantity::MAX;
            assert_eq!(
                guard_matches, within_cap,
                "stored {stored} + requested {requested}"
            );
        }
    }
}

#[test]
fn test_full_line_has_no_headroom() {
    let max = LineQuantity::new(LineQuantity::MAX).expect("cap itself is valid");
    assert_eq!(max.headroom(), 0);

    // A single unit can merge into anything up to one below the cap.
    let one = LineQuantity::new(1).expect("valid");
    assert_eq!(one.headroom(), LineQuantity::MAX - 1);
}

// =============================================================================
// Stored Document Shape
// =============================================================================

#[test]
fn test_cart_line_document_keys_and_price_encoding() {
    let doc = mongodb::bson::to_document(&line(3, "2.50")).expect("encodable");

    let keys: Vec<&str> = doc.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        ["productId", "sellerId", "quantity", "name", "price", "image"]
    );

    // Prices are Decimal128 so range filters compare numerically.
    assert!(
        matches!(doc.get("price"), Some(Bson::Decimal128(_))),
        "price should be Decimal128, got {:?}",
        doc.get("price")
    );
}

#[test]
fn test_cart_line_round_trips_through_store_encoding() {
    let before = line(7, "4.75");
    let doc = mongodb::bson::to_document(&before).expect("encodable");
    let after: CartLine = mongodb::bson::from_document(doc).expect("decodable");

    assert_eq!(after.product_id, before.product_id);
    assert_eq!(after.quantity, before.quantity);
    assert_eq!(after.price, before.price);
    assert_eq!(after.name, before.name);
}

/// `$set` and `$inc` write the quantity as a 64-bit integer while `$push`
/// stores whatever the encoder picked. Reads must accept both widths.
#[test]
fn test_widened_stored_quantity_still_reads_back() {
    let doc = doc! {
        "productId": "p-2",
        "sellerId": "s-1",
        "quantity": 7_i64,
        "name": "Runner beans",
        "price": Decimal128::from_str("1.20").expect("parsable"),
        "image": "beans.jpg",
    };

    let read: CartLine = mongodb::bson::from_document(doc).expect("decodable");
    assert_eq!(read.quantity.get(), 7);
}

/// A stored quantity outside the cap cannot deserialize into a cart line,
/// so a document corrupted past the business rule surfaces as an error
/// instead of an over-cap cart.
#[test]
fn test_out_of_cap_stored_quantity_is_rejected_on_read() {
    let doc = doc! {
        "productId": "p-2",
        "sellerId": "s-1",
        "quantity": 25,
        "name": "Runner beans",
        "price": Decimal128::from_str("1.20").expect("parsable"),
        "image": "beans.jpg",
    };

    assert!(mongodb::bson::from_document::<CartLine>(doc).is_err());
}

// =============================================================================
// Envelope Rendering
// =============================================================================

#[test]
fn test_cart_line_view_renders_price_as_string() {
    let view = CartLineView::from(line(3, "2.50"));
    let json = serde_json::to_value(&view).expect("serializable");

    assert_eq!(
        json,
        serde_json::json!({
            "productId": "p-1",
            "sellerId": "s-1",
            "quantity": 3,
            "name": "Bramley apples",
            "price": "2.50",
            "image": "apples.jpg",
        })
    );
}

#[test]
fn test_cart_error_messages() {
    assert_eq!(CartError::UserNotFound.to_string(), "user not found");
    assert_eq!(
        CartError::LineNotFound {
            product: "p-7".to_owned(),
        }
        .to_string(),
        "no cart line for product p-7"
    );
    assert_eq!(
        CartError::CapacityExceeded {
            product: "p-7".to_owned(),
        }
        .to_string(),
        "adding product p-7 would push the line past 20 units"
    );
}
