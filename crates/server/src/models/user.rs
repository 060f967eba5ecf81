//! User documents in the `users` collection.

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use farmgate_core::{Email, LineQuantity, ProductId, SellerId, UserId};

use super::serde_helpers::decimal_as_decimal128;

/// One product entry embedded in a user's cart.
///
/// `name`, `price` and `image` are snapshots captured when the line was
/// added. They are deliberately never re-synced from the live product, so
/// a seller repricing after add-to-cart does not move the buyer's cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// The product this line refers to.
    pub product_id: ProductId,
    /// Seller owning the product, copied for order building.
    pub seller_id: SellerId,
    /// Units in the cart, capped at [`LineQuantity::MAX`] per product.
    pub quantity: LineQuantity,
    /// Product name at add time.
    pub name: String,
    /// Unit price at add time.
    #[serde(with = "decimal_as_decimal128")]
    pub price: Decimal,
    /// Image reference at add time.
    pub image: String,
}

/// A marketplace user. Buyers and sellers share this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Contact email, also the notification recipient.
    pub email: Email,
    /// Postal address.
    pub address: String,
    /// Contact phone number.
    pub phone: String,
    /// Embedded shopping cart.
    #[serde(default)]
    pub cart: Vec<CartLine>,
    /// When the profile was created.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}
