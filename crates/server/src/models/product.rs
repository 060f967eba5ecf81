//! Product documents in the `products` collection.

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use farmgate_core::{Category, ProductId, SellerId};

use super::GeoJsonPoint;
use super::serde_helpers::decimal_as_decimal128;

/// A product listed by a seller.
///
/// Mutated only by its owning seller, plus the stock decrement applied when
/// an order is placed. `sale_price <= market_price` is expected of sellers
/// but not enforced anywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product ID.
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Display name, matched by the catalog's substring search.
    pub name: String,
    /// Longer description shown on the product page.
    pub description: String,
    /// Price the buyer pays.
    #[serde(with = "decimal_as_decimal128")]
    pub sale_price: Decimal,
    /// Reference supermarket price, shown struck through.
    #[serde(with = "decimal_as_decimal128")]
    pub market_price: Decimal,
    /// Units currently available for sale.
    pub quantity: i64,
    /// Primary image reference.
    pub image: String,
    /// Additional image references, in display order.
    #[serde(default)]
    pub catalogue: Vec<String>,
    /// The seller who owns this listing.
    pub seller_id: SellerId,
    /// Excluded from availability-filtered views before this date.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub available_from: DateTime<Utc>,
    /// When the listing was created.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub listed_at: DateTime<Utc>,
    /// Free-text pickup address.
    pub collection_address: String,
    /// Geocoded pickup location; drives proximity search when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_point: Option<GeoJsonPoint>,
    /// Category from the marketplace's closed set.
    pub category: Category,
    /// Mean review rating, 0 to 5, recomputed when reviews change.
    #[serde(with = "decimal_as_decimal128")]
    pub rating: Decimal,
    /// Seller's free-text notes (storage instructions and the like).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
