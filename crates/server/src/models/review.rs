//! Review documents in the `reviews` collection.

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use farmgate_core::{ProductId, ReviewId, UserId};

use super::serde_helpers::decimal_as_decimal128;

/// A reply under a review, typically from the seller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    /// Who replied.
    pub user_id: UserId,
    /// Reply text.
    pub reply: String,
    /// When the reply was posted.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub replied_at: DateTime<Utc>,
}

/// A buyer's review of a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Unique review ID.
    #[serde(rename = "_id")]
    pub id: ReviewId,
    /// The reviewed product.
    pub product_id: ProductId,
    /// The reviewing user.
    pub user_id: UserId,
    /// Star rating, 0 to 5.
    #[serde(with = "decimal_as_decimal128")]
    pub rating: Decimal,
    /// Review text.
    pub text: String,
    /// Like count.
    #[serde(default)]
    pub likes: i64,
    /// Threaded replies.
    #[serde(default)]
    pub replies: Vec<Reply>,
    /// Set once the author edits the text.
    #[serde(default)]
    pub edited: bool,
    /// When the review was posted.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub posted_at: DateTime<Utc>,
}
