//! Order documents in the `orders` collection.

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use farmgate_core::{LineQuantity, OrderId, OrderStatus, ProductId, SellerId, UserId};

use super::serde_helpers::decimal_as_decimal128;

/// One purchased line within an order.
///
/// Built from the buyer's cart line at placement: `product_name` and
/// `order_price` are the cart's add-time snapshots, not the live product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// The purchased product.
    pub product_id: ProductId,
    /// Seller fulfilling this line.
    pub seller_id: SellerId,
    /// Product name at purchase time.
    pub product_name: String,
    /// Units purchased.
    pub quantity: LineQuantity,
    /// Unit price charged.
    #[serde(with = "decimal_as_decimal128")]
    pub order_price: Decimal,
}

impl OrderItem {
    /// `quantity × order_price` for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.order_price * Decimal::from(self.quantity.get())
    }
}

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order ID.
    #[serde(rename = "_id")]
    pub id: OrderId,
    /// The buyer who placed the order.
    pub user_id: UserId,
    /// When the order was placed.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub placed_at: DateTime<Utc>,
    /// Bumped on every status transition.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
    /// Purchased lines, in cart order.
    pub items: Vec<OrderItem>,
    /// Sum of line totals, computed once at placement and never recomputed.
    #[serde(with = "decimal_as_decimal128")]
    pub order_total: Decimal,
    /// Lifecycle status, driven by the seller.
    pub status: OrderStatus,
}

impl Order {
    /// Sum the line totals of `items`.
    #[must_use]
    pub fn total_of(items: &[OrderItem]) -> Decimal {
        items.iter().map(OrderItem::line_total).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn item(quantity: u32, price: &str) -> OrderItem {
        OrderItem {
            product_id: ProductId::new("p-1"),
            seller_id: SellerId::new("s-1"),
            product_name: "Bramley apples".to_owned(),
            quantity: LineQuantity::new(quantity).unwrap(),
            order_price: Decimal::from_str(price).unwrap(),
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(item(3, "2.50").line_total(), Decimal::from_str("7.50").unwrap());
    }

    #[test]
    fn test_total_of_sums_line_totals() {
        // qty 2 @ 3.00 plus qty 1 @ 5.00
        let items = vec![item(2, "3.00"), item(1, "5.00")];
        assert_eq!(Order::total_of(&items), Decimal::from_str("11.00").unwrap());
    }

    #[test]
    fn test_total_of_empty_is_zero() {
        assert_eq!(Order::total_of(&[]), Decimal::ZERO);
    }
}
