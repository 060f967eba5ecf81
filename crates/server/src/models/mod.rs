//! Stored document models.
//!
//! These structs serialize 1:1 into the document store: field names are the
//! camelCase keys of the stored documents, timestamps are BSON datetimes and
//! monetary amounts are BSON `Decimal128` so range filters and sorts compare
//! numerically. HTTP-facing shapes live in the route modules, not here.

pub mod order;
pub mod product;
pub mod review;
pub mod user;

pub use order::{Order, OrderItem};
pub use product::Product;
pub use review::{Reply, Review};
pub use user::{CartLine, User};

use farmgate_core::GeoPoint;
use serde::{Deserialize, Serialize};

/// Serde helpers in the spirit of `bson::serde_helpers`, for field types the
/// bson crate does not cover itself.
pub mod serde_helpers {
    /// Store a [`rust_decimal::Decimal`] as a BSON `Decimal128`.
    ///
    /// The default `Decimal` serde form is a string, which the server would
    /// compare lexicographically ("9.00" > "12.00"). Routing through
    /// `Decimal128` keeps price filters and sorts numeric.
    pub mod decimal_as_decimal128 {
        use std::str::FromStr;

        use mongodb::bson::Decimal128;
        use rust_decimal::Decimal;
        use serde::de::Error as _;
        use serde::ser::Error as _;
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        /// # Errors
        ///
        /// Fails when the value cannot be represented as a `Decimal128`,
        /// which no in-range `Decimal` triggers.
        pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            let raw = Decimal128::from_str(&value.to_string())
                .map_err(|e| S::Error::custom(format!("decimal {value} not storable: {e}")))?;
            raw.serialize(serializer)
        }

        /// # Errors
        ///
        /// Fails when the stored `Decimal128` is outside `Decimal` range.
        pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw = Decimal128::deserialize(deserializer)?;
            let text = raw.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .map_err(|e| D::Error::custom(format!("stored decimal {text} unreadable: {e}")))
        }
    }
}

/// A GeoJSON Point as the server's geospatial operators expect it:
/// `{ "type": "Point", "coordinates": [longitude, latitude] }`.
///
/// Only ever built from a validated [`GeoPoint`], so `coordinates` is
/// always in range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonPoint {
    #[serde(rename = "type")]
    pub point_type: String,
    pub coordinates: [f64; 2],
}

impl From<GeoPoint> for GeoJsonPoint {
    fn from(point: GeoPoint) -> Self {
        Self {
            point_type: "Point".to_owned(),
            coordinates: point.coordinates(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use mongodb::bson::{Bson, bson};
    use rust_decimal::Decimal;
    use serde::{Deserialize, Serialize};

    use super::GeoJsonPoint;
    use super::serde_helpers::decimal_as_decimal128;
    use farmgate_core::GeoPoint;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Priced {
        #[serde(with = "decimal_as_decimal128")]
        amount: Decimal,
    }

    #[test]
    fn test_decimal_round_trips_as_decimal128() {
        let before = Priced {
            amount: Decimal::from_str("12.99").unwrap(),
        };

        let raw = mongodb::bson::to_bson(&before).unwrap();
        let doc = raw.as_document().unwrap();
        assert!(
            matches!(doc.get("amount"), Some(Bson::Decimal128(_))),
            "amount should be stored as Decimal128, got {:?}",
            doc.get("amount")
        );

        let after: Priced = mongodb::bson::from_bson(raw).unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn test_decimal_survives_high_precision() {
        let before = Priced {
            amount: Decimal::from_str("0.000001").unwrap(),
        };
        let raw = mongodb::bson::to_bson(&before).unwrap();
        let after: Priced = mongodb::bson::from_bson(raw).unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn test_geojson_point_shape() {
        let point = GeoPoint::new(-2.59, 51.45).unwrap();
        let geo = GeoJsonPoint::from(point);
        let raw = mongodb::bson::to_bson(&geo).unwrap();
        assert_eq!(
            raw,
            bson!({ "type": "Point", "coordinates": [-2.59, 51.45] })
        );
    }
}
