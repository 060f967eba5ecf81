//! Product categories.
//!
//! The catalog uses a fixed, closed set of categories. The wire and storage
//! form is the human-readable label ("Fresh Fruits"), which is what clients
//! send as filter tokens and what documents carry in their `category` field.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Product category from the marketplace's closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Fresh Fruits")]
    FreshFruits,
    #[serde(rename = "Fresh Vegetables")]
    FreshVegetables,
    #[serde(rename = "Dairy & Eggs")]
    DairyAndEggs,
    #[serde(rename = "Grains & Pulses")]
    GrainsAndPulses,
    #[serde(rename = "Honey & Preserves")]
    HoneyAndPreserves,
    #[serde(rename = "Herbs & Flowers")]
    HerbsAndFlowers,
}

/// Error parsing a category label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category: {0}")]
pub struct CategoryError(pub String);

impl Category {
    /// Every category, in display order.
    pub const ALL: [Self; 6] = [
        Self::FreshFruits,
        Self::FreshVegetables,
        Self::DairyAndEggs,
        Self::GrainsAndPulses,
        Self::HoneyAndPreserves,
        Self::HerbsAndFlowers,
    ];

    /// The human-readable label, as stored and sent over the wire.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::FreshFruits => "Fresh Fruits",
            Self::FreshVegetables => "Fresh Vegetables",
            Self::DairyAndEggs => "Dairy & Eggs",
            Self::GrainsAndPulses => "Grains & Pulses",
            Self::HoneyAndPreserves => "Honey & Preserves",
            Self::HerbsAndFlowers => "Herbs & Flowers",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|c| c.label().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| CategoryError(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_label_round_trips_through_from_str() {
        for category in Category::ALL {
            assert_eq!(Category::from_str(category.label()).unwrap(), category);
        }
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!(
            Category::from_str("fresh fruits").unwrap(),
            Category::FreshFruits
        );
    }

    #[test]
    fn test_unknown_label_errors() {
        let err = Category::from_str("Fresh Sprockets").unwrap_err();
        assert_eq!(err.0, "Fresh Sprockets");
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&Category::DairyAndEggs).unwrap();
        assert_eq!(json, "\"Dairy & Eggs\"");

        let parsed: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Category::DairyAndEggs);
    }
}
