//! Validated cart line quantity.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Quantity of a single product in a cart, between 1 and
/// [`LineQuantity::MAX`] inclusive.
///
/// The cap is a per-(user, product) business rule: no cart line may ever
/// hold more than [`LineQuantity::MAX`] units, including across repeated
/// additions of the same product.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub struct LineQuantity(u32);

/// Error validating a cart line quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("quantity must be at least 1")]
    Zero,
    #[error("quantity {0} exceeds the per-product limit of {max}", max = LineQuantity::MAX)]
    OverLimit(u32),
}

impl LineQuantity {
    /// The most units of one product a cart may hold.
    pub const MAX: u32 = 20;

    /// Validate a raw quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Zero`] for 0 and [`QuantityError::OverLimit`]
    /// for anything above [`Self::MAX`].
    pub const fn new(value: u32) -> Result<Self, QuantityError> {
        if value == 0 {
            Err(QuantityError::Zero)
        } else if value > Self::MAX {
            Err(QuantityError::OverLimit(value))
        } else {
            Ok(Self(value))
        }
    }

    /// The raw quantity.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// The largest already-stored quantity that can still absorb this
    /// request without breaching [`Self::MAX`].
    #[must_use]
    pub const fn headroom(&self) -> u32 {
        Self::MAX - self.0
    }
}

impl TryFrom<u32> for LineQuantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LineQuantity> for u32 {
    fn from(quantity: LineQuantity) -> Self {
        quantity.0
    }
}

impl std::fmt::Display for LineQuantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
