//! Monetary amounts with currency codes.
//!
//! All prices use [`rust_decimal::Decimal`] for exact decimal arithmetic.
//! Never use floats for money.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO 4217 currency code.
///
/// The marketplace trades in sterling; the enum exists so a second currency
/// is a variant away rather than a schema migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CurrencyCode {
    #[default]
    GBP,
    EUR,
    USD,
}

impl CurrencyCode {
    /// The currency symbol for display purposes.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::GBP => "\u{a3}",
            Self::EUR => "\u{20ac}",
            Self::USD => "$",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::GBP => "GBP",
            Self::EUR => "EUR",
            Self::USD => "USD",
        };
        write!(f, "{code}")
    }
}

/// A monetary amount in a specific currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub amount: Decimal,
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a sterling price.
    #[must_use]
    pub const fn gbp(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::GBP)
    }

    /// A zero price in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Multiply the unit amount by a line quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }

    /// Add another price of the same currency.
    ///
    /// Returns `None` when the currencies differ; totals across currencies
    /// are never meaningful.
    #[must_use]
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        if self.currency_code == other.currency_code {
            Some(Self::new(self.amount + other.amount, self.currency_code))
        } else {
            None
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pence(pence: i64) -> Decimal {
        Decimal::new(pence, 2)
    }

    #[test]
    fn test_display_formats_with_symbol() {
        let price = Price::gbp(pence(450));
        assert_eq!(price.to_string(), "\u{a3}4.50");
    }

    #[test]
    fn test_times_scales_amount() {
        let unit = Price::gbp(pence(280));
        let line = unit.times(3);
        assert_eq!(line.amount, pence(840));
        assert_eq!(line.currency_code, CurrencyCode::GBP);
    }

    #[test]
    fn test_checked_add_same_currency() {
        let a = Price::gbp(pence(125));
        let b = Price::gbp(pence(75));
        assert_eq!(a.checked_add(&b).unwrap().amount, pence(200));
    }

    #[test]
    fn test_checked_add_mixed_currency_is_none() {
        let a = Price::gbp(pence(100));
        let b = Price::new(pence(100), CurrencyCode::EUR);
        assert!(a.checked_add(&b).is_none());
    }

    #[test]
    fn test_zero() {
        assert_eq!(Price::zero(CurrencyCode::GBP).amount, Decimal::ZERO);
    }

    #[test]
    fn test_serde_round_trip() {
        let price = Price::gbp(pence(1299));
        let json = serde_json::to_string(&price).unwrap();
        let parsed: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, price);
    }
}
