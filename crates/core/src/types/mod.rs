//! Core types for Farmgate.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod email;
pub mod geo;
pub mod id;
pub mod money;
pub mod quantity;
pub mod status;

pub use category::{Category, CategoryError};
pub use email::{Email, EmailError};
pub use geo::{GeoPoint, GeoPointError};
pub use id::*;
pub use money::{CurrencyCode, Price};
pub use quantity::{LineQuantity, QuantityError};
pub use status::OrderStatus;
