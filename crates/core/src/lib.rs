//! Farmgate Core - Shared domain types.
//!
//! This crate provides common types used across all Farmgate components:
//! - `server` - The marketplace HTTP service
//! - `cli` - Command-line tools for index management and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, categories,
//!   order statuses, cart quantities and geographic points

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
