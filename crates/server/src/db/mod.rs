//! Document store access for the marketplace `MongoDB`.
//!
//! # Database: `farmgate`
//!
//! ## Collections
//!
//! - `products` - Seller listings, including stock and collection geometry
//! - `users` - Buyer profiles with the embedded `cart` array
//! - `orders` - Placed orders with point-in-time item snapshots
//! - `reviews` - Product reviews with likes and reply threads
//!
//! # Indexes
//!
//! Indexes (including the `2dsphere` index behind proximity search) are
//! created via:
//! ```bash
//! cargo run -p farmgate-cli -- indexes
//! ```

pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;

use std::time::Duration;

use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use secrecy::ExposeSecret;
use thiserror::Error;

pub use orders::OrderRepository;
pub use products::{CatalogPage, ProductPatch, ProductRepository};
pub use reviews::ReviewRepository;
pub use users::{CartError, UserRepository};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Driver error from the document store.
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate `_id`).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Connect to `MongoDB` and select the named database.
///
/// # Arguments
///
/// * `database_url` - `MongoDB` connection string (wrapped in `SecretString`)
/// * `database` - Database name to select on the deployment
///
/// # Errors
///
/// Returns `mongodb::error::Error` if the connection string cannot be parsed
/// or the client cannot be constructed.
pub async fn connect(
    database_url: &secrecy::SecretString,
    database: &str,
) -> Result<Database, mongodb::error::Error> {
    let mut options = ClientOptions::parse(database_url.expose_secret()).await?;
    options.app_name = Some("farmgate-server".to_string());
    options.server_selection_timeout = Some(Duration::from_secs(10));

    let client = Client::with_options(options)?;
    Ok(client.database(database))
}

/// Whether a driver error is a unique-index violation (code 11000).
pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match &*err.kind {
        ErrorKind::Write(failure) => {
            matches!(failure, WriteFailure::WriteError(write_err) if write_err.code == 11_000)
        }
        ErrorKind::Command(command_err) => command_err.code == 11_000,
        _ => false,
    }
}
