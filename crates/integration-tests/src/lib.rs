//! Integration tests for Farmgate.
//!
//! # Running Tests
//!
//! ```bash
//! # Pure tests, no services required
//! cargo test -p farmgate-integration-tests
//!
//! # Live store tests, against a disposable database
//! FARMGATE_TEST_DATABASE_URL=mongodb://localhost:27017 \
//!     cargo test -p farmgate-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `server_catalog_queries` - Raw query string through to store documents
//! - `server_cart_rules` - Cart quantity cap and line arithmetic
//! - `server_order_flow` - Order totals and the status machine
//! - `store_roundtrip` - Repository behavior against a live document store
//!
//! The live tests are `#[ignore]`d so the default suite stays hermetic. They
//! create their documents under fresh UUID keys and tolerate running against
//! a database that already holds data.
