//! HTTP middleware stack for the marketplace API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. `TraceLayer` (request tracing)
//! 2. Request ID (add unique ID to each request)

pub mod identity;
pub mod request_id;

pub use identity::Identity;
pub use request_id::request_id_middleware;
