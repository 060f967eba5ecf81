//! Outbound collaborator clients.
//!
//! # Services
//!
//! - `notifier` - Order lifecycle notifications (placement, status changes)
//! - `geocoder` - Forward geocoding of collection addresses
//! - `images` - Image hosting uploads for listing photos
//!
//! All three are thin `reqwest` clients. Notification delivery is
//! fire-and-forget from the caller's point of view; geocoding and image
//! uploads report their failures back to the request.

pub mod geocoder;
pub mod images;
pub mod notifier;

pub use geocoder::Geocoder;
pub use images::ImageStore;
pub use notifier::NotifierClient;
