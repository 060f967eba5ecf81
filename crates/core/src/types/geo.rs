//! Geographic coordinates for produce collection points.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A WGS 84 coordinate pair.
///
/// Parsed from the wire form `"longitude,latitude"`, longitude first to
/// match GeoJSON coordinate order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

/// Error parsing or validating a coordinate pair.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoPointError {
    #[error("expected \"longitude,latitude\", got {0:?}")]
    Malformed(String),
    #[error("longitude {0} out of range -180..=180")]
    LongitudeOutOfRange(f64),
    #[error("latitude {0} out of range -90..=90")]
    LatitudeOutOfRange(f64),
}

impl GeoPoint {
    /// Validate a coordinate pair.
    ///
    /// # Errors
    ///
    /// Returns an error when either component is outside its WGS 84 range
    /// or is not finite.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, GeoPointError> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoPointError::LongitudeOutOfRange(longitude));
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoPointError::LatitudeOutOfRange(latitude));
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    /// GeoJSON coordinate order: `[longitude, latitude]`.
    #[must_use]
    pub const fn coordinates(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.longitude, self.latitude)
    }
}

impl std::str::FromStr for GeoPoint {
    type Err = GeoPointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || GeoPointError::Malformed(s.to_owned());
        let (lng, lat) = s.split_once(',').ok_or_else(malformed)?;
        let longitude: f64 = lng.trim().parse().map_err(|_| malformed())?;
        let latitude: f64 = lat.trim().parse().map_err(|_| malformed())?;
        Self::new(longitude, latitude)
    }
}
