//! Geographic coordinate value type.

use serde::{Deserialize, Serialize};

/// WGS84 latitude/longitude pair in degrees.
///
/// Two coordinates are equal iff both components compare numerically equal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components are finite numbers.
    ///
    /// JSON has no encoding for NaN or infinity, so only finite coordinates
    /// can be stored.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}
