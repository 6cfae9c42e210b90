//! Coordinate value types.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the local planar projection (meters).
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Lower clamp for `cos(reference latitude)` in the inverse projection.
///
/// Keeps longitude recovery finite at the poles.
pub const MIN_COS_REFERENCE_LAT: f64 = 1e-6;

/// Valid latitude range in degrees.
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range in degrees.
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// A geographic position in degrees (WGS84-like).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new point from latitude and longitude in degrees.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that both components are finite and inside the valid ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (MIN_LAT..=MAX_LAT).contains(&self.latitude)
            && (MIN_LON..=MAX_LON).contains(&self.longitude)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// A position in a local metric plane (meters).
///
/// Only meaningful relative to the reference latitude it was projected
/// with; two `PlanarPoint`s built from different reference latitudes must
/// never be compared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point in the same plane.
    #[inline]
    pub fn distance_to(&self, other: &PlanarPoint) -> f64 {
        self.distance_sq_to(other).sqrt()
    }

    /// Squared Euclidean distance to another point in the same plane.
    #[inline]
    pub fn distance_sq_to(&self, other: &PlanarPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}
