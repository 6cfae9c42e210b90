//! Routes and route projection.
//!
//! A [`Route`] is an immutable polyline with a stable identifier and a
//! content fingerprint. The fingerprint changes whenever any coordinate
//! changes, so cache entries keyed on it are invalidated even when the
//! identifier is reused.

pub mod projection;

pub use projection::{
    ahead_distance, distance_to_polyline_m, polyline_length_m, project, ProjectionResult,
    DEGENERATE_SEGMENT_SQ_METERS,
};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::coord::GeoPoint;

/// Content hash of a route's coordinate sequence.
///
/// SHA-256 over the point count and the IEEE-754 bits of every latitude
/// and longitude, rendered as lowercase hex. Equal fingerprints imply equal
/// geometry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteFingerprint(String);

impl RouteFingerprint {
    /// Compute the fingerprint of a coordinate sequence.
    pub fn of(points: &[GeoPoint]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update((points.len() as u64).to_le_bytes());
        for point in points {
            hasher.update(point.latitude.to_bits().to_le_bytes());
            hasher.update(point.longitude.to_bits().to_le_bytes());
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Wrap a fingerprint computed elsewhere (e.g. by a route pack builder).
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RouteFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An immutable route polyline.
///
/// Routes with fewer than two points can be built; every projection on
/// them returns `None` ("cannot evaluate yet") rather than failing.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    id: String,
    points: Vec<GeoPoint>,
    fingerprint: RouteFingerprint,
}

impl Route {
    /// Build a route and compute its fingerprint.
    pub fn new(id: impl Into<String>, points: Vec<GeoPoint>) -> Self {
        let fingerprint = RouteFingerprint::of(&points);
        Self {
            id: id.into(),
            points,
            fingerprint,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn fingerprint(&self) -> &RouteFingerprint {
        &self.fingerprint
    }

    /// First point of the route, if any.
    pub fn start(&self) -> Option<&GeoPoint> {
        self.points.first()
    }

    /// Last point of the route, if any.
    pub fn end(&self) -> Option<&GeoPoint> {
        self.points.last()
    }

    /// Whether the route has enough points to project onto.
    pub fn is_projectable(&self) -> bool {
        self.points.len() >= 2
    }

    /// Total length in the plane anchored on the first point (meters).
    pub fn total_length_m(&self) -> f64 {
        match self.points.first() {
            Some(first) => polyline_length_m(&self.points, first.latitude),
            None => 0.0,
        }
    }

    /// Project a point onto this route.
    pub fn project(&self, target: &GeoPoint) -> Option<ProjectionResult> {
        project(&self.points, target)
    }

    /// Signed distance along this route from `from` to `to`.
    pub fn ahead_distance(&self, from: &GeoPoint, to: &GeoPoint) -> Option<f64> {
        ahead_distance(&self.points, from, to)
    }
}

/// How far along a route a projected position is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteProgress {
    /// Distance covered from the route start (meters).
    pub distance_along_m: f64,
    /// Distance left to the route end (meters, `>= 0`).
    pub distance_remaining_m: f64,
    /// Integer completion percentage in `[0, 100]`.
    pub completion_percent: u8,
}

impl RouteProgress {
    /// Derive progress from a projection onto `route`.
    ///
    /// The route length is measured in the same plane as the projection.
    pub fn from_projection(route: &[GeoPoint], projection: &ProjectionResult) -> Self {
        let total = polyline_length_m(route, projection.reference_latitude);
        let along = projection.distance_along_m.clamp(0.0, total);
        let completion = if total > 0.0 {
            ((along / total) * 100.0).floor().clamp(0.0, 100.0) as u8
        } else {
            0
        };
        Self {
            distance_along_m: along,
            distance_remaining_m: (total - along).max(0.0),
            completion_percent: completion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(51.8900, 0.9000),
            GeoPoint::new(51.8950, 0.9050),
            GeoPoint::new(51.9000, 0.9100),
        ]
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = Route::new("colchester-1", points());
        let b = Route::new("colchester-1", points());
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().as_str().len(), 64);
    }

    #[test]
    fn test_fingerprint_changes_with_geometry() {
        let a = Route::new("colchester-1", points());
        let mut moved = points();
        moved[1].longitude += 1e-9;
        let b = Route::new("colchester-1", moved);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_sensitive_to_order() {
        let mut reversed = points();
        reversed.reverse();
        assert_ne!(RouteFingerprint::of(&points()), RouteFingerprint::of(&reversed));
    }

    #[test]
    fn test_fingerprint_of_empty_route() {
        let empty = RouteFingerprint::of(&[]);
        assert_eq!(empty, RouteFingerprint::of(&[]));
        assert_ne!(empty, RouteFingerprint::of(&points()));
    }

    #[test]
    fn test_short_route_is_not_projectable() {
        let route = Route::new("short", vec![GeoPoint::new(51.9, 0.9)]);
        assert!(!route.is_projectable());
        assert!(route.project(&GeoPoint::new(51.9, 0.9)).is_none());
        assert_eq!(route.total_length_m(), 0.0);
    }

    #[test]
    fn test_route_progress_mid_route() {
        let route = vec![GeoPoint::new(51.5000, 0.1000), GeoPoint::new(51.5200, 0.1000)];
        let projection = project(&route, &GeoPoint::new(51.5105, 0.1000)).unwrap();
        let progress = RouteProgress::from_projection(&route, &projection);

        assert_eq!(progress.completion_percent, 52);
        assert!((progress.distance_remaining_m - 1056.35).abs() < 0.5);
    }

    #[test]
    fn test_route_progress_at_end() {
        let route = vec![GeoPoint::new(51.5000, 0.1000), GeoPoint::new(51.5200, 0.1000)];
        let projection = project(&route, &GeoPoint::new(51.5300, 0.1000)).unwrap();
        let progress = RouteProgress::from_projection(&route, &projection);

        assert_eq!(progress.completion_percent, 100);
        assert_eq!(progress.distance_remaining_m, 0.0);
    }
}
