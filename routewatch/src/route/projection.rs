//! Nearest-segment projection of a point onto a route polyline.
//!
//! # Algorithm
//!
//! ```text
//! ref_lat = target.latitude
//! for each segment (a, b) with |ab|² > 1e-6 m²:
//!     t     = clamp(((p - a) · (b - a)) / |ab|², 0, 1)
//!     foot  = a + t (b - a)
//!     d²    = |p - foot|²
//!     keep the first segment with the strictly smallest d²
//! distance_along = Σ |segments before winner| + t · |winner|
//! ```
//!
//! Degenerate segments contribute neither length nor candidates.

use crate::coord::{
    forward_azimuth_deg, from_planar, haversine_distance_m, to_planar, GeoPoint, PlanarPoint,
};

/// Segments with a squared planar length at or below this are skipped (m²).
pub const DEGENERATE_SEGMENT_SQ_METERS: f64 = 1e-6;

/// Result of projecting a point onto a route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionResult {
    /// Closest point on the route.
    pub projected_point: GeoPoint,
    /// Index of the winning segment (segment `i` joins points `i` and `i + 1`).
    pub segment_index: usize,
    /// Position of the foot along the winning segment, in `[0, 1]`.
    pub segment_progress: f64,
    /// Route length from the first point to the projected point (meters).
    pub distance_along_m: f64,
    /// Forward azimuth of the winning segment in `[0, 360)`.
    pub segment_bearing_deg: f64,
    /// Distance from the target to the projected point (meters, `>= 0`).
    pub lateral_distance_m: f64,
    /// Latitude the local plane was anchored on for this query.
    pub reference_latitude: f64,
}

/// Projects `target` onto the nearest segment of `route`.
///
/// Returns `None` when the route has fewer than two points or every
/// segment is degenerate.
pub fn project(route: &[GeoPoint], target: &GeoPoint) -> Option<ProjectionResult> {
    if route.len() < 2 {
        return None;
    }

    let reference = target.latitude;
    let p = to_planar(target, reference);

    let mut best: Option<ProjectionResult> = None;
    let mut best_distance_sq = f64::MAX;
    let mut cumulative = 0.0;

    for (index, pair) in route.windows(2).enumerate() {
        let (start, end) = (&pair[0], &pair[1]);
        let a = to_planar(start, reference);
        let b = to_planar(end, reference);

        let seg_x = b.x - a.x;
        let seg_y = b.y - a.y;
        let seg_len_sq = seg_x * seg_x + seg_y * seg_y;
        if seg_len_sq <= DEGENERATE_SEGMENT_SQ_METERS {
            continue;
        }

        let raw_t = ((p.x - a.x) * seg_x + (p.y - a.y) * seg_y) / seg_len_sq;
        let t = raw_t.clamp(0.0, 1.0);
        let foot = PlanarPoint::new(a.x + seg_x * t, a.y + seg_y * t);
        let distance_sq = p.distance_sq_to(&foot);
        let seg_len = seg_len_sq.sqrt();

        // Strictly-less keeps the first of two equidistant segments.
        if distance_sq < best_distance_sq {
            best_distance_sq = distance_sq;
            best = Some(ProjectionResult {
                projected_point: from_planar(&foot, reference),
                segment_index: index,
                segment_progress: t,
                distance_along_m: cumulative + seg_len * t,
                segment_bearing_deg: forward_azimuth_deg(start, end),
                lateral_distance_m: distance_sq.sqrt(),
                reference_latitude: reference,
            });
        }

        cumulative += seg_len;
    }

    best
}

/// Signed distance along `route` from `from` to `to` (meters).
///
/// Both points are projected independently. Negative when `to` lies behind
/// `from`. `None` if either projection fails.
pub fn ahead_distance(route: &[GeoPoint], from: &GeoPoint, to: &GeoPoint) -> Option<f64> {
    let from_projection = project(route, from)?;
    let to_projection = project(route, to)?;
    Some(to_projection.distance_along_m - from_projection.distance_along_m)
}

/// Sum of non-degenerate segment lengths in the plane of `reference_latitude`.
pub fn polyline_length_m(route: &[GeoPoint], reference_latitude: f64) -> f64 {
    route
        .windows(2)
        .map(|pair| {
            let a = to_planar(&pair[0], reference_latitude);
            let b = to_planar(&pair[1], reference_latitude);
            a.distance_sq_to(&b)
        })
        .filter(|len_sq| *len_sq > DEGENERATE_SEGMENT_SQ_METERS)
        .map(f64::sqrt)
        .sum()
}

/// Minimum distance from `point` to any segment of `polyline` (meters).
///
/// - Empty polyline: `f64::INFINITY`
/// - Single point: great-circle distance to that point
/// - Zero-length segments are measured as point distances
pub fn distance_to_polyline_m(point: &GeoPoint, polyline: &[GeoPoint]) -> f64 {
    match polyline {
        [] => f64::INFINITY,
        [only] => haversine_distance_m(point, only),
        _ => {
            let reference = point.latitude;
            let p = to_planar(point, reference);
            polyline
                .windows(2)
                .map(|pair| {
                    let a = to_planar(&pair[0], reference);
                    let b = to_planar(&pair[1], reference);
                    point_to_segment_m(&p, &a, &b)
                })
                .fold(f64::INFINITY, f64::min)
        }
    }
}

fn point_to_segment_m(p: &PlanarPoint, a: &PlanarPoint, b: &PlanarPoint) -> f64 {
    let seg_x = b.x - a.x;
    let seg_y = b.y - a.y;
    let seg_len_sq = seg_x * seg_x + seg_y * seg_y;
    if seg_len_sq <= 0.0 {
        return p.distance_to(a);
    }
    let t = (((p.x - a.x) * seg_x + (p.y - a.y) * seg_y) / seg_len_sq).clamp(0.0, 1.0);
    p.distance_to(&PlanarPoint::new(a.x + seg_x * t, a.y + seg_y * t))
}
