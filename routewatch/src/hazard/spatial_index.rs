//! Grid index for hazard features.
//!
//! Features are bucketed into square Web Mercator cells so that a
//! proximity query only looks at the handful of cells around the query
//! point instead of every feature in a hazard pack.

use std::collections::HashMap;
use std::f64::consts::PI;

use super::HazardFeature;
use crate::coord::{GeoPoint, EARTH_RADIUS_METERS, MIN_COS_REFERENCE_LAT};

/// Default cell edge in Web Mercator meters.
pub const DEFAULT_BUCKET_SIZE_METERS: f64 = 200.0;

/// Web Mercator latitude limit in degrees.
const MERCATOR_MAX_LAT: f64 = 85.05112878;

type CellKey = (i64, i64);

/// Bucketed hazard features.
#[derive(Debug, Clone)]
pub struct HazardSpatialIndex {
    bucket_size_m: f64,
    features: Vec<HazardFeature>,
    cells: HashMap<CellKey, Vec<usize>>,
}

impl Default for HazardSpatialIndex {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKET_SIZE_METERS)
    }
}

impl HazardSpatialIndex {
    /// Create an empty index. Non-positive sizes fall back to the default.
    pub fn new(bucket_size_m: f64) -> Self {
        let bucket_size_m = if bucket_size_m.is_finite() && bucket_size_m > 0.0 {
            bucket_size_m
        } else {
            DEFAULT_BUCKET_SIZE_METERS
        };
        Self {
            bucket_size_m,
            features: Vec::new(),
            cells: HashMap::new(),
        }
    }

    /// Replace the indexed features.
    ///
    /// Features without a finite position are skipped.
    pub fn rebuild(&mut self, features: &[HazardFeature]) {
        self.features.clear();
        self.cells.clear();

        for feature in features.iter().filter(|f| f.has_finite_position()) {
            let (x, y) = mercator_meters(&feature.point());
            let index = self.features.len();
            self.features.push(feature.clone());
            self.cells.entry(self.cell_of(x, y)).or_default().push(index);
        }

        tracing::debug!(
            features = self.features.len(),
            cells = self.cells.len(),
            "Rebuilt hazard spatial index"
        );
    }

    /// Features in every cell touched by a `radius_m` circle around `point`.
    ///
    /// The result is a superset filter: callers that need exact distances
    /// still measure them. Features come back in their original order.
    /// A non-finite point or radius matches nothing.
    pub fn query_nearby(&self, point: &GeoPoint, radius_m: f64) -> Vec<&HazardFeature> {
        if !point.latitude.is_finite()
            || !point.longitude.is_finite()
            || !radius_m.is_finite()
            || self.features.is_empty()
        {
            return Vec::new();
        }

        // Mercator stretches ground distance by 1 / cos(lat).
        let scale = point
            .latitude
            .clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT)
            .to_radians()
            .cos()
            .max(MIN_COS_REFERENCE_LAT);
        let radius = radius_m.max(0.0) / scale;

        let (x, y) = mercator_meters(point);
        let (min_cx, min_cy) = self.cell_of(x - radius, y - radius);
        let (max_cx, max_cy) = self.cell_of(x + radius, y + radius);

        // Wide queries walk the occupied cells instead of the whole range.
        let width = i128::from(max_cx) - i128::from(min_cx) + 1;
        let height = i128::from(max_cy) - i128::from(min_cy) + 1;
        let wide = width
            .checked_mul(height)
            .map_or(true, |span| span > self.cells.len() as i128);
        let mut hits: Vec<usize> = Vec::new();
        if wide {
            for (&(cx, cy), indices) in &self.cells {
                if (min_cx..=max_cx).contains(&cx) && (min_cy..=max_cy).contains(&cy) {
                    hits.extend_from_slice(indices);
                }
            }
        } else {
            for cx in min_cx..=max_cx {
                for cy in min_cy..=max_cy {
                    if let Some(indices) = self.cells.get(&(cx, cy)) {
                        hits.extend_from_slice(indices);
                    }
                }
            }
        }
        hits.sort_unstable();

        hits.into_iter().map(|i| &self.features[i]).collect()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn bucket_size_m(&self) -> f64 {
        self.bucket_size_m
    }

    fn cell_of(&self, x: f64, y: f64) -> CellKey {
        (
            (x / self.bucket_size_m).floor() as i64,
            (y / self.bucket_size_m).floor() as i64,
        )
    }
}

/// Spherical Web Mercator coordinates in meters.
fn mercator_meters(point: &GeoPoint) -> (f64, f64) {
    let lat = point.latitude.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT);
    let x = point.longitude * PI / 180.0 * EARTH_RADIUS_METERS;
    let y = (lat * PI / 180.0).tan().asinh() * EARTH_RADIUS_METERS;
    (x, y)
}
