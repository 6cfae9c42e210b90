//! Route conflict detection.
//!
//! Relates hazard features to a route: which features sit on the route at
//! all, and which one the driver reaches next.

use tracing::trace;

use super::{HazardFeature, HazardType};
use crate::coord::GeoPoint;
use crate::route::project;

/// Default look-ahead for "hazard ahead" warnings (meters).
pub const DEFAULT_WARNING_DISTANCE_METERS: f64 = 60.0;

/// Default maximum lateral offset for a feature to count as on-route (meters).
pub const DEFAULT_ROUTE_MATCH_DISTANCE_METERS: f64 = 30.0;

/// Thresholds for the conflict detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConflictConfig {
    /// Features further ahead than this are ignored by [`nearest_ahead`].
    pub warning_distance_m: f64,
    /// Features further from the route than this are not on the route.
    pub route_match_distance_m: f64,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            warning_distance_m: DEFAULT_WARNING_DISTANCE_METERS,
            route_match_distance_m: DEFAULT_ROUTE_MATCH_DISTANCE_METERS,
        }
    }
}

/// The next on-route hazard ahead of the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct HazardConflict {
    pub feature_id: String,
    pub hazard_type: HazardType,
    /// Distance along the route from the driver to the feature (meters, `>= 0`).
    pub distance_ahead_m: f64,
    /// Offset of the feature from the route (meters).
    pub lateral_distance_m: f64,
}

/// Features of one type, in input order.
pub fn filter_by_type(features: &[HazardFeature], hazard_type: HazardType) -> Vec<HazardFeature> {
    features
        .iter()
        .filter(|f| f.hazard_type == hazard_type)
        .cloned()
        .collect()
}

/// Number of features within `match_distance_m` of the route.
///
/// Returns 0 when the route cannot be projected onto.
pub fn count_route_conflicts(
    route: &[GeoPoint],
    features: &[HazardFeature],
    match_distance_m: f64,
) -> usize {
    features
        .iter()
        .filter_map(|f| project(route, &f.point()))
        .filter(|p| p.lateral_distance_m <= match_distance_m)
        .count()
}

/// Closest on-route feature ahead of `user` within the warning distance.
///
/// Features already passed (negative ahead distance) are discarded. On equal
/// ahead distances the earliest feature in `features` wins.
pub fn nearest_ahead(
    user: &GeoPoint,
    route: &[GeoPoint],
    features: &[HazardFeature],
    config: &ConflictConfig,
) -> Option<HazardConflict> {
    let user_along = project(route, user)?.distance_along_m;

    let mut best: Option<HazardConflict> = None;
    for feature in features {
        let Some(projection) = project(route, &feature.point()) else {
            continue;
        };
        if projection.lateral_distance_m > config.route_match_distance_m {
            continue;
        }

        let ahead = projection.distance_along_m - user_along;
        if !(0.0..=config.warning_distance_m).contains(&ahead) {
            continue;
        }

        if best.as_ref().map_or(true, |b| ahead < b.distance_ahead_m) {
            best = Some(HazardConflict {
                feature_id: feature.id.clone(),
                hazard_type: feature.hazard_type,
                distance_ahead_m: ahead,
                lateral_distance_m: projection.lateral_distance_m,
            });
        }
    }

    if let Some(conflict) = &best {
        trace!(
            feature_id = %conflict.feature_id,
            hazard_type = %conflict.hazard_type,
            distance_ahead_m = conflict.distance_ahead_m,
            "Nearest hazard ahead"
        );
    }
    best
}
