//! Reroute-to-start decision.
//!
//! Fires when the driver got close to the start point, then drove away
//! from it, while the current route is not about to finish, and no reroute
//! happened within the cooldown.

use tracing::debug;

/// Default minimum time between reroutes (milliseconds).
pub const DEFAULT_REROUTE_COOLDOWN_MS: u64 = 8_000;

/// Default distance past the closest approach that counts as a miss (meters).
pub const DEFAULT_MISSED_DELTA_METERS: f64 = 30.0;

/// Default distance that counts as being at the start or route end (meters).
pub const DEFAULT_ROUTE_ARRIVAL_DISTANCE_METERS: f64 = 40.0;

/// Default completion percentage at which the route is considered finishing.
pub const DEFAULT_COMPLETION_CUTOFF_PERCENT: u8 = 98;

/// Reroute thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RerouteConfig {
    pub cooldown_ms: u64,
    pub missed_delta_m: f64,
    pub arrival_distance_m: f64,
    /// Routes at or beyond this completion are left to finish.
    pub completion_cutoff_percent: u8,
}

impl Default for RerouteConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: DEFAULT_REROUTE_COOLDOWN_MS,
            missed_delta_m: DEFAULT_MISSED_DELTA_METERS,
            arrival_distance_m: DEFAULT_ROUTE_ARRIVAL_DISTANCE_METERS,
            completion_cutoff_percent: DEFAULT_COMPLETION_CUTOFF_PERCENT,
        }
    }
}

/// One reroute evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RerouteInput {
    pub now_ms: u64,
    /// `None` if no reroute has happened this session.
    pub last_reroute_at_ms: Option<u64>,
    pub distance_to_start_m: f64,
    pub closest_distance_seen_m: f64,
    pub route_distance_remaining_m: f64,
    pub completion_percent: u8,
}

/// Whether to reroute the driver back to the start point.
///
/// All of these must hold:
///
/// - the cooldown has elapsed since the last reroute
/// - every distance is finite
/// - the driver came within the arrival distance of the start and is now
///   at least the missed delta further away than that closest approach
/// - more than the arrival distance of route remains and completion is
///   below the cutoff
pub fn should_reroute_to_start(input: &RerouteInput, config: &RerouteConfig) -> bool {
    let cooled_down = input
        .last_reroute_at_ms
        .map_or(true, |last| input.now_ms.saturating_sub(last) >= config.cooldown_ms);
    if !cooled_down {
        return false;
    }

    if !input.distance_to_start_m.is_finite()
        || !input.closest_distance_seen_m.is_finite()
        || !input.route_distance_remaining_m.is_finite()
    {
        return false;
    }

    let missed_start = input.closest_distance_seen_m <= config.arrival_distance_m
        && input.distance_to_start_m - input.closest_distance_seen_m >= config.missed_delta_m;

    let still_underway = input.route_distance_remaining_m > config.arrival_distance_m
        && input.completion_percent < config.completion_cutoff_percent;

    let reroute = missed_start && still_underway;
    if reroute {
        debug!(
            distance_to_start_m = input.distance_to_start_m,
            closest_distance_seen_m = input.closest_distance_seen_m,
            completion_percent = input.completion_percent,
            "Driver missed the start point"
        );
    }
    reroute
}
