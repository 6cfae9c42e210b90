//! Arrival detection at a target point.
//!
//! Two ways to arrive:
//!
//! - **Immediate**: inside the immediate radius at or below the arrival speed
//! - **Dwell**: continuously inside the dwell radius for the dwell window
//!
//! Leaving the dwell radius clears the dwell timer; there is no partial
//! credit for an earlier visit.

/// Default radius for immediate arrival (meters).
pub const DEFAULT_IMMEDIATE_RADIUS_METERS: f64 = 40.0;

/// Default radius for dwell arrival (meters).
pub const DEFAULT_DWELL_RADIUS_METERS: f64 = 60.0;

/// Default continuous time inside the dwell radius (milliseconds).
pub const DEFAULT_DWELL_WINDOW_MS: u64 = 10_000;

/// Default maximum speed for immediate arrival: 8 mph in m/s.
pub const DEFAULT_MAX_ARRIVAL_SPEED_MPS: f64 = 3.57632;

/// Arrival thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrivalConfig {
    pub immediate_radius_m: f64,
    pub dwell_radius_m: f64,
    pub dwell_window_ms: u64,
    pub max_arrival_speed_mps: f64,
}

impl Default for ArrivalConfig {
    fn default() -> Self {
        Self {
            immediate_radius_m: DEFAULT_IMMEDIATE_RADIUS_METERS,
            dwell_radius_m: DEFAULT_DWELL_RADIUS_METERS,
            dwell_window_ms: DEFAULT_DWELL_WINDOW_MS,
            max_arrival_speed_mps: DEFAULT_MAX_ARRIVAL_SPEED_MPS,
        }
    }
}

/// Arrival state derived from one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalState {
    NotArrived,
    /// Inside the dwell radius since the given time, not yet arrived.
    WithinRadius { since_ms: u64 },
    Arrived,
}

/// Output of [`evaluate_arrival`].
///
/// `within_radius_since_ms` is the only value the caller must carry into
/// the next evaluation for the same target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrivalEvaluation {
    pub arrived: bool,
    pub within_radius_since_ms: Option<u64>,
}

impl ArrivalEvaluation {
    pub fn state(&self) -> ArrivalState {
        match (self.arrived, self.within_radius_since_ms) {
            (true, _) => ArrivalState::Arrived,
            (false, Some(since_ms)) => ArrivalState::WithinRadius { since_ms },
            (false, None) => ArrivalState::NotArrived,
        }
    }
}

/// Evaluate arrival for one position sample.
///
/// Negative distance or speed is treated as 0. A NaN distance is treated
/// as outside every radius; a NaN speed never allows an immediate arrival.
pub fn evaluate_arrival(
    now_ms: u64,
    distance_to_target_m: f64,
    speed_mps: f64,
    within_radius_since_ms: Option<u64>,
    config: &ArrivalConfig,
) -> ArrivalEvaluation {
    let distance = if distance_to_target_m.is_nan() {
        f64::INFINITY
    } else {
        distance_to_target_m.max(0.0)
    };
    let speed = if speed_mps.is_nan() {
        f64::INFINITY
    } else {
        speed_mps.max(0.0)
    };

    let since = if distance > config.dwell_radius_m {
        None
    } else {
        Some(within_radius_since_ms.unwrap_or(now_ms))
    };

    let immediate = distance <= config.immediate_radius_m && speed <= config.max_arrival_speed_mps;
    let dwelled =
        since.is_some_and(|entered| now_ms.saturating_sub(entered) >= config.dwell_window_ms);

    ArrivalEvaluation {
        arrived: immediate || dwelled,
        within_radius_since_ms: since,
    }
}

/// Whether to start the practice route now.
///
/// Requires an arrival and no transition or route start already running,
/// so a burst of arrival samples starts the route once.
pub fn should_transition_to_practice_route(
    arrived: bool,
    transition_in_progress: bool,
    route_start_in_progress: bool,
) -> bool {
    arrived && !transition_in_progress && !route_start_in_progress
}
