//! Lower-stress route recommendations.
//!
//! A candidate route is worth switching to when it is less stressful and
//! costs at most a few extra minutes or a little extra distance (either one
//! is enough). Announcements are rate-limited so the driver is not nagged.

use tracing::info;

/// Default maximum extra travel time accepted for a calmer route (seconds).
pub const DEFAULT_MAX_ETA_INCREASE_SECS: f64 = 180.0;

/// Default maximum extra distance accepted, as a ratio of the current route.
pub const DEFAULT_MAX_DISTANCE_INCREASE_RATIO: f64 = 0.10;

/// Default minimum time between adjustment announcements (milliseconds).
pub const DEFAULT_ANNOUNCEMENT_COOLDOWN_MS: u64 = 5 * 60 * 1000;

/// Comparison operand for one route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteStressSnapshot {
    /// Stress index, 0 (calm) to 100.
    pub stress_index: u8,
    pub eta_secs: f64,
    pub distance_m: f64,
}

impl RouteStressSnapshot {
    pub fn new(stress_index: u8, eta_secs: f64, distance_m: f64) -> Self {
        Self {
            stress_index: stress_index.min(100),
            eta_secs,
            distance_m,
        }
    }
}

/// Advisor thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvisorConfig {
    pub max_eta_increase_secs: f64,
    pub max_distance_increase_ratio: f64,
    pub announcement_cooldown_ms: u64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            max_eta_increase_secs: DEFAULT_MAX_ETA_INCREASE_SECS,
            max_distance_increase_ratio: DEFAULT_MAX_DISTANCE_INCREASE_RATIO,
            announcement_cooldown_ms: DEFAULT_ANNOUNCEMENT_COOLDOWN_MS,
        }
    }
}

/// Whether `candidate` should replace `current`.
///
/// Requires strictly lower stress, and either an ETA increase within the
/// limit or a distance increase ratio within the limit. A current distance
/// of zero or less counts as no distance increase.
pub fn should_switch_to_lower_stress_route(
    current: &RouteStressSnapshot,
    candidate: &RouteStressSnapshot,
    config: &AdvisorConfig,
) -> bool {
    if candidate.stress_index >= current.stress_index {
        return false;
    }

    let eta_increase = candidate.eta_secs - current.eta_secs;
    let distance_ratio = if current.distance_m <= 0.0 {
        0.0
    } else {
        (candidate.distance_m - current.distance_m) / current.distance_m
    };

    eta_increase <= config.max_eta_increase_secs
        || distance_ratio <= config.max_distance_increase_ratio
}

/// Whether the cooldown since the last announcement has elapsed.
///
/// Always true before the first announcement.
pub fn can_announce_adjustment(
    now_ms: u64,
    last_announcement_at_ms: Option<u64>,
    cooldown_ms: u64,
) -> bool {
    match last_announcement_at_ms {
        Some(last) => now_ms.saturating_sub(last) >= cooldown_ms,
        None => true,
    }
}

/// Combines the switch rule with the announcement cooldown.
#[derive(Debug, Clone, Default)]
pub struct AdjustmentAnnouncer {
    config: AdvisorConfig,
    last_announcement_at_ms: Option<u64>,
}

impl AdjustmentAnnouncer {
    pub fn new(config: AdvisorConfig) -> Self {
        Self {
            config,
            last_announcement_at_ms: None,
        }
    }

    pub fn last_announcement_at_ms(&self) -> Option<u64> {
        self.last_announcement_at_ms
    }

    /// Returns true, and records the time, when a switch should be
    /// recommended and announced now.
    pub fn consider(
        &mut self,
        now_ms: u64,
        current: &RouteStressSnapshot,
        candidate: &RouteStressSnapshot,
    ) -> bool {
        if !should_switch_to_lower_stress_route(current, candidate, &self.config) {
            return false;
        }
        if !can_announce_adjustment(
            now_ms,
            self.last_announcement_at_ms,
            self.config.announcement_cooldown_ms,
        ) {
            return false;
        }

        info!(
            current_stress = current.stress_index,
            candidate_stress = candidate.stress_index,
            eta_increase_secs = candidate.eta_secs - current.eta_secs,
            "Recommending lower-stress route"
        );
        self.last_announcement_at_ms = Some(now_ms);
        true
    }
}
