//! When to discard cached hazard data and fetch again.
//!
//! The policy is stateless: the caller owns the last anchor point and the
//! last centre id, passes them in on every evaluation, and only updates
//! them after a refresh actually succeeded.

use std::fmt;

use tracing::debug;

use crate::coord::{planar_distance_m, GeoPoint};

/// Default displacement that forces a refresh (meters).
pub const DEFAULT_MOVEMENT_THRESHOLD_METERS: f64 = 5000.0;

/// Fetch-trigger tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchTriggerConfig {
    /// Straight-line distance from the last anchor beyond which a refresh
    /// is required.
    pub movement_threshold_m: f64,
}

impl Default for FetchTriggerConfig {
    fn default() -> Self {
        Self {
            movement_threshold_m: DEFAULT_MOVEMENT_THRESHOLD_METERS,
        }
    }
}

/// Why a refresh is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshReason {
    /// First evaluation of a new session.
    SessionStart,
    /// The selected test centre changed.
    CentreChanged,
    /// The driver moved beyond the threshold from the last anchor.
    MovedBeyondThreshold,
}

impl fmt::Display for RefreshReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshReason::SessionStart => write!(f, "session start"),
            RefreshReason::CentreChanged => write!(f, "centre changed"),
            RefreshReason::MovedBeyondThreshold => write!(f, "moved beyond threshold"),
        }
    }
}

/// Caller-owned values for one evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchInputs<'a> {
    /// Whether this is the first evaluation since the session began.
    pub session_starting: bool,
    /// Centre id the cached data was fetched for.
    pub previous_centre_id: Option<&'a str>,
    /// Centre id currently selected.
    pub current_centre_id: Option<&'a str>,
    /// Position of the last successful refresh.
    pub last_anchor: Option<GeoPoint>,
    /// Current position.
    pub current: Option<GeoPoint>,
}

/// Refresh predicates and their composition.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTriggerPolicy {
    config: FetchTriggerConfig,
}

impl FetchTriggerPolicy {
    pub fn new(config: FetchTriggerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FetchTriggerConfig {
        &self.config
    }

    /// A new session never trusts the cache.
    pub fn force_on_session_start(&self) -> bool {
        true
    }

    /// Whether the centre id changed. Ids are trimmed; absent equals empty.
    pub fn force_on_centre_change(&self, previous: Option<&str>, next: Option<&str>) -> bool {
        previous.unwrap_or("").trim() != next.unwrap_or("").trim()
    }

    /// Whether `current` is more than the threshold away from `last_anchor`.
    ///
    /// Without an anchor there is nothing to compare against.
    pub fn force_on_movement(&self, last_anchor: Option<&GeoPoint>, current: &GeoPoint) -> bool {
        match last_anchor {
            Some(anchor) => planar_distance_m(anchor, current) > self.config.movement_threshold_m,
            None => false,
        }
    }

    /// First reason a refresh is required, if any.
    ///
    /// Checked in order: session start, centre change, movement.
    pub fn evaluate(&self, inputs: &FetchInputs<'_>) -> Option<RefreshReason> {
        let reason = if inputs.session_starting && self.force_on_session_start() {
            Some(RefreshReason::SessionStart)
        } else if self.force_on_centre_change(inputs.previous_centre_id, inputs.current_centre_id)
        {
            Some(RefreshReason::CentreChanged)
        } else if inputs
            .current
            .as_ref()
            .is_some_and(|current| self.force_on_movement(inputs.last_anchor.as_ref(), current))
        {
            Some(RefreshReason::MovedBeyondThreshold)
        } else {
            None
        };

        if let Some(reason) = reason {
            debug!(%reason, "Hazard refresh required");
        }
        reason
    }
}
