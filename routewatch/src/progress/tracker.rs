//! Per-session progress tracking toward a practice route's start point.
//!
//! One [`ProgressTracker`] exists per active route-following session. It
//! owns the [`ProgressState`] record and is the only thing that mutates it.

use tracing::{debug, info};

use super::arrival::{
    evaluate_arrival, should_transition_to_practice_route, ArrivalConfig, ArrivalEvaluation,
};
use super::reroute::{should_reroute_to_start, RerouteConfig, RerouteInput};
use super::transition::TransitionGate;
use crate::coord::{planar_distance_m, GeoPoint};
use crate::route::RouteProgress;

/// Mutable progress record for one session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressState {
    /// When the driver entered the dwell radius, if currently inside it.
    pub within_radius_since_ms: Option<u64>,
    /// Smallest distance to the target seen this session (meters).
    pub closest_distance_seen_m: f64,
    /// When the last reroute to the start fired.
    pub last_reroute_at_ms: Option<u64>,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            within_radius_since_ms: None,
            closest_distance_seen_m: f64::INFINITY,
            last_reroute_at_ms: None,
        }
    }
}

/// Transition the tracker can request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionIntent {
    StartPracticeRoute { route_id: String },
}

/// One position sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSample {
    pub now_ms: u64,
    pub position: GeoPoint,
    pub speed_mps: f64,
    /// Progress along the route currently leading to the target, if any.
    pub approach: Option<RouteProgress>,
}

/// What the caller should do after a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    pub distance_to_target_m: f64,
    pub arrival: ArrivalEvaluation,
    /// Begin the practice route now. The tracker has moved its gate to
    /// pending; call [`ProgressTracker::confirm_practice_route`] once the
    /// route is running.
    pub start_practice_route: bool,
    /// Request a new route back to the target.
    pub reroute_to_start: bool,
}

/// Drives arrival, transition gating and reroute decisions for a session.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    practice_route_id: String,
    target: GeoPoint,
    arrival: ArrivalConfig,
    reroute: RerouteConfig,
    state: ProgressState,
    gate: TransitionGate<TransitionIntent>,
}

impl ProgressTracker {
    /// Track progress toward `target`, the start of `practice_route_id`.
    pub fn new(
        practice_route_id: impl Into<String>,
        target: GeoPoint,
        arrival: ArrivalConfig,
        reroute: RerouteConfig,
    ) -> Self {
        Self {
            practice_route_id: practice_route_id.into(),
            target,
            arrival,
            reroute,
            state: ProgressState::default(),
            gate: TransitionGate::new(),
        }
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn gate(&self) -> &TransitionGate<TransitionIntent> {
        &self.gate
    }

    pub fn target(&self) -> &GeoPoint {
        &self.target
    }

    /// Consume a sample and decide what happens next.
    pub fn update(&mut self, sample: &ProgressSample) -> ProgressUpdate {
        let distance = planar_distance_m(&sample.position, &self.target);
        if distance.is_finite() {
            self.state.closest_distance_seen_m = self.state.closest_distance_seen_m.min(distance);
        }

        let arrival = evaluate_arrival(
            sample.now_ms,
            distance,
            sample.speed_mps,
            self.state.within_radius_since_ms,
            &self.arrival,
        );
        self.state.within_radius_since_ms = arrival.within_radius_since_ms;

        let mut update = ProgressUpdate {
            distance_to_target_m: distance,
            arrival,
            start_practice_route: false,
            reroute_to_start: false,
        };

        let transition = should_transition_to_practice_route(
            arrival.arrived,
            self.gate.is_in_progress(),
            self.gate.is_confirmed(),
        );
        if transition {
            let intent = TransitionIntent::StartPracticeRoute {
                route_id: self.practice_route_id.clone(),
            };
            if self.gate.begin(intent) {
                info!(
                    route_id = %self.practice_route_id,
                    distance_m = distance,
                    "Arrived at practice route start"
                );
                update.start_practice_route = true;
            }
            return update;
        }

        // Nothing to reroute once the practice route is underway.
        if !matches!(self.gate, TransitionGate::Idle) {
            return update;
        }

        if let Some(approach) = sample.approach {
            let input = RerouteInput {
                now_ms: sample.now_ms,
                last_reroute_at_ms: self.state.last_reroute_at_ms,
                distance_to_start_m: distance,
                closest_distance_seen_m: self.state.closest_distance_seen_m,
                route_distance_remaining_m: approach.distance_remaining_m,
                completion_percent: approach.completion_percent,
            };
            if should_reroute_to_start(&input, &self.reroute) {
                info!(
                    route_id = %self.practice_route_id,
                    distance_m = distance,
                    closest_m = self.state.closest_distance_seen_m,
                    "Practice start missed, rerouting"
                );
                self.state.last_reroute_at_ms = Some(sample.now_ms);
                update.reroute_to_start = true;
            }
        }

        update
    }

    /// Mark the practice route as started. Returns false for a late or
    /// mismatched confirmation.
    pub fn confirm_practice_route(&mut self, route_id: &str) -> bool {
        self.gate.confirm(&TransitionIntent::StartPracticeRoute {
            route_id: route_id.to_string(),
        })
    }

    /// Abandon a pending practice route start (e.g. the route failed to load).
    ///
    /// The dwell timer restarts so arrival is re-established before retrying.
    pub fn cancel_transition(&mut self) -> bool {
        let cancelled = self.gate.cancel().is_some();
        if cancelled {
            debug!(route_id = %self.practice_route_id, "Practice route start cancelled");
            self.state.within_radius_since_ms = None;
        }
        cancelled
    }

    /// Start over toward a new target.
    pub fn reset(&mut self, practice_route_id: impl Into<String>, target: GeoPoint) {
        self.practice_route_id = practice_route_id.into();
        self.target = target;
        self.state = ProgressState::default();
        self.gate.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: GeoPoint = GeoPoint::new(51.5000, 0.1000);

    /// Point `meters` due north of the start.
    fn north_of_start(meters: f64) -> GeoPoint {
        GeoPoint::new(START.latitude + meters / 111_194.93, START.longitude)
    }

    fn tracker() -> ProgressTracker {
        ProgressTracker::new(
            "colchester-1",
            START,
            ArrivalConfig::default(),
            RerouteConfig::default(),
        )
    }

    fn sample(now_ms: u64, meters: f64, speed_mps: f64) -> ProgressSample {
        ProgressSample {
            now_ms,
            position: north_of_start(meters),
            speed_mps,
            approach: Some(RouteProgress {
                distance_along_m: 500.0,
                distance_remaining_m: 220.0,
                completion_percent: 60,
            }),
        }
    }

    #[test]
    fn test_arrival_starts_practice_route_once() {
        let mut tracker = tracker();
        let first = tracker.update(&sample(10_000, 35.0, 2.0));
        assert!(first.arrival.arrived);
        assert!(first.start_practice_route);
        assert!(tracker.gate().is_in_progress());

        let second = tracker.update(&sample(11_000, 30.0, 1.0));
        assert!(second.arrival.arrived);
        assert!(!second.start_practice_route);

        assert!(tracker.confirm_practice_route("colchester-1"));
        let third = tracker.update(&sample(12_000, 20.0, 1.0));
        assert!(!third.start_practice_route);
    }

    #[test]
    fn test_wrong_route_confirmation_rejected() {
        let mut tracker = tracker();
        tracker.update(&sample(10_000, 10.0, 0.0));
        assert!(!tracker.confirm_practice_route("ipswich-2"));
        assert!(tracker.gate().is_in_progress());
    }

    #[test]
    fn test_dwell_arrival() {
        let mut tracker = tracker();
        let first = tracker.update(&sample(10_000, 55.0, 6.0));
        assert!(!first.arrival.arrived);
        assert_eq!(tracker.state().within_radius_since_ms, Some(10_000));

        let second = tracker.update(&sample(20_001, 54.0, 6.0));
        assert!(second.start_practice_route);
    }

    #[test]
    fn test_missed_start_reroutes_with_cooldown() {
        let mut tracker = tracker();
        tracker.update(&sample(1_000, 45.0, 10.0)); // approaching, too fast
        tracker.update(&sample(2_000, 25.0, 10.0)); // closest approach, too fast
        // Leaves the dwell radius before the window elapses.
        let away = tracker.update(&sample(3_000, 95.0, 10.0));
        assert!(!away.arrival.arrived);
        assert!(away.reroute_to_start);
        assert_eq!(tracker.state().last_reroute_at_ms, Some(3_000));
        assert!((tracker.state().closest_distance_seen_m - 25.0).abs() < 0.01);

        let again = tracker.update(&sample(6_000, 120.0, 10.0));
        assert!(!again.reroute_to_start);

        let later = tracker.update(&sample(11_000, 130.0, 10.0));
        assert!(later.reroute_to_start);
    }

    #[test]
    fn test_no_reroute_without_approach_progress() {
        let mut tracker = tracker();
        tracker.update(&sample(1_000, 25.0, 10.0));
        let away = tracker.update(&ProgressSample {
            approach: None,
            ..sample(3_000, 95.0, 10.0)
        });
        assert!(!away.reroute_to_start);
    }

    #[test]
    fn test_cancel_transition_restarts_dwell() {
        let mut tracker = tracker();
        tracker.update(&sample(10_000, 50.0, 6.0));
        tracker.update(&sample(20_000, 50.0, 6.0));
        assert!(tracker.gate().is_in_progress());

        assert!(tracker.cancel_transition());
        assert_eq!(tracker.state().within_radius_since_ms, None);
        assert!(!tracker.cancel_transition());
    }

    #[test]
    fn test_reset() {
        let mut tracker = tracker();
        tracker.update(&sample(10_000, 10.0, 0.0));
        tracker.reset("ipswich-2", GeoPoint::new(52.05, 1.15));

        assert_eq!(tracker.state(), &ProgressState::default());
        assert_eq!(tracker.gate(), &TransitionGate::Idle);
    }
}
