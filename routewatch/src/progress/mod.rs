//! Route-progress state machine.
//!
//! Arrival detection (immediate or dwell), gating of the transition into
//! the practice route, and the reroute-to-start decision. The decision
//! functions are pure; [`ProgressTracker`] is the per-session owner of the
//! small state record they read and write.

pub mod arrival;
pub mod reroute;
pub mod tracker;
pub mod transition;

pub use arrival::{
    evaluate_arrival, should_transition_to_practice_route, ArrivalConfig, ArrivalEvaluation,
    ArrivalState,
};
pub use reroute::{should_reroute_to_start, RerouteConfig, RerouteInput};
pub use tracker::{ProgressSample, ProgressState, ProgressTracker, ProgressUpdate, TransitionIntent};
pub use transition::TransitionGate;
