//! Three-state gate for asynchronous transitions.
//!
//! A transition is requested with an intent, completes later, and may be
//! confirmed late or for a different intent than the one currently
//! pending. The gate makes each of those cases an explicit state change:
//!
//! ```text
//! Idle --begin(i)--> Pending(i) --confirm(i)--> Confirmed(i)
//!                       |  confirm(j != i): rejected, stays Pending(i)
//!                       +--cancel()--> Idle
//! any --reset()--> Idle
//! ```

use std::fmt;

/// Gate state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionGate<T> {
    Idle,
    /// Requested, waiting for confirmation.
    Pending(T),
    /// Completed.
    Confirmed(T),
}

impl<T> Default for TransitionGate<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T: PartialEq + fmt::Debug> TransitionGate<T> {
    pub fn new() -> Self {
        Self::Idle
    }

    /// Request a transition. Only accepted from `Idle`.
    pub fn begin(&mut self, intent: T) -> bool {
        match self {
            Self::Idle => {
                tracing::debug!(?intent, "Transition pending");
                *self = Self::Pending(intent);
                true
            }
            _ => false,
        }
    }

    /// Confirm the pending transition.
    ///
    /// Rejected unless the gate is `Pending` with an equal intent.
    pub fn confirm(&mut self, intent: &T) -> bool {
        let matches = matches!(&*self, Self::Pending(pending) if pending == intent);
        if !matches {
            tracing::debug!(?intent, state = ?self, "Ignoring late or mismatched confirmation");
            return false;
        }
        if let Self::Pending(pending) = std::mem::replace(self, Self::Idle) {
            tracing::info!(intent = ?pending, "Transition confirmed");
            *self = Self::Confirmed(pending);
        }
        true
    }

    /// Abandon a pending transition. Returns the intent it held.
    pub fn cancel(&mut self) -> Option<T> {
        match std::mem::replace(self, Self::Idle) {
            Self::Pending(intent) => Some(intent),
            other => {
                *self = other;
                None
            }
        }
    }

    /// Return to `Idle` from any state.
    pub fn reset(&mut self) {
        *self = Self::Idle;
    }

    /// Whether a transition is waiting for confirmation.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }

    pub fn pending(&self) -> Option<&T> {
        match self {
            Self::Pending(intent) => Some(intent),
            _ => None,
        }
    }

    pub fn confirmed(&self) -> Option<&T> {
        match self {
            Self::Confirmed(intent) => Some(intent),
            _ => None,
        }
    }
}
