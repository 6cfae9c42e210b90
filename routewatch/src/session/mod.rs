//! Session-level decisions about hazard data freshness.

mod fetch_trigger;

pub use fetch_trigger::{
    FetchInputs, FetchTriggerConfig, FetchTriggerPolicy, RefreshReason,
    DEFAULT_MOVEMENT_THRESHOLD_METERS,
};
