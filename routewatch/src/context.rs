//! Explicit runtime context.
//!
//! Components that need configuration or the current time receive a
//! [`CoreContext`] (or the pieces of it they need) instead of reading
//! process-wide state.

use std::sync::Arc;

use crate::advisor::AdjustmentAnnouncer;
use crate::cache::{DiskStore, HazardCache, MemoryStore, StoreError};
use crate::clock::{Clock, SystemClock};
use crate::config::CoreConfig;
use crate::coord::GeoPoint;
use crate::progress::ProgressTracker;
use crate::session::FetchTriggerPolicy;

/// Configuration plus time source, shared by a host's components.
#[derive(Clone)]
pub struct CoreContext {
    config: Arc<CoreConfig>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for CoreContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreContext")
            .field("config", &self.config)
            .field("now_ms", &self.clock.now_ms())
            .finish()
    }
}

impl CoreContext {
    pub fn new(config: CoreConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config: Arc::new(config),
            clock,
        }
    }

    /// Context with the given config and the wall clock.
    pub fn with_system_clock(config: CoreConfig) -> Self {
        Self::new(config, Arc::new(SystemClock))
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Open the disk-backed hazard cache at the configured directory.
    pub fn open_hazard_cache(&self) -> Result<HazardCache, StoreError> {
        let store = DiskStore::open(&self.config.cache.dir)?;
        Ok(HazardCache::new(Arc::new(store), self.config.cache.ttl_ms))
    }

    /// In-memory hazard cache with the configured time-to-live.
    pub fn memory_hazard_cache(&self) -> HazardCache {
        HazardCache::new(Arc::new(MemoryStore::new()), self.config.cache.ttl_ms)
    }

    pub fn fetch_trigger_policy(&self) -> FetchTriggerPolicy {
        FetchTriggerPolicy::new(self.config.fetch)
    }

    /// Progress tracker toward the start of `practice_route_id`.
    pub fn progress_tracker(
        &self,
        practice_route_id: impl Into<String>,
        start: GeoPoint,
    ) -> ProgressTracker {
        ProgressTracker::new(practice_route_id, start, self.config.arrival, self.config.reroute)
    }

    pub fn adjustment_announcer(&self) -> AdjustmentAnnouncer {
        AdjustmentAnnouncer::new(self.config.advisor)
    }
}
