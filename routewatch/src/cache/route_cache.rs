//! Time-bounded cache of per-route query results.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::key::RouteKey;
use super::traits::{Store, StoreError};
use crate::hazard::HazardFeature;

/// Default entry lifetime: 24 hours.
pub const DEFAULT_CACHE_TTL_MS: u64 = 24 * 60 * 60 * 1000;

/// A stored record.
///
/// Carries the full [`RouteKey`] so a store-key collision still reads as a
/// miss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<P> {
    pub key: RouteKey,
    pub written_at_ms: u64,
    pub ttl_ms: u64,
    pub payload: P,
}

impl<P> CacheEntry<P> {
    /// Whether the entry is still fresh at `now_ms`.
    ///
    /// A clock that moved backwards counts as zero age.
    pub fn is_fresh(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.written_at_ms) < self.ttl_ms
    }
}

/// Route-keyed cache over any [`Store`].
///
/// Stale, mismatched and corrupt entries all read as `Ok(None)`. Only the
/// store itself failing produces an error.
pub struct RouteCache<P> {
    store: Arc<dyn Store>,
    ttl_ms: u64,
    _payload: PhantomData<fn() -> P>,
}

/// Cache of hazard features per route.
pub type HazardCache = RouteCache<Vec<HazardFeature>>;

impl<P> RouteCache<P>
where
    P: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn Store>, ttl_ms: u64) -> Self {
        Self {
            store,
            ttl_ms,
            _payload: PhantomData,
        }
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    /// Store `payload` for `key`, written at `now_ms`.
    ///
    /// Replaces any previous entry for the same key.
    pub fn write(&self, key: &RouteKey, payload: &P, now_ms: u64) -> Result<(), StoreError> {
        let entry = CacheEntry {
            key: key.clone(),
            written_at_ms: now_ms,
            ttl_ms: self.ttl_ms,
            payload,
        };
        let bytes = serde_json::to_vec(&entry)?;
        let size = bytes.len();

        self.store.put(&key.store_key(), bytes).map_err(|e| {
            warn!(route = %key, store = self.store.name(), error = %e, "Cache write failed");
            e
        })?;
        debug!(route = %key, bytes = size, "Cache write");
        Ok(())
    }

    /// Payload stored for exactly `key`, if still fresh at `now_ms`.
    pub fn read(&self, key: &RouteKey, now_ms: u64) -> Result<Option<P>, StoreError> {
        let store_key = key.store_key();
        let bytes = match self.store.get(&store_key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(route = %key, "Cache miss");
                return Ok(None);
            }
            Err(e) => {
                warn!(route = %key, store = self.store.name(), error = %e, "Cache read failed");
                return Err(e);
            }
        };

        let entry: CacheEntry<P> = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(route = %key, error = %e, "Cache entry corrupt, discarding");
                self.evict(&store_key, key, &bytes);
                return Ok(None);
            }
        };

        if entry.key != *key {
            debug!(route = %key, stored = %entry.key, "Cache key mismatch");
            return Ok(None);
        }

        if !entry.is_fresh(now_ms) {
            debug!(
                route = %key,
                age_ms = now_ms.saturating_sub(entry.written_at_ms),
                ttl_ms = entry.ttl_ms,
                "Cache entry expired"
            );
            self.evict(&store_key, key, &bytes);
            return Ok(None);
        }

        debug!(route = %key, "Cache hit");
        Ok(Some(entry.payload))
    }

    /// Remove the entry for `key`. Returns whether one existed.
    ///
    /// Reads never touch entries stored under another fingerprint, so
    /// entries for superseded route geometry stay in the store until the
    /// caller invalidates them with the old key.
    pub fn invalidate(&self, key: &RouteKey) -> Result<bool, StoreError> {
        let removed = self.store.delete(&key.store_key())?;
        debug!(route = %key, removed, "Cache invalidate");
        Ok(removed)
    }

    /// Opportunistic delete of the record read as `seen`; failures are
    /// logged, never returned. A record rewritten since the read is kept.
    fn evict(&self, store_key: &str, key: &RouteKey, seen: &[u8]) {
        match self.store.delete_if(store_key, seen) {
            Ok(removed) => debug!(route = %key, removed, "Cache evict"),
            Err(e) => warn!(route = %key, error = %e, "Failed to evict cache entry"),
        }
    }
}
