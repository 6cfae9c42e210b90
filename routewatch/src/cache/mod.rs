//! Geometry-keyed, time-bounded cache for route query results.
//!
//! The cache is split in two layers:
//!
//! - [`Store`]: byte-level key-value persistence with per-key atomic
//!   writes, implemented by [`MemoryStore`] and [`DiskStore`]
//! - [`RouteCache`]: keys entries by [`RouteKey`] (route id plus geometry
//!   fingerprint), serializes payloads and applies the time-to-live
//!
//! ```text
//! read(key, now) = payload   if stored.key == key && now - written_at < ttl
//!                  None      otherwise (missing, expired, mismatched, corrupt)
//!                  Err       only when the store fails
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use routewatch::cache::{HazardCache, MemoryStore, RouteKey};
//! use routewatch::coord::GeoPoint;
//! use routewatch::route::Route;
//!
//! let route = Route::new("colchester", vec![
//!     GeoPoint::new(51.89, 0.90),
//!     GeoPoint::new(51.90, 0.91),
//! ]);
//! let cache = HazardCache::new(Arc::new(MemoryStore::new()), 60_000);
//! let key = RouteKey::for_route(&route);
//!
//! cache.write(&key, &Vec::new(), 1_000).unwrap();
//! assert_eq!(cache.read(&key, 2_000).unwrap(), Some(Vec::new()));
//! assert_eq!(cache.read(&key, 61_000).unwrap(), None);
//! ```

mod key;
pub mod providers;
mod route_cache;
mod traits;

pub use key::RouteKey;
pub use providers::{DiskStore, MemoryStore};
pub use route_cache::{CacheEntry, HazardCache, RouteCache, DEFAULT_CACHE_TTL_MS};
pub use traits::{is_valid_key, Store, StoreError, MAX_KEY_LEN};
