//! RouteWatch - route-following core for learner-driver navigation
//!
//! This library projects positions onto precomputed routes, relates hazard
//! features to the route ahead, caches hazard data keyed by route geometry,
//! and decides when to refresh, reroute, or start a practice route.
//!
//! Everything that needs configuration or the current time receives it
//! through a [`CoreContext`] or explicit arguments; there is no global state.
//!
//! ```
//! use routewatch::coord::GeoPoint;
//! use routewatch::route::Route;
//!
//! let route = Route::new(
//!     "high-street",
//!     vec![GeoPoint::new(51.8900, 0.9000), GeoPoint::new(51.8900, 0.9100)],
//! );
//! let projection = route.project(&GeoPoint::new(51.8901, 0.9050)).unwrap();
//! assert!(projection.lateral_distance_m < 15.0);
//! ```

pub mod advisor;
pub mod cache;
pub mod clock;
pub mod config;
pub mod context;
pub mod coord;
pub mod error;
pub mod hazard;
pub mod logging;
pub mod progress;
pub mod route;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CoreConfig;
pub use context::CoreContext;
pub use coord::GeoPoint;
pub use error::{CoreError, CoreResult};
pub use hazard::{HazardFeature, HazardType};
pub use route::{Route, RouteFingerprint};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
