//! Integration tests for a route-following session.
//!
//! These tests drive the public API the way a navigation host does:
//! - hazard features → dedupe → conflicts along the route
//! - hazard cache on disk, reopened across contexts
//! - refresh decisions for session start and movement
//! - arrival at a practice route start, and rerouting after missing it
//! - lower-stress route announcements
//!
//! Run with: `cargo test --test route_session_integration`

use std::sync::Arc;

use tempfile::TempDir;

use routewatch::advisor::RouteStressSnapshot;
use routewatch::cache::RouteKey;
use routewatch::config::CacheConfig;
use routewatch::hazard::{count_route_conflicts, dedupe_features, nearest_ahead};
use routewatch::progress::ProgressSample;
use routewatch::route::RouteProgress;
use routewatch::session::{FetchInputs, RefreshReason};
use routewatch::{
    CoreConfig, CoreContext, GeoPoint, HazardFeature, HazardType, ManualClock, Route,
};

// ============================================================================
// Helper Functions
// ============================================================================

const LAT: f64 = 51.89;

/// Roughly 1.4 km due east along a single street.
fn high_street() -> Route {
    Route::new(
        "high-street",
        vec![
            GeoPoint::new(LAT, 0.9000),
            GeoPoint::new(LAT, 0.9100),
            GeoPoint::new(LAT, 0.9200),
        ],
    )
}

fn hazards() -> Vec<HazardFeature> {
    vec![
        // ~48 m ahead of the route start, on the route.
        HazardFeature::new("sig-1", HazardType::TrafficSignal, LAT, 0.9007, "osm", 0.9),
        // ~55 m north of the route.
        HazardFeature::new("zebra-1", HazardType::ZebraCrossing, 51.8905, 0.9005, "osm", 0.8),
        HazardFeature::new("cam-1", HazardType::SpeedCamera, LAT, 0.9150, "pack", 1.0)
            .with_tag("limit", "30"),
        HazardFeature::new("sig-1", HazardType::TrafficSignal, LAT, 0.9007, "osm", 0.9),
    ]
}

fn context_in(dir: &TempDir, clock: Arc<ManualClock>) -> CoreContext {
    let config = CoreConfig {
        cache: CacheConfig {
            dir: dir.path().join("hazards"),
            ttl_ms: 60_000,
        },
        ..Default::default()
    };
    CoreContext::new(config, clock)
}

fn sample(now_ms: u64, position: GeoPoint, speed_mps: f64) -> ProgressSample {
    ProgressSample {
        now_ms,
        position,
        speed_mps,
        approach: None,
    }
}

// ============================================================================
// Hazards and Cache
// ============================================================================

#[test]
fn test_hazards_along_route() {
    let route = high_street();
    let ctx = CoreContext::new(CoreConfig::default(), Arc::new(ManualClock::new(0)));
    let features = dedupe_features(&hazards());
    assert_eq!(features.len(), 3);

    let match_m = ctx.config().conflict.route_match_distance_m;
    assert_eq!(count_route_conflicts(route.points(), &features, match_m), 2);

    let user = GeoPoint::new(LAT, 0.9000);
    let conflict = nearest_ahead(&user, route.points(), &features, &ctx.config().conflict)
        .expect("signal ahead");
    assert_eq!(conflict.feature_id, "sig-1");
    assert_eq!(conflict.hazard_type, HazardType::TrafficSignal);
    assert!((conflict.distance_ahead_m - 48.0).abs() < 2.0);

    // Past the signal nothing is within the warning distance.
    let later = GeoPoint::new(LAT, 0.9020);
    assert!(nearest_ahead(&later, route.points(), &features, &ctx.config().conflict).is_none());
}

#[test]
fn test_hazard_cache_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(1_000));
    let route = high_street();
    let key = RouteKey::for_route(&route);
    let features = dedupe_features(&hazards());

    {
        let ctx = context_in(&temp, clock.clone());
        let cache = ctx.open_hazard_cache().unwrap();
        cache.write(&key, &features, ctx.now_ms()).unwrap();
    }

    clock.advance(30_000);
    let ctx = context_in(&temp, clock.clone());
    let cache = ctx.open_hazard_cache().unwrap();
    assert_eq!(cache.read(&key, ctx.now_ms()).unwrap(), Some(features));

    // Same id, different geometry: a different key.
    let rerouted = Route::new(
        "high-street",
        vec![GeoPoint::new(LAT, 0.9000), GeoPoint::new(51.8950, 0.9100)],
    );
    assert_eq!(
        cache.read(&RouteKey::for_route(&rerouted), ctx.now_ms()).unwrap(),
        None
    );

    clock.advance(30_000);
    assert_eq!(cache.read(&key, ctx.now_ms()).unwrap(), None);
}

// ============================================================================
// Refresh Decisions
// ============================================================================

#[test]
fn test_refresh_on_start_then_movement() {
    let ctx = CoreContext::new(CoreConfig::default(), Arc::new(ManualClock::new(0)));
    let policy = ctx.fetch_trigger_policy();
    let anchor = GeoPoint::new(LAT, 0.9000);

    let start = FetchInputs {
        session_starting: true,
        current_centre_id: Some("colchester"),
        current: Some(anchor),
        ..Default::default()
    };
    assert_eq!(policy.evaluate(&start), Some(RefreshReason::SessionStart));

    let nearby = FetchInputs {
        previous_centre_id: Some("colchester"),
        current_centre_id: Some(" colchester "),
        last_anchor: Some(anchor),
        current: Some(GeoPoint::new(LAT, 0.9200)),
        ..Default::default()
    };
    assert_eq!(policy.evaluate(&nearby), None);

    // ~6.2 km east.
    let moved = FetchInputs {
        current: Some(GeoPoint::new(LAT, 0.9900)),
        ..nearby
    };
    assert_eq!(policy.evaluate(&moved), Some(RefreshReason::MovedBeyondThreshold));

    let changed = FetchInputs {
        current_centre_id: Some("chelmsford"),
        ..moved
    };
    assert_eq!(policy.evaluate(&changed), Some(RefreshReason::CentreChanged));
}

// ============================================================================
// Progress
// ============================================================================

#[test]
fn test_arrival_starts_practice_route_once() {
    let ctx = CoreContext::new(CoreConfig::default(), Arc::new(ManualClock::new(0)));
    let start = GeoPoint::new(LAT, 0.9200);
    let mut tracker = ctx.progress_tracker("practice-7", start);

    let far = tracker.update(&sample(1_000, GeoPoint::new(LAT, 0.9100), 12.0));
    assert!(!far.arrival.arrived);
    assert!(!far.start_practice_route);

    // ~29 m short of the start, crawling.
    let close = tracker.update(&sample(2_000, GeoPoint::new(LAT, 0.91958), 2.0));
    assert!(close.arrival.arrived);
    assert!(close.start_practice_route);
    assert!(tracker.gate().is_in_progress());

    let again = tracker.update(&sample(3_000, GeoPoint::new(LAT, 0.91960), 1.0));
    assert!(again.arrival.arrived);
    assert!(!again.start_practice_route);

    assert!(!tracker.confirm_practice_route("practice-8"));
    assert!(tracker.confirm_practice_route("practice-7"));
    assert!(tracker.gate().is_confirmed());

    let underway = tracker.update(&sample(4_000, GeoPoint::new(LAT, 0.92000), 3.0));
    assert!(!underway.start_practice_route);
    assert!(!underway.reroute_to_start);
}

#[test]
fn test_missed_start_reroutes_with_cooldown() {
    let ctx = CoreContext::new(CoreConfig::default(), Arc::new(ManualClock::new(0)));
    let start = GeoPoint::new(LAT, 0.9200);
    let mut tracker = ctx.progress_tracker("practice-7", start);
    let approach = RouteProgress {
        distance_along_m: 500.0,
        distance_remaining_m: 300.0,
        completion_percent: 62,
    };
    let with_approach = |now_ms, lon| ProgressSample {
        approach: Some(approach),
        ..sample(now_ms, GeoPoint::new(LAT, lon), 15.0)
    };

    // Driving past the start too fast to arrive.
    let passing = tracker.update(&with_approach(1_000, 0.91971));
    assert!(!passing.arrival.arrived);
    assert!(!passing.reroute_to_start);
    assert!(tracker.state().closest_distance_seen_m < 25.0);

    let away = tracker.update(&with_approach(3_000, 0.92116));
    assert!(away.reroute_to_start);
    assert_eq!(tracker.state().last_reroute_at_ms, Some(3_000));
    assert_eq!(tracker.state().within_radius_since_ms, None);

    let cooling = tracker.update(&with_approach(4_000, 0.92130));
    assert!(!cooling.reroute_to_start);

    let cooled = tracker.update(&with_approach(11_000, 0.92145));
    assert!(cooled.reroute_to_start);
    assert_eq!(tracker.state().last_reroute_at_ms, Some(11_000));
}

// ============================================================================
// Advisor
// ============================================================================

#[test]
fn test_lower_stress_announcement_is_rate_limited() {
    let clock = Arc::new(ManualClock::new(100_000));
    let ctx = CoreContext::new(CoreConfig::default(), clock.clone());
    let mut announcer = ctx.adjustment_announcer();
    let current = RouteStressSnapshot::new(72, 1200.0, 14_000.0);
    let calmer = RouteStressSnapshot::new(60, 1360.0, 16_100.0);

    assert!(announcer.consider(ctx.now_ms(), &current, &calmer));

    clock.advance(60_000);
    assert!(!announcer.consider(ctx.now_ms(), &current, &calmer));

    clock.advance(ctx.config().advisor.announcement_cooldown_ms);
    assert!(announcer.consider(ctx.now_ms(), &current, &calmer));
}
