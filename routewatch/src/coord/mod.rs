//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and a local equirectangular plane measured in meters.
//!
//! The plane is anchored on a single reference latitude:
//!
//! ```text
//! x = lon_rad * R * cos(ref_lat_rad)
//! y = lat_rad * R
//! ```
//!
//! This is accurate within tens of kilometers of the reference latitude,
//! which covers any practice route. It is deterministic and side-effect free.

mod types;

pub use types::{
    GeoPoint, PlanarPoint, EARTH_RADIUS_METERS, MAX_LAT, MAX_LON, MIN_COS_REFERENCE_LAT, MIN_LAT,
    MIN_LON,
};

/// Converts a geographic point to the local plane of `reference_latitude`.
///
/// # Arguments
///
/// * `point` - Geographic point in degrees
/// * `reference_latitude` - Latitude in degrees anchoring the plane
#[inline]
pub fn to_planar(point: &GeoPoint, reference_latitude: f64) -> PlanarPoint {
    let cos_ref = reference_latitude.to_radians().cos();
    PlanarPoint {
        x: point.longitude.to_radians() * EARTH_RADIUS_METERS * cos_ref,
        y: point.latitude.to_radians() * EARTH_RADIUS_METERS,
    }
}

/// Converts a planar point back to geographic coordinates.
///
/// `cos(reference_latitude)` is clamped to `[1e-6, 1.0]` so the inverse
/// stays finite near the poles.
#[inline]
pub fn from_planar(point: &PlanarPoint, reference_latitude: f64) -> GeoPoint {
    let cos_ref = reference_latitude
        .to_radians()
        .cos()
        .clamp(MIN_COS_REFERENCE_LAT, 1.0);
    GeoPoint {
        latitude: (point.y / EARTH_RADIUS_METERS).to_degrees(),
        longitude: (point.x / (EARTH_RADIUS_METERS * cos_ref)).to_degrees(),
    }
}

/// Straight-line distance in meters between two points in the local plane.
///
/// The plane is anchored on the mean latitude of the two points, so the
/// result is symmetric in its arguments.
pub fn planar_distance_m(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let reference = (a.latitude + b.latitude) / 2.0;
    to_planar(a, reference).distance_to(&to_planar(b, reference))
}

/// Great-circle distance in meters (haversine formula).
pub fn haversine_distance_m(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (b.longitude - a.longitude).to_radians();

    let sin_lat = (d_lat / 2.0).sin();
    let sin_lon = (d_lon / 2.0).sin();
    let h = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lon * sin_lon;

    2.0 * EARTH_RADIUS_METERS * h.clamp(0.0, 1.0).sqrt().asin()
}

/// Initial great-circle bearing from `from` to `to`.
///
/// Returns degrees in `[0, 360)`, where 0 = North, 90 = East.
pub fn forward_azimuth_deg(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

    normalize_bearing(y.atan2(x).to_degrees())
}

/// Smallest absolute angle between two bearings, in `[0, 180]`.
pub fn bearing_delta_deg(a: f64, b: f64) -> f64 {
    let a = normalize_bearing(a);
    let b = normalize_bearing(b);
    ((b - a + 540.0) % 360.0 - 180.0).abs()
}

/// Normalize an angle in degrees to `[0, 360)`.
#[inline]
pub fn normalize_bearing(degrees: f64) -> f64 {
    let normalized = degrees % 360.0;
    let normalized = if normalized < 0.0 {
        normalized + 360.0
    } else {
        normalized
    };
    // -0.0 % 360 and tiny negatives can round up to exactly 360.0
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_planar_origin() {
        let p = to_planar(&GeoPoint::new(0.0, 0.0), 0.0);
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, 0.0);
    }

    #[test]
    fn test_one_degree_latitude_is_about_111km() {
        let a = to_planar(&GeoPoint::new(51.0, 0.1), 51.0);
        let b = to_planar(&GeoPoint::new(52.0, 0.1), 51.0);
        let d = a.distance_to(&b);
        assert!((d - 111_195.0).abs() < 1.0, "Expected ~111195m, got {}", d);
    }

    #[test]
    fn test_longitude_shrinks_with_latitude() {
        let equator = to_planar(&GeoPoint::new(0.0, 1.0), 0.0);
        let london = to_planar(&GeoPoint::new(51.5, 1.0), 51.5);
        assert!(london.x < equator.x);
        assert!((london.x / equator.x - 51.5_f64.to_radians().cos()).abs() < 1e-12);
    }

    #[test]
    fn test_from_planar_clamps_at_pole() {
        let p = PlanarPoint::new(1000.0, 0.0);
        let geo = from_planar(&p, 90.0);
        assert!(geo.longitude.is_finite(), "Longitude should stay finite");
    }

    #[test]
    fn test_planar_distance_symmetric() {
        let a = GeoPoint::new(51.5000, 0.1000);
        let b = GeoPoint::new(51.5200, 0.1300);
        assert_eq!(planar_distance_m(&a, &b), planar_distance_m(&b, &a));
    }

    #[test]
    fn test_planar_close_to_haversine_at_short_range() {
        let a = GeoPoint::new(51.8900, 0.9000);
        let b = GeoPoint::new(51.9100, 0.9400);
        let planar = planar_distance_m(&a, &b);
        let great_circle = haversine_distance_m(&a, &b);
        assert!(
            (planar - great_circle).abs() < 1.0,
            "planar {} vs haversine {}",
            planar,
            great_circle
        );
    }

    #[test]
    fn test_forward_azimuth_cardinals() {
        let origin = GeoPoint::new(51.5, 0.1);
        let north = forward_azimuth_deg(&origin, &GeoPoint::new(51.6, 0.1));
        let east = forward_azimuth_deg(&origin, &GeoPoint::new(51.5, 0.2));
        let south = forward_azimuth_deg(&origin, &GeoPoint::new(51.4, 0.1));
        let west = forward_azimuth_deg(&origin, &GeoPoint::new(51.5, 0.0));

        assert!(north.abs() < 0.01, "Expected ~0°, got {}°", north);
        assert!((east - 90.0).abs() < 0.1, "Expected ~90°, got {}°", east);
        assert!((south - 180.0).abs() < 0.01, "Expected ~180°, got {}°", south);
        assert!((west - 270.0).abs() < 0.1, "Expected ~270°, got {}°", west);
    }

    #[test]
    fn test_bearing_delta_wraps() {
        assert!((bearing_delta_deg(350.0, 10.0) - 20.0).abs() < 1e-9);
        assert!((bearing_delta_deg(10.0, 350.0) - 20.0).abs() < 1e-9);
        assert!((bearing_delta_deg(-90.0, 90.0) - 180.0).abs() < 1e-9);
        assert_eq!(bearing_delta_deg(45.0, 45.0), 0.0);
    }

    #[test]
    fn test_normalize_bearing() {
        assert_eq!(normalize_bearing(0.0), 0.0);
        assert_eq!(normalize_bearing(360.0), 0.0);
        assert_eq!(normalize_bearing(-90.0), 270.0);
        assert_eq!(normalize_bearing(725.0), 5.0);
    }

    #[test]
    fn test_geo_point_validity() {
        assert!(GeoPoint::new(51.5, -0.12).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, 181.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_planar_roundtrip_property(
                lat in -80.0..80.0_f64,
                lon in -180.0..180.0_f64,
                reference in -80.0..80.0_f64
            ) {
                let planar = to_planar(&GeoPoint::new(lat, lon), reference);
                let back = from_planar(&planar, reference);

                prop_assert!(
                    (back.latitude - lat).abs() < 1e-9,
                    "Latitude roundtrip failed: {} -> {}", lat, back.latitude
                );
                prop_assert!(
                    (back.longitude - lon).abs() < 1e-9,
                    "Longitude roundtrip failed: {} -> {}", lon, back.longitude
                );
            }

            #[test]
            fn test_azimuth_in_range(
                lat1 in -80.0..80.0_f64,
                lon1 in -179.0..179.0_f64,
                dlat in -0.5..0.5_f64,
                dlon in -0.5..0.5_f64
            ) {
                let bearing = forward_azimuth_deg(
                    &GeoPoint::new(lat1, lon1),
                    &GeoPoint::new(lat1 + dlat, lon1 + dlon),
                );
                prop_assert!((0.0..360.0).contains(&bearing), "Bearing {} out of range", bearing);
            }
        }
    }
}
