//! Hazard features and route conflict detection.
//!
//! Features are supplied by an external feature source (map extracts,
//! backend hazard packs). This module never fetches them; it filters,
//! deduplicates, indexes and relates them to a route.

pub mod conflict;
pub mod spatial_index;

pub use conflict::{
    count_route_conflicts, filter_by_type, nearest_ahead, ConflictConfig, HazardConflict,
    DEFAULT_ROUTE_MATCH_DISTANCE_METERS, DEFAULT_WARNING_DISTANCE_METERS,
};
pub use spatial_index::{HazardSpatialIndex, DEFAULT_BUCKET_SIZE_METERS};

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::GeoPoint;

/// Kind of road hazard a learner driver is warned about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HazardType {
    TrafficSignal,
    ZebraCrossing,
    GiveWay,
    SpeedCamera,
    Roundabout,
    MiniRoundabout,
    SchoolZone,
    BusLane,
    BusStop,
    NoEntry,
}

impl HazardType {
    /// Every hazard type, in declaration order.
    pub const ALL: [HazardType; 10] = [
        HazardType::TrafficSignal,
        HazardType::ZebraCrossing,
        HazardType::GiveWay,
        HazardType::SpeedCamera,
        HazardType::Roundabout,
        HazardType::MiniRoundabout,
        HazardType::SchoolZone,
        HazardType::BusLane,
        HazardType::BusStop,
        HazardType::NoEntry,
    ];

    /// Canonical wire name (matches the serde representation).
    pub fn as_str(&self) -> &'static str {
        match self {
            HazardType::TrafficSignal => "TRAFFIC_SIGNAL",
            HazardType::ZebraCrossing => "ZEBRA_CROSSING",
            HazardType::GiveWay => "GIVE_WAY",
            HazardType::SpeedCamera => "SPEED_CAMERA",
            HazardType::Roundabout => "ROUNDABOUT",
            HazardType::MiniRoundabout => "MINI_ROUNDABOUT",
            HazardType::SchoolZone => "SCHOOL_ZONE",
            HazardType::BusLane => "BUS_LANE",
            HazardType::BusStop => "BUS_STOP",
            HazardType::NoEntry => "NO_ENTRY",
        }
    }

    /// Get a human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            HazardType::TrafficSignal => "traffic lights",
            HazardType::ZebraCrossing => "zebra crossing",
            HazardType::GiveWay => "give way",
            HazardType::SpeedCamera => "speed camera",
            HazardType::Roundabout => "roundabout",
            HazardType::MiniRoundabout => "mini roundabout",
            HazardType::SchoolZone => "school zone",
            HazardType::BusLane => "bus lane",
            HazardType::BusStop => "bus stop",
            HazardType::NoEntry => "no entry",
        }
    }
}

impl fmt::Display for HazardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hazard type name that matches no known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown hazard type: {0:?}")]
pub struct UnknownHazardType(pub String);

impl FromStr for HazardType {
    type Err = UnknownHazardType;

    /// Parses `SPEED_CAMERA`, `speed-camera`, `Speed_Camera`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        HazardType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| UnknownHazardType(s.to_string()))
    }
}

/// A single hazard from the feature source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardFeature {
    pub id: String,
    #[serde(rename = "type")]
    pub hazard_type: HazardType,
    pub lat: f64,
    pub lon: f64,
    pub source: String,
    /// Source confidence in `[0, 1]`.
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl HazardFeature {
    pub fn new(
        id: impl Into<String>,
        hazard_type: HazardType,
        lat: f64,
        lon: f64,
        source: impl Into<String>,
        confidence: f32,
    ) -> Self {
        Self {
            id: id.into(),
            hazard_type,
            lat,
            lon,
            source: source.into(),
            confidence,
            tags: BTreeMap::new(),
        }
    }

    /// Attach a tag (builder style).
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }

    /// Whether the coordinates are finite.
    pub fn has_finite_position(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// Drop features without a finite position and duplicates.
///
/// Two features are duplicates when they share an id and their coordinates
/// agree to 5 decimal places (~1 m). The first occurrence wins and input
/// order is preserved.
pub fn dedupe_features(features: &[HazardFeature]) -> Vec<HazardFeature> {
    let mut seen = HashSet::new();
    features
        .iter()
        .filter(|f| f.has_finite_position())
        .filter(|f| seen.insert(format!("{}:{:.5}:{:.5}", f.id, f.lat, f.lon)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hazard_type_from_str_variants() {
        assert_eq!("SPEED_CAMERA".parse(), Ok(HazardType::SpeedCamera));
        assert_eq!("speed-camera".parse(), Ok(HazardType::SpeedCamera));
        assert_eq!(" no_entry ".parse(), Ok(HazardType::NoEntry));
        assert_eq!(
            "lollipop".parse::<HazardType>(),
            Err(UnknownHazardType("lollipop".to_string()))
        );
    }

    #[test]
    fn test_hazard_type_roundtrips_through_display() {
        for t in HazardType::ALL {
            assert_eq!(t.to_string().parse::<HazardType>(), Ok(t));
        }
    }

    #[test]
    fn test_feature_json_shape() {
        let feature = HazardFeature::new("cam_1", HazardType::SpeedCamera, 51.51, 0.1, "osm", 1.0)
            .with_tag("highway", "speed_camera");
        let json = serde_json::to_value(&feature).unwrap();

        assert_eq!(json["type"], "SPEED_CAMERA");
        assert_eq!(json["tags"]["highway"], "speed_camera");

        let back: HazardFeature = serde_json::from_value(json).unwrap();
        assert_eq!(back, feature);
    }

    #[test]
    fn test_feature_json_without_tags() {
        let json = r#"{"id":"ne_1","type":"NO_ENTRY","lat":51.5,"lon":0.1,"source":"test","confidence":0.8}"#;
        let feature: HazardFeature = serde_json::from_str(json).unwrap();
        assert_eq!(feature.hazard_type, HazardType::NoEntry);
        assert!(feature.tags.is_empty());
    }

    #[test]
    fn test_dedupe_features() {
        let a = HazardFeature::new("cam_1", HazardType::SpeedCamera, 51.510001, 0.1, "a", 1.0);
        let a_again = HazardFeature::new("cam_1", HazardType::SpeedCamera, 51.510002, 0.1, "b", 1.0);
        let moved = HazardFeature::new("cam_1", HazardType::SpeedCamera, 51.52, 0.1, "c", 1.0);
        let broken = HazardFeature::new("cam_2", HazardType::SpeedCamera, f64::NAN, 0.1, "d", 1.0);

        let deduped = dedupe_features(&[a.clone(), a_again, moved.clone(), broken]);
        assert_eq!(deduped, vec![a, moved]);
    }
}
