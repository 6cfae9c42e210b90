//! Core configuration.
//!
//! Every component has its own config struct with `Default` values; this
//! module aggregates them into [`CoreConfig`] and loads overrides from an
//! INI file:
//!
//! ```ini
//! [cache]
//! dir = ~/.cache/routewatch/hazards
//! ttl_ms = 86400000
//!
//! [conflict]
//! warning_distance_m = 60
//! route_match_distance_m = 30
//!
//! [fetch]
//! movement_threshold_m = 5000
//!
//! [arrival]
//! immediate_radius_m = 40
//! dwell_radius_m = 60
//! dwell_window_ms = 10000
//! max_speed_mps = 3.57632
//!
//! [reroute]
//! cooldown_ms = 8000
//! missed_delta_m = 30
//! arrival_distance_m = 40
//! completion_cutoff_percent = 98
//!
//! [advisor]
//! max_eta_increase_secs = 180
//! max_distance_increase_ratio = 0.10
//! announcement_cooldown_ms = 300000
//! ```
//!
//! Missing sections and keys keep their defaults.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::{Ini, Properties};
use thiserror::Error;

use crate::advisor::AdvisorConfig;
use crate::cache::DEFAULT_CACHE_TTL_MS;
use crate::hazard::ConflictConfig;
use crate::progress::{ArrivalConfig, RerouteConfig};
use crate::session::FetchTriggerConfig;

/// Directory under the platform cache dir that holds hazard entries.
pub const CACHE_SUBDIR: &str = "routewatch/hazards";

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value for [{section}] {key}: {value:?} ({reason})")]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Hazard cache settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    pub dir: PathBuf,
    pub ttl_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            ttl_ms: DEFAULT_CACHE_TTL_MS,
        }
    }
}

/// All core settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoreConfig {
    pub cache: CacheConfig,
    pub conflict: ConflictConfig,
    pub fetch: FetchTriggerConfig,
    pub arrival: ArrivalConfig,
    pub reroute: RerouteConfig,
    pub advisor: AdvisorConfig,
}

impl CoreConfig {
    /// Load from an INI file, starting from defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_ini(&ini)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse INI text, starting from defaults.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("cache")) {
            if let Some(dir) = section.get("dir") {
                let dir = dir.trim();
                if dir.is_empty() {
                    return Err(invalid("cache", "dir", dir, "must not be empty"));
                }
                config.cache.dir = expand_tilde(dir);
            }
            read_value(section, "cache", "ttl_ms", &mut config.cache.ttl_ms)?;
        }

        if let Some(section) = ini.section(Some("conflict")) {
            let c = &mut config.conflict;
            read_distance(section, "conflict", "warning_distance_m", &mut c.warning_distance_m)?;
            read_distance(
                section,
                "conflict",
                "route_match_distance_m",
                &mut c.route_match_distance_m,
            )?;
        }

        if let Some(section) = ini.section(Some("fetch")) {
            let f = &mut config.fetch;
            read_distance(section, "fetch", "movement_threshold_m", &mut f.movement_threshold_m)?;
        }

        if let Some(section) = ini.section(Some("arrival")) {
            let a = &mut config.arrival;
            read_distance(section, "arrival", "immediate_radius_m", &mut a.immediate_radius_m)?;
            read_distance(section, "arrival", "dwell_radius_m", &mut a.dwell_radius_m)?;
            read_value(section, "arrival", "dwell_window_ms", &mut a.dwell_window_ms)?;
            read_distance(section, "arrival", "max_speed_mps", &mut a.max_arrival_speed_mps)?;
        }

        if let Some(section) = ini.section(Some("reroute")) {
            let r = &mut config.reroute;
            read_value(section, "reroute", "cooldown_ms", &mut r.cooldown_ms)?;
            read_distance(section, "reroute", "missed_delta_m", &mut r.missed_delta_m)?;
            read_distance(section, "reroute", "arrival_distance_m", &mut r.arrival_distance_m)?;
            read_value(
                section,
                "reroute",
                "completion_cutoff_percent",
                &mut r.completion_cutoff_percent,
            )?;
            if r.completion_cutoff_percent > 100 {
                return Err(invalid(
                    "reroute",
                    "completion_cutoff_percent",
                    &r.completion_cutoff_percent.to_string(),
                    "must be at most 100",
                ));
            }
        }

        if let Some(section) = ini.section(Some("advisor")) {
            let a = &mut config.advisor;
            read_distance(section, "advisor", "max_eta_increase_secs", &mut a.max_eta_increase_secs)?;
            read_distance(
                section,
                "advisor",
                "max_distance_increase_ratio",
                &mut a.max_distance_increase_ratio,
            )?;
            read_value(
                section,
                "advisor",
                "announcement_cooldown_ms",
                &mut a.announcement_cooldown_ms,
            )?;
        }

        Ok(config)
    }
}

/// Platform cache directory for hazard entries.
///
/// Falls back to a relative `routewatch/hazards` when the platform has no
/// cache directory.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join(CACHE_SUBDIR))
        .unwrap_or_else(|| PathBuf::from(CACHE_SUBDIR))
}

fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

fn invalid(
    section: &'static str,
    key: &'static str,
    value: &str,
    reason: &'static str,
) -> ConfigError {
    ConfigError::InvalidValue {
        section,
        key,
        value: value.to_string(),
        reason,
    }
}

/// Parse `key` into `target` if present.
fn read_value<T: FromStr>(
    props: &Properties,
    section: &'static str,
    key: &'static str,
    target: &mut T,
) -> Result<(), ConfigError> {
    if let Some(raw) = props.get(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|_| invalid(section, key, raw, "not a valid number"))?;
    }
    Ok(())
}

/// Like [`read_value`] for non-negative finite floats.
fn read_distance(
    props: &Properties,
    section: &'static str,
    key: &'static str,
    target: &mut f64,
) -> Result<(), ConfigError> {
    let mut value = *target;
    read_value(props, section, key, &mut value)?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(section, key, &value.to_string(), "must be finite and >= 0"));
    }
    *target = value;
    Ok(())
}
