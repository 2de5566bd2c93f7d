//! Raw configuration schema (as parsed from TOML or JSON)

use chargeward_api::Coordinate;
use serde::{Deserialize, Serialize};

/// Raw configuration as parsed from disk
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Which vehicle this configuration is about
    #[serde(default)]
    pub vehicle: RawVehicle,

    /// Evaluation tunables
    #[serde(default)]
    pub settings: RawSettings,

    /// Charging locations, in priority order
    #[serde(default)]
    pub locations: Vec<RawLocation>,
}

/// Vehicle identification
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawVehicle {
    /// Display name, used in logs and reports
    pub name: Option<String>,
}

/// Evaluation settings; every field falls back to a default
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawSettings {
    /// Geofence tolerance per axis, in degrees (default 0.000005)
    pub geofence_tolerance_degrees: Option<f64>,

    /// Delay between wake polls (default 10)
    pub wake_poll_interval_seconds: Option<u64>,

    /// Maximum number of wake polls per cycle (default 30)
    pub wake_max_attempts: Option<u32>,

    /// Overall wake deadline; 0 disables it (default 600)
    pub wake_timeout_seconds: Option<u64>,

    /// Energy price used for cost estimates (default 0.13)
    pub energy_rate_per_kwh: Option<f64>,

    /// Delay between evaluation cycles (default 900)
    pub cycle_interval_seconds: Option<u64>,
}

/// Raw location definition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawLocation {
    /// Optional name; defaults to the location's position in the list
    pub name: Option<String>,

    /// Where the vehicle parks
    pub coordinates: Coordinate,

    /// Charging windows for this location
    #[serde(default)]
    pub schedule: Vec<RawScheduleEntry>,
}

/// Raw schedule window
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawScheduleEntry {
    /// Start time (HH:MM format)
    pub start: String,

    /// End time (HH:MM format)
    pub end: String,

    /// Whether this window may wake a sleeping vehicle
    #[serde(default)]
    pub wake_up: bool,

    /// Charging states considered compliant during this window
    pub valid_states: Vec<String>,
}
