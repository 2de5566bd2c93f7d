//! Telemetry and state types shared across chargeward crates

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// A geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both axes differ from `other` by strictly less than `tolerance` degrees
    pub fn within(&self, other: &Coordinate, tolerance: f64) -> bool {
        (self.latitude - other.latitude).abs() < tolerance
            && (self.longitude - other.longitude).abs() < tolerance
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Charging state label as reported by the vehicle
///
/// Labels are compared literally (`"Charging"` and `"charging"` differ).
/// Well-known labels are provided as constants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChargingState(String);

impl ChargingState {
    pub const CHARGING: &'static str = "Charging";
    pub const COMPLETE: &'static str = "Complete";
    pub const DISCONNECTED: &'static str = "Disconnected";
    pub const STOPPED: &'static str = "Stopped";
    pub const STARTING: &'static str = "Starting";
    pub const NO_POWER: &'static str = "NoPower";

    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether energy is flowing or the session just finished
    pub fn is_charging_or_complete(&self) -> bool {
        self.0 == Self::CHARGING || self.0 == Self::COMPLETE
    }
}

impl fmt::Display for ChargingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ChargingState {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ChargingState {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for ChargingState {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Connectivity as reported by the vehicle service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    Online,
    Asleep,
    Unknown,
}

impl Connectivity {
    pub fn is_online(&self) -> bool {
        matches!(self, Connectivity::Online)
    }
}

/// Vehicle availability state machine
///
/// `Unknown -> Offline -> Waking -> Online`, with `Unavailable` as the
/// terminal state when the vehicle cannot or may not be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityState {
    Unknown,
    Offline,
    Waking,
    Online,
    Unavailable,
}

impl AvailabilityState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AvailabilityState::Online | AvailabilityState::Unavailable)
    }
}

impl fmt::Display for AvailabilityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AvailabilityState::Unknown => "unknown",
            AvailabilityState::Offline => "offline",
            AvailabilityState::Waking => "waking",
            AvailabilityState::Online => "online",
            AvailabilityState::Unavailable => "unavailable",
        };
        f.write_str(s)
    }
}

/// Detailed charge figures, when the vehicle client can provide them
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChargeDetails {
    /// State of charge, percent
    pub battery_level: f64,
    /// Estimated range, miles
    pub battery_range: f64,
    /// Configured charge limit, percent
    pub charge_limit_soc: u8,
    /// Charging speed as reported (miles of range per hour)
    #[serde(default)]
    pub charge_rate: f64,
    /// Energy added in the current session, kWh
    #[serde(default)]
    pub charge_energy_added: f64,
    /// Ideal-range miles added in the current session
    #[serde(default)]
    pub charge_miles_added_ideal: f64,
    /// Amperes
    #[serde(default)]
    pub charger_actual_current: f64,
    /// Volts
    #[serde(default)]
    pub charger_voltage: f64,
}

/// Firmware and software update state
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SoftwareStatus {
    pub firmware_version: String,
    /// Pending update status label (e.g. `"available"`, `"scheduled"`); absent when none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_status: Option<String>,
    /// Expected installation time of the pending update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_expected_duration_secs: Option<u64>,
}

impl SoftwareStatus {
    pub fn update_pending(&self) -> bool {
        self.update_status.as_deref().is_some_and(|s| !s.is_empty())
    }
}
