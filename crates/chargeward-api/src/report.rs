//! Per-cycle compliance report

use chargeward_util::{CycleId, LocationId, TimeWindow};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::{AvailabilityState, ChargingState, Coordinate, SoftwareStatus};

/// Structured reasons why a cycle produced no (or fewer) verdicts
///
/// None of these are failures: they describe a policy that simply does not
/// apply right now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ReasonCode {
    /// The vehicle is outside every configured location
    NoApplicableLocation { position: Coordinate },
    /// The vehicle is at a configured location but no window is active
    NoApplicableSchedule { locations: Vec<LocationId> },
    /// The vehicle is asleep and no active window allows waking it
    NoWakeEligibleSchedule,
    /// Waking was cancelled before the vehicle came online
    WakeCancelled { polls: u32 },
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReasonCode::NoApplicableLocation { position } => {
                write!(f, "no applicable location for position {}", position)
            }
            ReasonCode::NoApplicableSchedule { locations } => {
                let names: Vec<&str> = locations.iter().map(LocationId::as_str).collect();
                write!(f, "no applicable schedule at {}", names.join(", "))
            }
            ReasonCode::NoWakeEligibleSchedule => {
                f.write_str("no schedule authorizes waking the vehicle")
            }
            ReasonCode::WakeCancelled { polls } => {
                write!(f, "wake cancelled after {} poll(s)", polls)
            }
        }
    }
}

/// One compliance verdict, detached from the policy it was computed from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictView {
    pub location: LocationId,
    pub window: TimeWindow,
    pub wake_up: bool,
    pub valid_states: BTreeSet<ChargingState>,
    pub observed_state: ChargingState,
    pub compliant: bool,
}

/// Charge statistics derived from the vehicle's charge details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeSummary {
    pub battery_level: f64,
    pub battery_range: f64,
    /// Range at 100%, extrapolated from the current level
    pub theoretical_max_range: Option<f64>,
    pub charge_limit_soc: u8,
    /// Only while charging or complete
    pub range_at_session_start: Option<f64>,
    pub energy_added_kwh: Option<f64>,
    pub energy_cost: Option<f64>,
    pub energy_rate_per_kwh: f64,
    pub charger_actual_current: Option<f64>,
    pub charger_voltage: Option<f64>,
}

/// Everything one evaluation cycle found out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub report_version: u32,
    pub cycle_id: CycleId,
    pub vehicle: Option<String>,
    pub evaluated_at: DateTime<Local>,
    /// Terminal state of the availability controller
    pub availability: AvailabilityState,
    pub wake_polls: u32,
    pub position: Option<Coordinate>,
    pub charging_state: Option<ChargingState>,
    pub verdicts: Vec<VerdictView>,
    #[serde(default)]
    pub reasons: Vec<ReasonCode>,
    pub charge: Option<ChargeSummary>,
    #[serde(default)]
    pub software: Option<SoftwareStatus>,
}

impl CycleReport {
    /// `Some(true)` if every verdict passed, `None` when there were no verdicts
    pub fn all_compliant(&self) -> Option<bool> {
        if self.verdicts.is_empty() {
            None
        } else {
            Some(self.verdicts.iter().all(|v| v.compliant))
        }
    }

    /// Verdicts that failed
    pub fn violations(&self) -> impl Iterator<Item = &VerdictView> {
        self.verdicts.iter().filter(|v| !v.compliant)
    }
}
