//! Validated policy structures

use crate::schema::{RawConfig, RawLocation, RawScheduleEntry, RawSettings};
use crate::validation::{location_name, parse_time};
use chargeward_api::{ChargingState, Coordinate};
use chargeward_util::{LocationId, TimeWindow, WallClock};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::warn;

/// Default geofence tolerance, roughly half a metre
pub const DEFAULT_GEOFENCE_TOLERANCE: f64 = 0.000_005;

/// Default delay between wake polls
pub const DEFAULT_WAKE_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default maximum number of wake polls per cycle
pub const DEFAULT_WAKE_MAX_ATTEMPTS: u32 = 30;

/// Default overall wake deadline
pub const DEFAULT_WAKE_TIMEOUT: Duration = Duration::from_secs(600);

/// Default energy price per kWh
pub const DEFAULT_ENERGY_RATE_PER_KWH: f64 = 0.13;

/// Default delay between evaluation cycles
pub const DEFAULT_CYCLE_INTERVAL: Duration = Duration::from_secs(900);

/// Validated policy ready for use by the core
#[derive(Debug, Clone)]
pub struct Policy {
    /// Vehicle identification
    pub vehicle: VehicleConfig,

    /// Evaluation tunables
    pub settings: EvaluationSettings,

    /// Locations in configuration order
    pub locations: Vec<Location>,
}

impl Policy {
    /// Convert from raw config. Only valid after [`validate_config`] found
    /// no errors, which [`crate::parse_config`] guarantees.
    ///
    /// [`validate_config`]: crate::validate_config
    pub(crate) fn from_raw(raw: RawConfig) -> Self {
        let locations = raw
            .locations
            .into_iter()
            .enumerate()
            .map(|(index, l)| Location::from_raw(l, index))
            .collect();

        Self {
            vehicle: VehicleConfig {
                name: raw.vehicle.name,
            },
            settings: EvaluationSettings::from_raw(&raw.settings),
            locations,
        }
    }

    /// Total number of schedule windows across all locations
    pub fn window_count(&self) -> usize {
        self.locations.iter().map(|l| l.schedule.len()).sum()
    }
}

/// Vehicle identification
#[derive(Debug, Clone, Default)]
pub struct VehicleConfig {
    pub name: Option<String>,
}

/// Tunables injected into the evaluation components
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSettings {
    /// Per-axis geofence tolerance, in degrees
    pub geofence_tolerance: f64,
    pub wake_poll_interval: Duration,
    pub wake_max_attempts: u32,
    /// Overall wake deadline. None means bounded by attempts only.
    pub wake_timeout: Option<Duration>,
    pub energy_rate_per_kwh: f64,
    pub cycle_interval: Duration,
}

impl EvaluationSettings {
    fn from_raw(raw: &RawSettings) -> Self {
        let defaults = Self::default();
        Self {
            geofence_tolerance: raw
                .geofence_tolerance_degrees
                .unwrap_or(defaults.geofence_tolerance),
            wake_poll_interval: raw
                .wake_poll_interval_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.wake_poll_interval),
            wake_max_attempts: raw.wake_max_attempts.unwrap_or(defaults.wake_max_attempts),
            // 0 means no deadline, None means use the default
            wake_timeout: match raw.wake_timeout_seconds {
                Some(0) => None,
                Some(secs) => Some(Duration::from_secs(secs)),
                None => defaults.wake_timeout,
            },
            energy_rate_per_kwh: raw
                .energy_rate_per_kwh
                .unwrap_or(defaults.energy_rate_per_kwh),
            cycle_interval: raw
                .cycle_interval_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.cycle_interval),
        }
    }
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            geofence_tolerance: DEFAULT_GEOFENCE_TOLERANCE,
            wake_poll_interval: DEFAULT_WAKE_POLL_INTERVAL,
            wake_max_attempts: DEFAULT_WAKE_MAX_ATTEMPTS,
            wake_timeout: Some(DEFAULT_WAKE_TIMEOUT),
            energy_rate_per_kwh: DEFAULT_ENERGY_RATE_PER_KWH,
            cycle_interval: DEFAULT_CYCLE_INTERVAL,
        }
    }
}

/// A named charging location
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub id: LocationId,
    pub coordinates: Coordinate,
    pub schedule: Vec<ScheduleEntry>,
}

impl Location {
    fn from_raw(raw: RawLocation, index: usize) -> Self {
        let id = LocationId::new(location_name(&raw, index));
        if raw.schedule.is_empty() {
            warn!(location = %id, "Location has no schedule and will never apply");
        }

        Self {
            id,
            coordinates: raw.coordinates,
            schedule: raw.schedule.into_iter().map(ScheduleEntry::from_raw).collect(),
        }
    }
}

/// A charging window at a location
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry {
    pub window: TimeWindow,
    /// This window authorizes waking a sleeping vehicle
    pub wake_up: bool,
    /// Charging states considered compliant while the window is active
    pub valid_states: BTreeSet<ChargingState>,
}

impl ScheduleEntry {
    pub fn new(
        window: TimeWindow,
        wake_up: bool,
        valid_states: impl IntoIterator<Item = ChargingState>,
    ) -> Self {
        Self {
            window,
            wake_up,
            valid_states: valid_states.into_iter().collect(),
        }
    }

    /// Literal membership of `state` in the allowed set
    pub fn allows(&self, state: &ChargingState) -> bool {
        self.valid_states.contains(state)
    }

    fn from_raw(raw: RawScheduleEntry) -> Self {
        // Times are validated before conversion
        let start = parse_time(&raw.start).unwrap_or(WallClock { hour: 0, minute: 0 });
        let end = parse_time(&raw.end).unwrap_or(WallClock { hour: 0, minute: 0 });

        Self {
            window: TimeWindow::new(start, end),
            wake_up: raw.wake_up,
            valid_states: raw.valid_states.into_iter().map(ChargingState::from).collect(),
        }
    }
}
