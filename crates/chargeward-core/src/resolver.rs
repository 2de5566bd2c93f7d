//! Policy resolution: which (location, window) pairs apply

use chargeward_api::Coordinate;
use chargeward_config::{Location, Policy, ScheduleEntry};
use chrono::{DateTime, Local};

use crate::{GeofenceIndex, ScheduleWindowMatcher};

/// A location together with one of its active schedule entries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyMatch<'a> {
    pub location: &'a Location,
    pub entry: &'a ScheduleEntry,
}

/// Resolves the applicable charging policy in two phases
///
/// [`resolve`](Self::resolve) needs only the time and decides whether the
/// vehicle may be woken. [`resolve_for_position`](Self::resolve_for_position)
/// narrows that result once the vehicle has reported where it is.
#[derive(Debug, Clone, Copy)]
pub struct PolicyResolver<'a> {
    policy: &'a Policy,
    geofence: GeofenceIndex<'a>,
}

impl<'a> PolicyResolver<'a> {
    pub fn new(policy: &'a Policy) -> Self {
        Self {
            policy,
            geofence: GeofenceIndex::new(&policy.locations, policy.settings.geofence_tolerance),
        }
    }

    /// Every active (location, window) pair at `now`, regardless of position
    pub fn resolve(&self, now: &DateTime<Local>) -> Vec<PolicyMatch<'a>> {
        self.policy
            .locations
            .iter()
            .flat_map(|location| {
                ScheduleWindowMatcher::active_windows(location, now)
                    .into_iter()
                    .map(move |entry| PolicyMatch { location, entry })
            })
            .collect()
    }

    /// The subset of `matches` whose location contains `position`
    ///
    /// Order and duplicates of `matches` are preserved.
    pub fn resolve_for_position(
        &self,
        matches: &[PolicyMatch<'a>],
        position: &Coordinate,
    ) -> Vec<PolicyMatch<'a>> {
        matches
            .iter()
            .filter(|m| self.geofence.contains(m.location, position))
            .copied()
            .collect()
    }

    /// Locations containing `position`
    pub fn locate(&self, position: &Coordinate) -> Vec<&'a Location> {
        self.geofence.locate(position)
    }
}

/// Whether any match authorizes waking the vehicle
pub fn any_wake_eligible(matches: &[PolicyMatch<'_>]) -> bool {
    matches.iter().any(|m| m.entry.wake_up)
}
