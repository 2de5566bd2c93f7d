//! Time-of-day matching of charging windows

use chargeward_config::{Location, ScheduleEntry};
use chrono::{DateTime, Local};

/// Finds the schedule entries whose window is active at a given instant
///
/// Windows are open at both ends and compared by minute: an entry
/// `08:00-09:00` is active from 08:01:00 up to 08:59:59.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleWindowMatcher;

impl ScheduleWindowMatcher {
    /// Active entries of `location` at `now`, in configuration order
    pub fn active_windows<'a>(
        location: &'a Location,
        now: &DateTime<Local>,
    ) -> Vec<&'a ScheduleEntry> {
        location
            .schedule
            .iter()
            .filter(|entry| entry.window.contains(now))
            .collect()
    }
}
