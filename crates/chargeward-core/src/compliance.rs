//! Charge compliance verdicts

use chargeward_api::{ChargingState, VerdictView};
use chargeward_config::{Location, ScheduleEntry};

use crate::PolicyMatch;

/// Whether the observed charging state satisfies one matched window
#[derive(Debug, Clone, PartialEq)]
pub struct ComplianceVerdict<'a> {
    pub location: &'a Location,
    pub entry: &'a ScheduleEntry,
    pub observed: ChargingState,
    pub compliant: bool,
}

impl ComplianceVerdict<'_> {
    /// Owned view for reports
    pub fn to_view(&self) -> VerdictView {
        VerdictView {
            location: self.location.id.clone(),
            window: self.entry.window,
            wake_up: self.entry.wake_up,
            valid_states: self.entry.valid_states.clone(),
            observed_state: self.observed.clone(),
            compliant: self.compliant,
        }
    }
}

/// Compares observed charging state against matched windows
#[derive(Debug, Clone, Copy, Default)]
pub struct ChargeComplianceEvaluator;

impl ChargeComplianceEvaluator {
    /// One verdict per match, in match order, duplicates included
    pub fn evaluate<'a>(
        matches: &[PolicyMatch<'a>],
        observed: &ChargingState,
    ) -> Vec<ComplianceVerdict<'a>> {
        matches
            .iter()
            .map(|m| ComplianceVerdict {
                location: m.location,
                entry: m.entry,
                observed: observed.clone(),
                compliant: m.entry.allows(observed),
            })
            .collect()
    }
}

/// True when every verdict is compliant (vacuously true for none)
pub fn all_compliant(verdicts: &[ComplianceVerdict<'_>]) -> bool {
    verdicts.iter().all(|v| v.compliant)
}

/// True when at least one verdict is compliant
pub fn any_compliant(verdicts: &[ComplianceVerdict<'_>]) -> bool {
    verdicts.iter().any(|v| v.compliant)
}
