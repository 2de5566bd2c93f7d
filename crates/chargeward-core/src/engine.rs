//! Per-cycle evaluation engine

use chargeward_api::{AvailabilityState, CycleReport, REPORT_VERSION, ReasonCode};
use chargeward_config::Policy;
use chargeward_util::{Clock, CycleId, format_datetime_full};
use chargeward_vehicle_api::{VehicleClient, VehicleError};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    ChargeComplianceEvaluator, CoreError, CoreResult, PolicyResolver,
    VehicleAvailabilityController, summarize_charge,
};

/// Runs evaluation cycles against a fixed policy
pub struct CycleEngine {
    policy: Policy,
    clock: Arc<dyn Clock>,
}

impl CycleEngine {
    pub fn new(policy: Policy, clock: Arc<dyn Clock>) -> Self {
        info!(
            vehicle = policy.vehicle.name.as_deref().unwrap_or("-"),
            locations = policy.locations.len(),
            windows = policy.window_count(),
            "Cycle engine initialized"
        );

        Self { policy, clock }
    }

    /// Get current policy
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Run one evaluation cycle
    ///
    /// Policies that do not apply produce a report with reasons and no
    /// verdicts. Only retry exhaustion and client failures are errors.
    pub async fn run_cycle(
        &self,
        client: &dyn VehicleClient,
        cancel: &watch::Receiver<bool>,
    ) -> CoreResult<CycleReport> {
        let cycle_id = CycleId::new();
        let now = self.clock.now();
        info!(
            %cycle_id,
            vehicle = client.display_name(),
            at = %format_datetime_full(&now),
            "Starting evaluation cycle"
        );

        let resolver = PolicyResolver::new(&self.policy);
        let time_matches = resolver.resolve(&now);
        debug!(%cycle_id, active_windows = time_matches.len(), "Resolved active windows");

        let mut controller = VehicleAvailabilityController::new(&self.policy.settings);
        let outcome = controller
            .ensure_online(client, &time_matches, cancel)
            .await?;

        let mut report = CycleReport {
            report_version: REPORT_VERSION,
            cycle_id,
            vehicle: self.policy.vehicle.name.clone(),
            evaluated_at: now,
            availability: outcome.state,
            wake_polls: outcome.polls,
            position: None,
            charging_state: None,
            verdicts: Vec::new(),
            reasons: outcome.reason.into_iter().collect(),
            charge: None,
            software: None,
        };

        if outcome.state != AvailabilityState::Online {
            info!(%cycle_id, availability = %outcome.state, "Vehicle unavailable, nothing to evaluate");
            return Ok(report);
        }

        let polls = outcome.polls;
        let upstream = move |source: VehicleError| CoreError::Upstream {
            state: AvailabilityState::Online,
            attempts: polls,
            source,
        };

        let position = client.position().await.map_err(upstream)?;
        let observed = client.charging_state().await.map_err(upstream)?;
        debug!(%cycle_id, %position, state = %observed, "Fetched telemetry");

        match client.charge_details().await {
            Ok(Some(details)) => {
                report.charge = Some(summarize_charge(
                    &details,
                    &observed,
                    self.policy.settings.energy_rate_per_kwh,
                ));
            }
            Ok(None) => {}
            Err(e) => {
                warn!(%cycle_id, error = %e, "Failed to fetch charge details");
            }
        }

        match client.software_status().await {
            Ok(Some(status)) => {
                if status.update_pending() {
                    warn!(
                        %cycle_id,
                        firmware = %status.firmware_version,
                        update = status.update_status.as_deref().unwrap_or_default(),
                        expected_duration_secs = status.update_expected_duration_secs,
                        "Software update pending"
                    );
                } else {
                    debug!(%cycle_id, firmware = %status.firmware_version, "Software up to date");
                }
                report.software = Some(status);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(%cycle_id, error = %e, "Failed to fetch software status");
            }
        }

        let located = resolver.locate(&position);
        let matches = resolver.resolve_for_position(&time_matches, &position);

        if located.is_empty() {
            report.reasons.push(ReasonCode::NoApplicableLocation { position });
        } else if matches.is_empty() {
            report.reasons.push(ReasonCode::NoApplicableSchedule {
                locations: located.iter().map(|l| l.id.clone()).collect(),
            });
        }

        let verdicts = ChargeComplianceEvaluator::evaluate(&matches, &observed);
        for verdict in &verdicts {
            if verdict.compliant {
                info!(
                    %cycle_id,
                    location = %verdict.location.id,
                    window = %verdict.entry.window,
                    state = %observed,
                    "Charging state compliant"
                );
            } else {
                warn!(
                    %cycle_id,
                    location = %verdict.location.id,
                    window = %verdict.entry.window,
                    state = %observed,
                    "Charging state not compliant"
                );
            }
        }

        for reason in &report.reasons {
            info!(%cycle_id, %reason, "No verdict");
        }

        report.position = Some(position);
        report.charging_state = Some(observed);
        report.verdicts = verdicts.iter().map(|v| v.to_view()).collect();

        Ok(report)
    }
}
