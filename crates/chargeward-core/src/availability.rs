//! Vehicle availability state machine

use chargeward_api::{AvailabilityState, ReasonCode};
use chargeward_config::EvaluationSettings;
use chargeward_vehicle_api::VehicleClient;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::{CoreError, CoreResult, PolicyMatch, any_wake_eligible};

/// How an availability run ended
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityOutcome {
    /// Terminal state: `Online` or `Unavailable`
    pub state: AvailabilityState,
    /// Wake polls issued
    pub polls: u32,
    /// Why the vehicle is unavailable, if it is
    pub reason: Option<ReasonCode>,
}

/// Brings the vehicle online when the active policy allows it
///
/// `Unknown -> Online` when the vehicle is already awake. Otherwise
/// `Unknown -> Offline`, then `Waking` only if a matched window has
/// `wake_up` set, else `Unavailable`. While waking, each poll is one
/// `request_wake` call; polls are spaced by the poll interval and bounded
/// by the attempt budget and the optional overall timeout.
#[derive(Debug)]
pub struct VehicleAvailabilityController {
    poll_interval: Duration,
    max_attempts: u32,
    timeout: Option<Duration>,
    state: AvailabilityState,
    polls: u32,
}

impl VehicleAvailabilityController {
    pub fn new(settings: &EvaluationSettings) -> Self {
        Self {
            poll_interval: settings.wake_poll_interval,
            max_attempts: settings.wake_max_attempts,
            timeout: settings.wake_timeout,
            state: AvailabilityState::Unknown,
            polls: 0,
        }
    }

    pub fn state(&self) -> AvailabilityState {
        self.state
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Run the state machine to a terminal state
    ///
    /// `matches` are the time-only policy matches for this cycle. Setting
    /// `cancel` to `true` stops a wake in progress; the controller then
    /// ends `Unavailable` rather than failing.
    pub async fn ensure_online(
        &mut self,
        client: &dyn VehicleClient,
        matches: &[PolicyMatch<'_>],
        cancel: &watch::Receiver<bool>,
    ) -> CoreResult<AvailabilityOutcome> {
        let connectivity = client
            .connectivity()
            .await
            .map_err(|source| self.upstream(source))?;

        if connectivity.is_online() {
            self.transition(AvailabilityState::Online);
            return Ok(self.outcome(None));
        }

        self.transition(AvailabilityState::Offline);

        if !any_wake_eligible(matches) {
            info!(
                vehicle = client.display_name(),
                active_windows = matches.len(),
                "Vehicle is asleep and no active window allows waking it"
            );
            self.transition(AvailabilityState::Unavailable);
            return Ok(self.outcome(Some(ReasonCode::NoWakeEligibleSchedule)));
        }

        self.transition(AvailabilityState::Waking);
        self.wake(client, cancel.clone()).await
    }

    async fn wake(
        &mut self,
        client: &dyn VehicleClient,
        mut cancel: watch::Receiver<bool>,
    ) -> CoreResult<AvailabilityOutcome> {
        let started = Instant::now();
        let deadline = self.timeout.map(|t| started + t);

        info!(
            vehicle = client.display_name(),
            max_attempts = self.max_attempts,
            interval_secs = self.poll_interval.as_secs(),
            "Waking vehicle"
        );

        loop {
            if *cancel.borrow_and_update() {
                return Ok(self.cancelled());
            }

            self.polls += 1;
            match client.request_wake().await {
                Ok(()) => {
                    info!(polls = self.polls, "Vehicle is online");
                    self.transition(AvailabilityState::Online);
                    return Ok(self.outcome(None));
                }
                Err(e) if e.is_transient() => {
                    debug!(poll = self.polls, error = %e, "Vehicle not awake yet");
                }
                Err(source) => return Err(self.upstream(source)),
            }

            let next_poll = Instant::now() + self.poll_interval;
            if self.polls >= self.max_attempts || deadline.is_some_and(|d| next_poll > d) {
                let elapsed = started.elapsed();
                warn!(
                    polls = self.polls,
                    elapsed_secs = elapsed.as_secs(),
                    "Vehicle did not wake within the retry budget"
                );
                return Err(CoreError::RetryExhausted {
                    attempts: self.polls,
                    elapsed,
                    last_state: self.state,
                });
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = cancellation(&mut cancel) => {
                    return Ok(self.cancelled());
                }
            }
        }
    }

    fn transition(&mut self, to: AvailabilityState) {
        debug!(from = %self.state, to = %to, "Availability transition");
        self.state = to;
    }

    fn cancelled(&mut self) -> AvailabilityOutcome {
        info!(polls = self.polls, "Wake cancelled");
        self.transition(AvailabilityState::Unavailable);
        self.outcome(Some(ReasonCode::WakeCancelled { polls: self.polls }))
    }

    fn outcome(&self, reason: Option<ReasonCode>) -> AvailabilityOutcome {
        AvailabilityOutcome {
            state: self.state,
            polls: self.polls,
            reason,
        }
    }

    fn upstream(&self, source: chargeward_vehicle_api::VehicleError) -> CoreError {
        warn!(state = %self.state, polls = self.polls, error = %source, "Vehicle client failed");
        CoreError::Upstream {
            state: self.state,
            attempts: self.polls,
            source,
        }
    }
}

/// Resolves once cancellation is requested. Never resolves if the sender
/// is gone without having requested it.
async fn cancellation(cancel: &mut watch::Receiver<bool>) {
    loop {
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
        if *cancel.borrow_and_update() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chargeward_api::{ChargingState, Coordinate};
    use chargeward_config::{Location, ScheduleEntry};
    use chargeward_util::{LocationId, TimeWindow, WallClock};
    use chargeward_vehicle_api::{MockVehicle, VehicleError};

    const HOME: Coordinate = Coordinate::new(37.0, -122.0);

    fn home(wake_up: bool) -> Location {
        Location {
            id: LocationId::new("home"),
            coordinates: HOME,
            schedule: vec![ScheduleEntry::new(
                TimeWindow::new(WallClock::new(8, 0).unwrap(), WallClock::new(9, 0).unwrap()),
                wake_up,
                [ChargingState::from("Charging")],
            )],
        }
    }

    fn settings(max_attempts: u32, timeout: Option<Duration>) -> EvaluationSettings {
        EvaluationSettings {
            wake_poll_interval: Duration::from_secs(10),
            wake_max_attempts: max_attempts,
            wake_timeout: timeout,
            ..Default::default()
        }
    }

    fn active(location: &Location) -> Vec<PolicyMatch<'_>> {
        vec![PolicyMatch {
            location,
            entry: &location.schedule[0],
        }]
    }

    #[tokio::test]
    async fn online_vehicle_needs_no_wake() {
        let location = home(false);
        let vehicle = MockVehicle::online(HOME, "Charging");
        let (_tx, rx) = watch::channel(false);

        let mut controller = VehicleAvailabilityController::new(&settings(5, None));
        let outcome = controller
            .ensure_online(&vehicle, &active(&location), &rx)
            .await
            .unwrap();

        assert_eq!(outcome.state, AvailabilityState::Online);
        assert_eq!(outcome.polls, 0);
        assert_eq!(vehicle.wake_polls(), 0);
    }

    #[tokio::test]
    async fn asleep_without_wake_window_is_unavailable() {
        let location = home(false);
        let vehicle = MockVehicle::asleep(HOME, "Stopped", Some(1));
        let (_tx, rx) = watch::channel(false);

        let mut controller = VehicleAvailabilityController::new(&settings(5, None));
        let outcome = controller
            .ensure_online(&vehicle, &active(&location), &rx)
            .await
            .unwrap();

        assert_eq!(outcome.state, AvailabilityState::Unavailable);
        assert_eq!(outcome.reason, Some(ReasonCode::NoWakeEligibleSchedule));
        assert_eq!(vehicle.wake_polls(), 0);

        // No active windows at all behaves the same
        let mut controller = VehicleAvailabilityController::new(&settings(5, None));
        let outcome = controller.ensure_online(&vehicle, &[], &rx).await.unwrap();
        assert_eq!(outcome.state, AvailabilityState::Unavailable);
        assert_eq!(vehicle.wake_polls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn wake_polls_are_spaced_by_interval() {
        let location = home(true);
        let vehicle = MockVehicle::asleep(HOME, "Charging", Some(3));
        let (_tx, rx) = watch::channel(false);

        let started = Instant::now();
        let mut controller = VehicleAvailabilityController::new(&settings(30, None));
        let outcome = controller
            .ensure_online(&vehicle, &active(&location), &rx)
            .await
            .unwrap();

        assert_eq!(outcome.state, AvailabilityState::Online);
        assert_eq!(outcome.polls, 3);
        assert_eq!(vehicle.wake_polls(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn attempts_are_bounded() {
        let location = home(true);
        let vehicle = MockVehicle::asleep(HOME, "Stopped", None);
        let (_tx, rx) = watch::channel(false);

        let mut controller = VehicleAvailabilityController::new(&settings(4, None));
        let err = controller
            .ensure_online(&vehicle, &active(&location), &rx)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CoreError::RetryExhausted {
                attempts: 4,
                last_state: AvailabilityState::Waking,
                ..
            }
        ));
        assert_eq!(vehicle.wake_polls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_bounds_polls() {
        let location = home(true);
        let vehicle = MockVehicle::asleep(HOME, "Stopped", None);
        let (_tx, rx) = watch::channel(false);

        let mut controller =
            VehicleAvailabilityController::new(&settings(100, Some(Duration::from_secs(25))));
        let err = controller
            .ensure_online(&vehicle, &active(&location), &rx)
            .await
            .unwrap_err();

        match err {
            CoreError::RetryExhausted {
                attempts, elapsed, ..
            } => {
                assert_eq!(attempts, 3);
                assert_eq!(elapsed, Duration::from_secs(20));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_sleep() {
        let location = home(true);
        let vehicle = MockVehicle::asleep(HOME, "Stopped", None);
        let (tx, rx) = watch::channel(false);
        let matched = active(&location);

        let mut controller = VehicleAvailabilityController::new(&settings(30, None));
        let (outcome, _) = tokio::join!(controller.ensure_online(&vehicle, &matched, &rx), async {
            tokio::time::sleep(Duration::from_secs(15)).await;
            tx.send(true).unwrap();
        });

        let outcome = outcome.unwrap();
        assert_eq!(outcome.state, AvailabilityState::Unavailable);
        assert_eq!(outcome.reason, Some(ReasonCode::WakeCancelled { polls: 2 }));
        assert_eq!(vehicle.wake_polls(), 2);
    }

    #[tokio::test]
    async fn cancelled_before_first_poll() {
        let location = home(true);
        let vehicle = MockVehicle::asleep(HOME, "Stopped", Some(1));
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let mut controller = VehicleAvailabilityController::new(&settings(30, None));
        let outcome = controller
            .ensure_online(&vehicle, &active(&location), &rx)
            .await
            .unwrap();

        assert_eq!(outcome.reason, Some(ReasonCode::WakeCancelled { polls: 0 }));
        assert_eq!(vehicle.wake_polls(), 0);
    }

    #[tokio::test]
    async fn non_transient_errors_propagate() {
        let location = home(true);
        let vehicle = MockVehicle::asleep(HOME, "Stopped", None);
        let (_tx, rx) = watch::channel(false);

        // Probe fails
        vehicle.set_failure(Some(VehicleError::Unauthorized));
        let mut controller = VehicleAvailabilityController::new(&settings(30, None));
        let err = controller
            .ensure_online(&vehicle, &active(&location), &rx)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Upstream {
                state: AvailabilityState::Unknown,
                attempts: 0,
                source: VehicleError::Unauthorized,
            }
        ));
    }
}
