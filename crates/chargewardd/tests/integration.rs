//! Integration tests for chargewardd
//!
//! These tests drive whole evaluation cycles from a parsed configuration
//! against a scripted vehicle.

use chargeward_api::{AvailabilityState, Coordinate, ReasonCode};
use chargeward_config::{Policy, parse_config};
use chargeward_core::{CoreError, CycleEngine, PolicyResolver};
use chargeward_util::{Clock, FixedClock, LocationId};
use chargeward_vehicle_api::MockVehicle;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

const HOME: Coordinate = Coordinate::new(37.0, -122.0);

fn make_test_policy(wake_up: bool) -> Policy {
    let config = format!(
        r#"
        config_version = 1

        [vehicle]
        name = "Roadrunner"

        [settings]
        wake_poll_interval_seconds = 10
        wake_max_attempts = 6
        wake_timeout_seconds = 0

        [[locations]]
        name = "home"
        coordinates = {{ latitude = 37.0, longitude = -122.0 }}

        [[locations.schedule]]
        start = "08:00"
        end = "09:00"
        wake_up = {wake_up}
        valid_states = ["Charging"]
        "#
    );

    parse_config(&config).unwrap()
}

fn engine_at(policy: Policy, hour: u32, minute: u32) -> CycleEngine {
    let clock = FixedClock::at_local(2025, 6, 2, hour, minute).unwrap();
    CycleEngine::new(policy, Arc::new(clock))
}

#[test]
fn test_config_parsing() {
    let policy = make_test_policy(true);

    assert_eq!(policy.vehicle.name.as_deref(), Some("Roadrunner"));
    assert_eq!(policy.locations.len(), 1);
    assert_eq!(policy.settings.wake_poll_interval, Duration::from_secs(10));
    assert_eq!(policy.settings.wake_timeout, None);
    assert!(policy.locations[0].schedule[0].wake_up);
}

#[tokio::test]
async fn test_compliant_inside_window() {
    let engine = engine_at(make_test_policy(false), 8, 30);
    let vehicle = MockVehicle::online(HOME, "Charging");
    let (_tx, rx) = watch::channel(false);

    let report = engine.run_cycle(&vehicle, &rx).await.unwrap();

    assert_eq!(report.verdicts.len(), 1);
    assert_eq!(report.verdicts[0].location, LocationId::new("home"));
    assert!(report.verdicts[0].compliant);
}

#[tokio::test]
async fn test_no_applicable_schedule_after_window() {
    let engine = engine_at(make_test_policy(false), 10, 0);
    let vehicle = MockVehicle::online(HOME, "Charging");
    let (_tx, rx) = watch::channel(false);

    let report = engine.run_cycle(&vehicle, &rx).await.unwrap();

    assert!(report.verdicts.is_empty());
    assert!(matches!(
        &report.reasons[..],
        [ReasonCode::NoApplicableSchedule { .. }]
    ));
    assert_eq!(
        report.reasons[0].to_string(),
        "no applicable schedule at home"
    );
}

#[tokio::test]
async fn test_asleep_without_wake_window_is_not_woken() {
    let engine = engine_at(make_test_policy(false), 8, 30);
    let vehicle = MockVehicle::asleep(HOME, "Charging", Some(1));
    let (_tx, rx) = watch::channel(false);

    let report = engine.run_cycle(&vehicle, &rx).await.unwrap();

    assert_eq!(report.availability, AvailabilityState::Unavailable);
    assert_eq!(report.reasons, vec![ReasonCode::NoWakeEligibleSchedule]);
    assert_eq!(vehicle.wake_polls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_wake_on_third_poll() {
    let engine = engine_at(make_test_policy(true), 8, 30);
    let vehicle = MockVehicle::asleep(HOME, "Charging", Some(3));
    let (_tx, rx) = watch::channel(false);

    let started = tokio::time::Instant::now();
    let report = engine.run_cycle(&vehicle, &rx).await.unwrap();

    assert_eq!(report.availability, AvailabilityState::Online);
    assert_eq!(vehicle.wake_polls(), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(20));
    assert_eq!(report.all_compliant(), Some(true));
}

#[tokio::test(start_paused = true)]
async fn test_wake_retry_exhausted() {
    let engine = engine_at(make_test_policy(true), 8, 30);
    let vehicle = MockVehicle::asleep(HOME, "Charging", None);
    let (_tx, rx) = watch::channel(false);

    let err = engine.run_cycle(&vehicle, &rx).await.unwrap_err();

    assert!(matches!(
        err,
        CoreError::RetryExhausted {
            attempts: 6,
            last_state: AvailabilityState::Waking,
            ..
        }
    ));
    assert_eq!(vehicle.wake_polls(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_wake() {
    let engine = engine_at(make_test_policy(true), 8, 30);
    let vehicle = MockVehicle::asleep(HOME, "Charging", None);
    let (tx, rx) = watch::channel(false);

    let (report, _) = tokio::join!(engine.run_cycle(&vehicle, &rx), async {
        tokio::time::sleep(Duration::from_secs(25)).await;
        tx.send(true).unwrap();
    });

    let report = report.unwrap();
    assert_eq!(report.availability, AvailabilityState::Unavailable);
    assert_eq!(report.reasons, vec![ReasonCode::WakeCancelled { polls: 3 }]);
    assert!(report.verdicts.is_empty());
}

#[test]
fn test_position_filter_is_subset_of_time_matches() {
    let config = r#"
        config_version = 1

        [[locations]]
        name = "home"
        coordinates = { latitude = 37.0, longitude = -122.0 }

        [[locations.schedule]]
        start = "07:00"
        end = "10:00"
        valid_states = ["Charging", "Complete"]

        [[locations.schedule]]
        start = "08:00"
        end = "09:00"
        wake_up = true
        valid_states = ["Charging"]

        [[locations]]
        name = "office"
        coordinates = { latitude = 38.0, longitude = -121.0 }

        [[locations.schedule]]
        start = "08:00"
        end = "17:00"
        valid_states = ["Complete"]
    "#;
    let policy = parse_config(config).unwrap();
    let resolver = PolicyResolver::new(&policy);
    let now = FixedClock::at_local(2025, 6, 2, 8, 30).unwrap().now();

    let time_matches = resolver.resolve(&now);
    assert_eq!(time_matches.len(), 3);

    let at_home = resolver.resolve_for_position(&time_matches, &HOME);
    assert_eq!(at_home.len(), 2);
    assert!(at_home.iter().all(|m| time_matches.contains(m)));
    assert!(at_home.iter().all(|m| m.location.id.as_str() == "home"));
}
