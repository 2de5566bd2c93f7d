//! chargewardd - The chargeward background service
//!
//! This is the main entry point for the chargewardd service.
//! It wires together all the components:
//! - Configuration loading
//! - Vehicle client (snapshot file)
//! - Cycle engine
//! - Periodic evaluation and signal handling
//! - One-off vehicle commands in single-cycle mode

mod snapshot;

use anyhow::{Context, Result};
use chargeward_api::{AvailabilityState, CycleReport};
use chargeward_config::load_config;
use chargeward_core::{CoreResult, CycleEngine, VehicleCommand, send_command};
use chargeward_util::{
    SystemClock, default_config_path, default_snapshot_path, format_duration,
    is_mock_time_active,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::snapshot::SnapshotVehicle;

/// chargewardd - Charging policy compliance service
#[derive(Parser, Debug)]
#[command(name = "chargewardd")]
#[command(about = "Checks that a vehicle charges where and when it should", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/chargeward/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Vehicle snapshot file (or set CHARGEWARD_VEHICLE_SNAPSHOT env var)
    #[arg(short = 's', long, env = "CHARGEWARD_VEHICLE_SNAPSHOT", default_value_os_t = default_snapshot_path())]
    vehicle_snapshot: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Run a single cycle, print its report as JSON and exit
    #[arg(long)]
    once: bool,

    /// After the cycle, set the charge limit to this percentage
    #[arg(short = 'c', long, value_name = "PERCENT", requires = "once",
          value_parser = clap::value_parser!(u8).range(1..=100))]
    set_charge_limit: Option<u8>,

    /// After the cycle, cancel a pending software update
    #[arg(short = 'd', long, requires = "once")]
    cancel_update: bool,
}

impl Args {
    fn commands(&self) -> Vec<VehicleCommand> {
        let mut commands = Vec::new();
        if let Some(percent) = self.set_charge_limit {
            commands.push(VehicleCommand::SetChargeLimit { percent });
        }
        if self.cancel_update {
            commands.push(VehicleCommand::CancelSoftwareUpdate);
        }
        commands
    }
}

/// Main service state
struct Service {
    engine: CycleEngine,
    vehicle: SnapshotVehicle,
    cycle_interval: Duration,
    commands: Vec<VehicleCommand>,
}

impl Service {
    fn new(args: &Args) -> Result<Self> {
        // Load configuration
        let policy = load_config(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;

        info!(
            config_path = %args.config.display(),
            locations = policy.locations.len(),
            windows = policy.window_count(),
            "Configuration loaded"
        );

        if is_mock_time_active() {
            warn!("Mock time is active, windows are evaluated against a shifted clock");
        }

        let name = policy
            .vehicle
            .name
            .clone()
            .unwrap_or_else(|| "vehicle".to_string());
        let vehicle = SnapshotVehicle::new(&args.vehicle_snapshot, name);
        info!(snapshot = %vehicle.path().display(), "Vehicle client initialized");

        let cycle_interval = policy.settings.cycle_interval;
        let engine = CycleEngine::new(policy, Arc::new(SystemClock));

        Ok(Self {
            engine,
            vehicle,
            cycle_interval,
            commands: args.commands(),
        })
    }

    /// Run one cycle and print its report
    async fn run_once(&self) -> Result<()> {
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        let report = self
            .engine
            .run_cycle(&self.vehicle, &cancel_rx)
            .await
            .context("Evaluation cycle failed")?;

        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json);

        if self.commands.is_empty() {
            return Ok(());
        }
        if report.availability != AvailabilityState::Online {
            warn!(
                availability = %report.availability,
                commands = self.commands.len(),
                "Vehicle is not online, skipping commands"
            );
            return Ok(());
        }
        for command in &self.commands {
            send_command(&self.vehicle, *command)
                .await
                .with_context(|| format!("Failed to {}", command))?;
        }
        Ok(())
    }

    async fn run(self) -> Result<()> {
        let (cancel_tx, mut cancel_rx) = watch::channel(false);

        // Set up signal handlers
        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;

        // Signals flip the cancel channel so a wake in progress ends promptly
        tokio::spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => info!("Received SIGTERM, shutting down gracefully"),
                _ = sigint.recv() => info!("Received SIGINT, shutting down gracefully"),
            }
            let _ = cancel_tx.send(true);
        });

        let mut cycle_timer = tokio::time::interval(self.cycle_interval);
        cycle_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            interval = %format_duration(self.cycle_interval),
            "Service running"
        );

        loop {
            tokio::select! {
                _ = shutdown_requested(&mut cancel_rx) => break,

                _ = cycle_timer.tick() => {
                    let result = self.engine.run_cycle(&self.vehicle, &cancel_rx).await;
                    log_cycle(&result);

                    if *cancel_rx.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Shutdown complete");
        Ok(())
    }
}

/// Resolves once shutdown has been requested
async fn shutdown_requested(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

fn log_cycle(result: &CoreResult<CycleReport>) {
    match result {
        Ok(report) => {
            let violations = report.violations().count();
            if violations > 0 {
                warn!(
                    cycle_id = %report.cycle_id,
                    violations,
                    verdicts = report.verdicts.len(),
                    "Cycle finished with violations"
                );
            } else {
                info!(
                    cycle_id = %report.cycle_id,
                    availability = %report.availability,
                    verdicts = report.verdicts.len(),
                    reasons = report.reasons.len(),
                    "Cycle finished"
                );
            }
        }
        Err(e) => {
            error!(
                error = %e,
                state = %e.last_state(),
                attempts = e.attempts(),
                "Cycle aborted"
            );
        }
    }
}


#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "chargewardd starting"
    );

    // Create and run the service
    let service = Service::new(&args)?;
    if args.once {
        service.run_once().await
    } else {
        service.run().await
    }
}
