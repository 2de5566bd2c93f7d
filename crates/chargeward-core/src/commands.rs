//! One-off commands sent to an online vehicle

use chargeward_api::AvailabilityState;
use chargeward_vehicle_api::VehicleClient;
use std::fmt;
use tracing::{info, warn};

use crate::{CoreError, CoreResult};

/// A user-requested change to the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleCommand {
    /// Set the charge limit, in percent
    SetChargeLimit { percent: u8 },
    CancelSoftwareUpdate,
}

impl fmt::Display for VehicleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleCommand::SetChargeLimit { percent } => write!(f, "set charge limit to {}%", percent),
            VehicleCommand::CancelSoftwareUpdate => f.write_str("cancel software update"),
        }
    }
}

/// Send `command` to a vehicle that is already online
///
/// Failures are not retried.
pub async fn send_command(client: &dyn VehicleClient, command: VehicleCommand) -> CoreResult<()> {
    info!(vehicle = client.display_name(), %command, "Sending command");

    let result = match command {
        VehicleCommand::SetChargeLimit { percent } => client.set_charge_limit(percent).await,
        VehicleCommand::CancelSoftwareUpdate => client.cancel_software_update().await,
    };

    result.map_err(|source| {
        warn!(%command, error = %source, "Command failed");
        CoreError::Upstream {
            state: AvailabilityState::Online,
            attempts: 0,
            source,
        }
    })
}
