//! Vehicle client trait

use async_trait::async_trait;
use chargeward_api::{ChargeDetails, ChargingState, Connectivity, Coordinate, SoftwareStatus};
use thiserror::Error;

/// Errors from vehicle client operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VehicleError {
    /// The wake request was accepted but the vehicle is not online yet
    #[error("Vehicle is not awake yet")]
    NotYetAwake,

    #[error("Vehicle is not online")]
    NotOnline,

    #[error("Not authorized to access the vehicle")]
    Unauthorized,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response ({status}): {reason}")]
    UnexpectedResponse { status: u16, reason: String },

    #[error("Operation not supported: {0}")]
    Unsupported(&'static str),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl VehicleError {
    /// Whether retrying the same call later may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, VehicleError::NotYetAwake)
    }
}

pub type VehicleResult<T> = Result<T, VehicleError>;

/// Vehicle client trait - implemented by transports and test doubles
#[async_trait]
pub trait VehicleClient: Send + Sync {
    /// Name used in log output
    fn display_name(&self) -> &str;

    /// Current connectivity, without waking the vehicle
    async fn connectivity(&self) -> VehicleResult<Connectivity>;

    /// Ask the vehicle to wake up.
    ///
    /// Idempotent. Returns `Ok(())` once the vehicle is online and
    /// [`VehicleError::NotYetAwake`] while it is still waking.
    async fn request_wake(&self) -> VehicleResult<()>;

    /// Current position. Fails when the vehicle is not online.
    async fn position(&self) -> VehicleResult<Coordinate>;

    /// Current charging state. Fails when the vehicle is not online.
    async fn charging_state(&self) -> VehicleResult<ChargingState>;

    /// Optional: detailed charge figures (if supported)
    async fn charge_details(&self) -> VehicleResult<Option<ChargeDetails>> {
        Ok(None)
    }

    /// Optional: firmware version and pending update (if supported)
    async fn software_status(&self) -> VehicleResult<Option<SoftwareStatus>> {
        Ok(None)
    }

    /// Optional: change the charge limit, in percent (if supported)
    async fn set_charge_limit(&self, _percent: u8) -> VehicleResult<()> {
        Err(VehicleError::Unsupported("set_charge_limit"))
    }

    /// Optional: cancel a scheduled software update (if supported)
    async fn cancel_software_update(&self) -> VehicleResult<()> {
        Err(VehicleError::Unsupported("cancel_software_update"))
    }
}
