//! Mock vehicle client for testing

use async_trait::async_trait;
use chargeward_api::{ChargeDetails, ChargingState, Connectivity, Coordinate, SoftwareStatus};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{VehicleClient, VehicleError, VehicleResult};

/// Scripted vehicle for unit/integration testing
///
/// All knobs are shared so a test can keep a clone and change the vehicle
/// while an engine holds a reference to it.
#[derive(Clone)]
pub struct MockVehicle {
    name: String,

    /// Reported connectivity
    pub connectivity: Arc<Mutex<Connectivity>>,

    /// Wake poll on which the vehicle comes online (1-based).
    /// `None` means it never wakes.
    pub wake_after_polls: Arc<Mutex<Option<u32>>>,

    /// Number of `request_wake` calls so far
    pub wake_calls: Arc<Mutex<u32>>,

    pub position: Arc<Mutex<Coordinate>>,

    pub charging_state: Arc<Mutex<ChargingState>>,

    pub charge_details: Arc<Mutex<Option<ChargeDetails>>>,

    pub software_status: Arc<Mutex<Option<SoftwareStatus>>>,

    /// Charge limits requested through `set_charge_limit`, in order
    pub charge_limit_requests: Arc<Mutex<Vec<u8>>>,

    /// Configure every call to fail with this error
    pub fail_with: Arc<Mutex<Option<VehicleError>>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockVehicle {
    /// An online vehicle parked at `position` in `state`
    pub fn online(position: Coordinate, state: impl Into<ChargingState>) -> Self {
        Self {
            name: "mock".into(),
            connectivity: Arc::new(Mutex::new(Connectivity::Online)),
            wake_after_polls: Arc::new(Mutex::new(Some(1))),
            wake_calls: Arc::new(Mutex::new(0)),
            position: Arc::new(Mutex::new(position)),
            charging_state: Arc::new(Mutex::new(state.into())),
            charge_details: Arc::new(Mutex::new(None)),
            software_status: Arc::new(Mutex::new(None)),
            charge_limit_requests: Arc::new(Mutex::new(Vec::new())),
            fail_with: Arc::new(Mutex::new(None)),
        }
    }

    /// An asleep vehicle that comes online on the given wake poll
    pub fn asleep(
        position: Coordinate,
        state: impl Into<ChargingState>,
        wake_after_polls: Option<u32>,
    ) -> Self {
        let vehicle = Self::online(position, state);
        *lock(&vehicle.connectivity) = Connectivity::Asleep;
        *lock(&vehicle.wake_after_polls) = wake_after_polls;
        vehicle
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_charge_details(self, details: ChargeDetails) -> Self {
        *lock(&self.charge_details) = Some(details);
        self
    }

    pub fn with_software_status(self, status: SoftwareStatus) -> Self {
        *lock(&self.software_status) = Some(status);
        self
    }

    /// Charge limits requested so far
    pub fn charge_limit_requests(&self) -> Vec<u8> {
        lock(&self.charge_limit_requests).clone()
    }

    /// Number of wake polls issued so far
    pub fn wake_polls(&self) -> u32 {
        *lock(&self.wake_calls)
    }

    /// Set the error every subsequent call fails with
    pub fn set_failure(&self, error: Option<VehicleError>) {
        *lock(&self.fail_with) = error;
    }

    fn check_failure(&self) -> VehicleResult<()> {
        match lock(&self.fail_with).clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn require_online(&self) -> VehicleResult<()> {
        self.check_failure()?;
        if lock(&self.connectivity).is_online() {
            Ok(())
        } else {
            Err(VehicleError::NotOnline)
        }
    }
}

#[async_trait]
impl VehicleClient for MockVehicle {
    fn display_name(&self) -> &str {
        &self.name
    }

    async fn connectivity(&self) -> VehicleResult<Connectivity> {
        self.check_failure()?;
        Ok(*lock(&self.connectivity))
    }

    async fn request_wake(&self) -> VehicleResult<()> {
        self.check_failure()?;

        let polls = {
            let mut calls = lock(&self.wake_calls);
            *calls += 1;
            *calls
        };

        let mut connectivity = lock(&self.connectivity);
        if connectivity.is_online() {
            return Ok(());
        }

        match *lock(&self.wake_after_polls) {
            Some(n) if polls >= n => {
                *connectivity = Connectivity::Online;
                Ok(())
            }
            _ => Err(VehicleError::NotYetAwake),
        }
    }

    async fn position(&self) -> VehicleResult<Coordinate> {
        self.require_online()?;
        Ok(*lock(&self.position))
    }

    async fn charging_state(&self) -> VehicleResult<ChargingState> {
        self.require_online()?;
        Ok(lock(&self.charging_state).clone())
    }

    async fn charge_details(&self) -> VehicleResult<Option<ChargeDetails>> {
        self.require_online()?;
        Ok(lock(&self.charge_details).clone())
    }

    async fn software_status(&self) -> VehicleResult<Option<SoftwareStatus>> {
        self.require_online()?;
        Ok(lock(&self.software_status).clone())
    }

    async fn set_charge_limit(&self, percent: u8) -> VehicleResult<()> {
        self.require_online()?;
        lock(&self.charge_limit_requests).push(percent);
        if let Some(details) = lock(&self.charge_details).as_mut() {
            details.charge_limit_soc = percent;
        }
        Ok(())
    }

    async fn cancel_software_update(&self) -> VehicleResult<()> {
        self.require_online()?;
        if let Some(status) = lock(&self.software_status).as_mut() {
            status.update_status = None;
            status.update_expected_duration_secs = None;
        }
        Ok(())
    }
}
