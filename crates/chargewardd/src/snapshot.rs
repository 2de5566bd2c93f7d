//! File-backed vehicle client
//!
//! Reads the vehicle's state from a JSON file on every call, so another
//! process (or a person with an editor) can move, wake or plug in the
//! vehicle while the service runs.

use async_trait::async_trait;
use chargeward_api::{ChargeDetails, ChargingState, Connectivity, Coordinate, SoftwareStatus};
use chargeward_vehicle_api::{VehicleClient, VehicleError, VehicleResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::debug;

/// On-disk vehicle state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub connectivity: Connectivity,
    pub position: Coordinate,
    pub charging_state: ChargingState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge: Option<ChargeDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software: Option<SoftwareStatus>,
    /// Wake poll on which an asleep vehicle comes online; absent means never
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wake_after_polls: Option<u32>,
}

/// Vehicle client backed by a [`VehicleSnapshot`] file
///
/// A successful wake is written back to the file as `online`, and so are
/// charge limit and software update commands. The wake poll count starts
/// over whenever connectivity is read, which every cycle does first.
pub struct SnapshotVehicle {
    path: PathBuf,
    name: String,
    wake_calls: AtomicU32,
}

impl SnapshotVehicle {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            wake_calls: AtomicU32::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> VehicleResult<VehicleSnapshot> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            VehicleError::Internal(format!("failed to read {}: {}", self.path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            VehicleError::Internal(format!("invalid snapshot {}: {}", self.path.display(), e))
        })
    }

    fn write(&self, snapshot: &VehicleSnapshot) -> VehicleResult<()> {
        let content = serde_json::to_string_pretty(snapshot)
            .map_err(|e| VehicleError::Internal(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| {
            VehicleError::Internal(format!("failed to write {}: {}", self.path.display(), e))
        })
    }

    fn read_online(&self) -> VehicleResult<VehicleSnapshot> {
        let snapshot = self.read()?;
        if snapshot.connectivity.is_online() {
            Ok(snapshot)
        } else {
            Err(VehicleError::NotOnline)
        }
    }
}

#[async_trait]
impl VehicleClient for SnapshotVehicle {
    fn display_name(&self) -> &str {
        &self.name
    }

    async fn connectivity(&self) -> VehicleResult<Connectivity> {
        let snapshot = self.read()?;
        self.wake_calls.store(0, Ordering::SeqCst);
        Ok(snapshot.connectivity)
    }

    async fn request_wake(&self) -> VehicleResult<()> {
        let mut snapshot = self.read()?;
        if snapshot.connectivity.is_online() {
            self.wake_calls.store(0, Ordering::SeqCst);
            return Ok(());
        }

        let polls = self.wake_calls.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(path = %self.path.display(), polls, "Wake requested");

        match snapshot.wake_after_polls {
            Some(n) if polls >= n => {
                snapshot.connectivity = Connectivity::Online;
                self.write(&snapshot)?;
                self.wake_calls.store(0, Ordering::SeqCst);
                Ok(())
            }
            _ => Err(VehicleError::NotYetAwake),
        }
    }

    async fn position(&self) -> VehicleResult<Coordinate> {
        Ok(self.read_online()?.position)
    }

    async fn charging_state(&self) -> VehicleResult<ChargingState> {
        Ok(self.read_online()?.charging_state)
    }

    async fn charge_details(&self) -> VehicleResult<Option<ChargeDetails>> {
        Ok(self.read_online()?.charge)
    }

    async fn software_status(&self) -> VehicleResult<Option<SoftwareStatus>> {
        Ok(self.read_online()?.software)
    }

    async fn set_charge_limit(&self, percent: u8) -> VehicleResult<()> {
        let mut snapshot = self.read_online()?;
        let charge = snapshot.charge.as_mut().ok_or_else(|| {
            VehicleError::Internal(format!("no charge block in {}", self.path.display()))
        })?;
        charge.charge_limit_soc = percent;
        self.write(&snapshot)
    }

    async fn cancel_software_update(&self) -> VehicleResult<()> {
        let mut snapshot = self.read_online()?;
        if let Some(software) = snapshot.software.as_mut() {
            software.update_status = None;
            software.update_expected_duration_secs = None;
        }
        self.write(&snapshot)
    }
}
