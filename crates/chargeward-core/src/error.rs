//! Cycle-aborting errors

use chargeward_api::AvailabilityState;
use chargeward_vehicle_api::VehicleError;
use std::time::Duration;
use thiserror::Error;

/// Errors that abort an evaluation cycle
///
/// A policy that simply does not apply is not an error; see
/// [`chargeward_api::ReasonCode`].
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(
        "Vehicle did not come online after {attempts} wake poll(s) in {elapsed:?} \
         (last state: {last_state})"
    )]
    RetryExhausted {
        attempts: u32,
        elapsed: Duration,
        last_state: AvailabilityState,
    },

    #[error("Vehicle client failed while {state} after {attempts} wake poll(s): {source}")]
    Upstream {
        state: AvailabilityState,
        attempts: u32,
        source: VehicleError,
    },
}

impl CoreError {
    /// Availability state the cycle was in when it failed
    pub fn last_state(&self) -> AvailabilityState {
        match self {
            CoreError::RetryExhausted { last_state, .. } => *last_state,
            CoreError::Upstream { state, .. } => *state,
        }
    }

    /// Wake polls issued before the failure
    pub fn attempts(&self) -> u32 {
        match self {
            CoreError::RetryExhausted { attempts, .. } | CoreError::Upstream { attempts, .. } => {
                *attempts
            }
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn upstream_keeps_source() {
        let err = CoreError::Upstream {
            state: AvailabilityState::Waking,
            attempts: 2,
            source: VehicleError::Unauthorized,
        };

        assert_eq!(err.last_state(), AvailabilityState::Waking);
        assert_eq!(err.attempts(), 2);
        assert!(err.source().is_some());
        assert!(err.to_string().contains("while waking"));
    }

    #[test]
    fn retry_exhausted_message() {
        let err = CoreError::RetryExhausted {
            attempts: 30,
            elapsed: Duration::from_secs(290),
            last_state: AvailabilityState::Waking,
        };
        assert!(err.to_string().starts_with("Vehicle did not come online after 30"));
    }
}
