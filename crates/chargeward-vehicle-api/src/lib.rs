//! Vehicle client interface for chargeward
//!
//! This crate defines the capability the evaluation core uses to talk to a
//! vehicle: connectivity, waking, position and charging telemetry. It
//! contains no transport code itself.

mod mock;
mod traits;

pub use mock::*;
pub use traits::*;
