//! Charging policy evaluation for chargeward
//!
//! This crate is the heart of chargeward, containing:
//! - Geofencing (which configured locations the vehicle is at)
//! - Schedule matching (which charging windows are active now)
//! - Policy resolution, by time alone and then by position
//! - Vehicle availability (Unknown -> Offline -> Waking -> Online / Unavailable)
//! - Compliance verdicts and the per-cycle engine tying them together
//! - One-off vehicle commands (charge limit, software update)

mod availability;
mod charge;
mod commands;
mod compliance;
mod engine;
mod error;
mod geofence;
mod resolver;
mod schedule;

pub use availability::*;
pub use charge::*;
pub use commands::*;
pub use compliance::*;
pub use engine::*;
pub use error::*;
pub use geofence::*;
pub use resolver::*;
pub use schedule::*;
