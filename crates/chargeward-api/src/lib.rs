//! Shared types for chargeward
//!
//! This crate defines the values exchanged between the configuration, the
//! vehicle client, the evaluation core and whatever renders its output:
//! - Telemetry values (coordinates, charging-state labels, connectivity)
//! - Vehicle availability states
//! - Per-cycle compliance reports
//! - Versioning

mod report;
mod types;

pub use report::*;
pub use types::*;

/// Current report format version
pub const REPORT_VERSION: u32 = 1;
