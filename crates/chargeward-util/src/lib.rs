//! Shared utilities for chargeward
//!
//! This crate provides:
//! - ID types (LocationId, CycleId)
//! - Wall-clock time windows and an injectable clock
//! - Default configuration paths

mod ids;
mod paths;
mod time;

pub use ids::*;
pub use paths::*;
pub use time::*;
