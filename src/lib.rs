//! Phase-driven coordination of producer units.
//!
//! A [`Director`] owns a registry of units (agents and helpers), a fixed
//! phase table and the status tracker. Each phase fans its tasks out
//! concurrently and collects every outcome, so one failing unit lowers
//! the phase's success ratio without stopping its siblings.

pub mod config;
pub mod director;
pub mod error;
pub mod log;
pub mod phase;
pub mod record;
pub mod registry;
pub mod status;
pub mod stock;
pub mod unit;

pub use director::{CycleReport, Director};
pub use error::{Error, Result, UnitError};
pub use phase::{Phase, PhaseReport, PhaseTable, TaskSpec};
pub use record::ResultRecord;
pub use registry::{InitReport, UnitRegistry, UnitRole};
pub use status::{AgentStatus, StatusTracker, SystemSnapshot};
pub use unit::{TaskOutcome, Unit};
