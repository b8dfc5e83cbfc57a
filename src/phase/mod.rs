//! Development phases, the table that defines them, and their execution.
//!
//! A phase is a fixed list of unit operations that run concurrently.
//! Phases themselves run strictly one after another in [`Phase::ALL`]
//! order when the full cycle is driven.

mod executor;
mod table;
mod types;

pub use executor::{PhaseExecutor, PhaseReport, TaskFailure, TaskSuccess};
pub use table::{PhaseTable, PhaseTableBuilder};
pub use types::{CycleId, Phase, TaskSpec};
