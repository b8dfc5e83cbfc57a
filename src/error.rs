use thiserror::Error;

use crate::phase::Phase;
use crate::registry::UnitRole;

/// Errors that reach the caller of the director.
///
/// Only configuration-class problems live here. Per-unit and per-task
/// failures are captured as [`UnitError`] values and never propagate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Unknown phase: {0}")]
    UnknownPhase(String),

    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    #[error("Phase {0} has no tasks")]
    EmptyPhase(Phase),

    #[error("No units registered")]
    NoUnits,

    #[error("No home directory")]
    NoHomeDir,

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure value produced by a unit's initialization or task operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitError {
    #[error("{0}")]
    Failed(String),

    #[error("{unit} does not support operation {operation}")]
    UnsupportedOperation { unit: String, operation: String },

    #[error("{role} {name} is not registered")]
    NotRegistered { role: UnitRole, name: String },

    #[error("task aborted: {0}")]
    Panicked(String),
}

impl UnitError {
    pub fn failed(msg: impl Into<String>) -> Self {
        UnitError::Failed(msg.into())
    }
}
