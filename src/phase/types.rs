//! Core phase type definitions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;
use crate::registry::UnitRole;

/// Unique identifier for one full-cycle run.
///
/// Uses UUID v4 for generation and provides a short form display
/// for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CycleId(pub Uuid);

impl CycleId {
    /// Create a new unique cycle identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Return first 8 characters of the UUID for display.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for CycleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CycleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Phases of the development cycle.
///
/// The derived ordering is the cycle order:
/// 1. Design - narrative, character system and world structure
/// 2. Creation - characters, weapons, gear and environment assets
/// 3. LevelDesign - scenes, mission structure, level tuning
/// 4. Coding - generated gameplay systems and engine project setup
/// 5. Integration - asset integration, optimization and test suite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Design,
    Creation,
    LevelDesign,
    Coding,
    Integration,
}

impl Phase {
    /// Every phase, in cycle order.
    pub const ALL: [Phase; 5] = [
        Phase::Design,
        Phase::Creation,
        Phase::LevelDesign,
        Phase::Coding,
        Phase::Integration,
    ];

    /// Identifier used on the command line and in serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Design => "design",
            Phase::Creation => "creation",
            Phase::LevelDesign => "level_design",
            Phase::Coding => "coding",
            Phase::Integration => "integration",
        }
    }

    /// Banner title logged when the phase starts.
    pub fn title(&self) -> &'static str {
        match self {
            Phase::Design => "GAME DESIGN PHASE",
            Phase::Creation => "ASSET CREATION PHASE",
            Phase::LevelDesign => "LEVEL DESIGN PHASE",
            Phase::Coding => "CODE GENERATION PHASE",
            Phase::Integration => "INTEGRATION PHASE",
        }
    }

    /// The phase that follows this one in the cycle, if any.
    pub fn next(&self) -> Option<Phase> {
        let idx = Phase::ALL.iter().position(|p| p == self)?;
        Phase::ALL.get(idx + 1).copied()
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Phase {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| Error::UnknownPhase(s.to_string()))
    }
}

/// One task invocation in a phase: which unit, and which of its operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub role: UnitRole,
    pub unit: String,
    pub operation: String,
}

impl TaskSpec {
    pub fn new(role: UnitRole, unit: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            role,
            unit: unit.into(),
            operation: operation.into(),
        }
    }

    pub fn agent(unit: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::new(UnitRole::Agent, unit, operation)
    }

    pub fn helper(unit: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::new(UnitRole::Helper, unit, operation)
    }
}

impl std::fmt::Display for TaskSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.unit, self.operation)
    }
}
