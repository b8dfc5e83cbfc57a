//! Top-level coordinator: owns the units, the phase table and the status.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result, UnitError};
use crate::phase::{CycleId, Phase, PhaseExecutor, PhaseReport, PhaseTable};
use crate::registry::{InitReport, UnitRegistry, UnitRole};
use crate::status::{StatusTracker, SystemSnapshot};
use crate::stock;
use crate::unit::{TaskOutcome, Unit};

/// Outcome of one full cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub id: CycleId,
    /// One report per phase, in cycle order.
    pub phases: Vec<PhaseReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CycleReport {
    pub fn total_tasks(&self) -> usize {
        self.phases.iter().map(|p| p.total).sum()
    }

    pub fn successful_tasks(&self) -> usize {
        self.phases.iter().map(|p| p.successful()).sum()
    }
}

/// Drives units through the development phases.
///
/// All mutable orchestration state (status, progress, history) lives here
/// and is only changed between task completions, so several directors can
/// run side by side in one process.
pub struct Director {
    config: Config,
    registry: UnitRegistry,
    table: PhaseTable,
    tracker: StatusTracker,
    history: Vec<PhaseReport>,
}

impl Director {
    /// Director with the standard phase table and no units.
    pub fn new(config: Config) -> Self {
        Self::with_table(config, PhaseTable::standard())
    }

    pub fn with_table(config: Config, table: PhaseTable) -> Self {
        Self {
            config,
            registry: UnitRegistry::new(),
            table,
            tracker: StatusTracker::new(),
            history: Vec::new(),
        }
    }

    /// Director with the standard table and the built-in simulated units.
    pub fn with_stock_units(config: Config) -> Self {
        let mut director = Self::new(config);
        for (role, name, unit) in stock::stock_units(&director.config) {
            director.register(role, name, unit);
        }
        director
    }

    /// Register a unit. Agents also get a status record.
    pub fn register(&mut self, role: UnitRole, name: impl Into<String>, unit: Arc<dyn Unit>) -> &mut Self {
        let name = name.into();
        if role == UnitRole::Agent {
            self.tracker.track(&name);
        }
        self.registry.register(role, name, unit);
        self
    }

    pub fn register_agent(&mut self, name: impl Into<String>, unit: Arc<dyn Unit>) -> &mut Self {
        self.register(UnitRole::Agent, name, unit)
    }

    pub fn register_helper(&mut self, name: impl Into<String>, unit: Arc<dyn Unit>) -> &mut Self {
        self.register(UnitRole::Helper, name, unit)
    }

    /// Bring every registered unit up.
    ///
    /// Individual unit failures are logged and listed in the report.
    ///
    /// # Errors
    ///
    /// `Validation` if the configuration is unusable, `NoUnits` if
    /// nothing is registered.
    pub async fn initialize(&mut self) -> Result<InitReport> {
        info!(project = %self.config.project.name, "=== AI system initialization ===");
        self.config.validate()?;
        if self.registry.is_empty() {
            return Err(Error::NoUnits);
        }

        let report = self.registry.initialize_all().await;
        if report.all_ok() {
            info!("AI system initialized successfully");
        } else {
            warn!(
                failed = report.failed.len(),
                "AI system initialized with {} unit(s) unavailable",
                report.failed.len()
            );
        }
        Ok(report)
    }

    /// Run a single phase.
    pub async fn run_phase(&mut self, phase: Phase) -> Result<PhaseReport> {
        info!(phase = %phase, "Executing development phase: {}", phase);
        let report = PhaseExecutor::new(&self.registry, &self.table)
            .run(phase, &mut self.tracker)
            .await?;
        self.history.push(report.clone());
        Ok(report)
    }

    /// Run a single phase by its identifier.
    ///
    /// # Errors
    ///
    /// `UnknownPhase` if `id` names no phase; nothing is launched.
    pub async fn run_phase_named(&mut self, id: &str) -> Result<PhaseReport> {
        let phase: Phase = id.parse()?;
        self.run_phase(phase).await
    }

    /// Run every phase in cycle order.
    ///
    /// Each phase finishes completely before the next starts. A low
    /// success ratio never stops the cycle; only configuration errors do.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        let id = CycleId::new();
        let started_at = Utc::now();
        info!(cycle = %id.short(), "Starting development cycle");

        let mut phases = Vec::with_capacity(Phase::ALL.len());
        for phase in Phase::ALL {
            phases.push(self.run_phase(phase).await?);
        }

        let report = CycleReport {
            id,
            phases,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            cycle = %id.short(),
            successful = report.successful_tasks(),
            total = report.total_tasks(),
            "Development cycle completed"
        );
        Ok(report)
    }

    /// Run one agent's primary task outside the phase table.
    ///
    /// The task outcome is returned as a value; a conforming record still
    /// updates the agent's status. Phase progress is not touched.
    ///
    /// # Errors
    ///
    /// `UnknownUnit` if no agent is registered under `name`.
    pub async fn run_single_unit(&mut self, name: &str) -> Result<TaskOutcome> {
        let unit = self
            .registry
            .get(UnitRole::Agent, name)
            .ok_or_else(|| Error::UnknownUnit(name.to_string()))?;

        info!(agent = %name, "Running agent: {}", name);
        let outcome = unit.run_primary_task().await.map_err(|err| match err {
            // Units don't know the name they were registered under.
            UnitError::UnsupportedOperation { operation, .. } => UnitError::UnsupportedOperation {
                unit: name.to_string(),
                operation,
            },
            other => other,
        });
        match &outcome {
            Ok(record) => {
                self.tracker.update_from_result(record);
            }
            Err(err) => warn!(agent = %name, error = %err, "Agent {} failed: {}", name, err),
        }
        Ok(outcome)
    }

    pub fn snapshot(&self) -> SystemSnapshot {
        self.tracker.snapshot()
    }

    /// Every phase run so far, oldest first.
    pub fn history(&self) -> &[PhaseReport] {
        &self.history
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    pub fn table(&self) -> &PhaseTable {
        &self.table
    }
}
