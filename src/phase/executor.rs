//! Runs one phase: fan out its tasks, fan in their outcomes, keep score.
//!
//! Every task is spawned on its own, so a failing or panicking unit only
//! affects its own outcome. Outcomes are drained in completion order and
//! applied to the status tracker one at a time, after each task has fully
//! resolved; units never touch tracker state themselves.

use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{error, info};

use crate::error::{Result, UnitError};
use crate::record::ResultRecord;
use crate::registry::UnitRegistry;
use crate::status::StatusTracker;
use crate::unit::TaskOutcome;

use super::{Phase, PhaseTable, TaskSpec};

/// A task that produced a result record.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSuccess {
    /// Index of the task in the phase's task list.
    pub position: usize,
    pub task: TaskSpec,
    pub record: ResultRecord,
    /// Whether the record changed an agent's status.
    pub status_updated: bool,
}

/// A task that failed. Counted against the phase, never propagated.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFailure {
    /// Index of the task in the phase's task list.
    pub position: usize,
    pub task: TaskSpec,
    pub error: UnitError,
}

/// Outcome of one phase run.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseReport {
    pub phase: Phase,
    pub total: usize,
    /// Successful tasks in the order they completed.
    pub successes: Vec<TaskSuccess>,
    /// Failed tasks, sorted by position.
    pub failures: Vec<TaskFailure>,
    /// `successes / total * 100`.
    pub progress: f64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PhaseReport {
    pub fn successful(&self) -> usize {
        self.successes.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Executes phases from a table against a registry.
pub struct PhaseExecutor<'a> {
    registry: &'a UnitRegistry,
    table: &'a PhaseTable,
}

impl<'a> PhaseExecutor<'a> {
    pub fn new(registry: &'a UnitRegistry, table: &'a PhaseTable) -> Self {
        Self { registry, table }
    }

    /// Run every task of `phase` concurrently and record its progress.
    ///
    /// Returns once every task has produced an outcome. Task failures are
    /// logged with their position and reported in the returned
    /// [`PhaseReport`]; the phase itself never fails because of them.
    ///
    /// # Errors
    ///
    /// `EmptyPhase` if the table has no tasks for `phase`. Nothing is
    /// launched and no progress is recorded in that case.
    pub async fn run(&self, phase: Phase, tracker: &mut StatusTracker) -> Result<PhaseReport> {
        let tasks = self.table.tasks(phase)?;
        let total = tasks.len();
        let started_at = Utc::now();

        info!(phase = %phase, tasks = total, "=== {} ===", phase.title());

        // Fan out in table order.
        let mut in_flight = FuturesUnordered::new();
        for (position, spec) in tasks.iter().enumerate() {
            let unit = self.registry.get(spec.role, &spec.unit);
            let spec = spec.clone();
            let handle = tokio::spawn(async move {
                match unit {
                    Some(unit) => unit.perform(&spec.operation).await,
                    None => Err(UnitError::NotRegistered {
                        role: spec.role,
                        name: spec.unit.clone(),
                    }),
                }
            });
            in_flight.push(async move {
                let outcome: TaskOutcome = match handle.await {
                    Ok(outcome) => outcome,
                    Err(join_err) => Err(UnitError::Panicked(join_err.to_string())),
                };
                (position, outcome)
            });
        }

        // Fan in, in completion order.
        let mut successes = Vec::with_capacity(total);
        let mut failures = Vec::new();
        while let Some((position, outcome)) = in_flight.next().await {
            let task = tasks[position].clone();
            match outcome {
                Ok(record) => {
                    let status_updated = tracker.update_from_result(&record);
                    successes.push(TaskSuccess {
                        position,
                        task,
                        record,
                        status_updated,
                    });
                }
                Err(err) => {
                    error!(
                        phase = %phase,
                        position,
                        unit = %task.unit,
                        operation = %task.operation,
                        error = %err,
                        "Task {} failed: {}",
                        position,
                        err
                    );
                    failures.push(TaskFailure {
                        position,
                        task,
                        error: err,
                    });
                }
            }
        }
        failures.sort_by_key(|f| f.position);

        let progress = tracker.record_progress(phase, successes.len(), total)?;
        info!(
            phase = %phase,
            successful = successes.len(),
            failed = failures.len(),
            progress,
            "Phase {} completed: {}/{} tasks successful",
            phase,
            successes.len(),
            total
        );

        Ok(PhaseReport {
            phase,
            total,
            successes,
            failures,
            progress,
            started_at,
            finished_at: Utc::now(),
        })
    }
}
