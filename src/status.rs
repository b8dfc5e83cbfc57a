//! Per-agent status and phase progress bookkeeping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::phase::Phase;
use crate::record::ResultRecord;

/// Status record kept for every registered agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub name: String,
    pub is_active: bool,
    pub tasks_completed: u64,
    pub current_task: Option<String>,
    pub performance: f64,
}

impl AgentStatus {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_active: false,
            tasks_completed: 0,
            current_task: None,
            performance: 0.0,
        }
    }
}

/// Point-in-time view of the whole system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub active_agents: usize,
    pub total_tasks_completed: u64,
    pub phase_progress: BTreeMap<Phase, f64>,
    pub agent_status: BTreeMap<String, AgentStatus>,
}

/// Tracks agent status and the progress of each phase run.
///
/// Scoped to one director; there is no process-wide instance.
#[derive(Debug, Clone, Default)]
pub struct StatusTracker {
    agents: BTreeMap<String, AgentStatus>,
    phase_progress: BTreeMap<Phase, f64>,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking an agent. An existing record is left untouched so
    /// counters never go backwards.
    pub fn track(&mut self, name: &str) {
        self.agents
            .entry(name.to_string())
            .or_insert_with(|| AgentStatus::new(name));
    }

    pub fn agent(&self, name: &str) -> Option<&AgentStatus> {
        self.agents.get(name)
    }

    /// Apply a successful task's record.
    ///
    /// Only an [`ResultRecord::AgentUpdate`] for a tracked agent changes
    /// anything: `tasks_completed` goes up by one, `current_task` is
    /// cleared, and `performance` is overwritten when present. Returns
    /// whether a status changed.
    pub fn update_from_result(&mut self, record: &ResultRecord) -> bool {
        let ResultRecord::AgentUpdate {
            agent,
            task,
            performance,
            ..
        } = record
        else {
            debug!("result record carries no agent update; status unchanged");
            return false;
        };

        let Some(status) = self.agents.get_mut(agent) else {
            debug!(agent = %agent, task = %task, "result references untracked agent; ignored");
            return false;
        };

        status.tasks_completed += 1;
        status.current_task = None;
        if let Some(p) = performance {
            status.performance = *p;
        }
        debug!(
            agent = %agent,
            task = %task,
            tasks_completed = status.tasks_completed,
            "agent status updated"
        );
        true
    }

    /// Record the success ratio of a phase run as a percentage.
    ///
    /// Overwrites any earlier value for the phase. Nothing is stored
    /// when the counts are inconsistent.
    ///
    /// # Errors
    ///
    /// `EmptyPhase` if `total` is zero, `Validation` if `successful`
    /// exceeds `total`.
    pub fn record_progress(&mut self, phase: Phase, successful: usize, total: usize) -> Result<f64> {
        if total == 0 {
            return Err(Error::EmptyPhase(phase));
        }
        if successful > total {
            return Err(Error::Validation(format!(
                "phase {} reported {} successes out of {} tasks",
                phase, successful, total
            )));
        }
        let pct = successful as f64 / total as f64 * 100.0;
        self.phase_progress.insert(phase, pct);
        Ok(pct)
    }

    pub fn progress(&self, phase: Phase) -> Option<f64> {
        self.phase_progress.get(&phase).copied()
    }

    pub fn snapshot(&self) -> SystemSnapshot {
        SystemSnapshot {
            active_agents: self.agents.values().filter(|a| a.is_active).count(),
            total_tasks_completed: self.agents.values().map(|a| a.tasks_completed).sum(),
            phase_progress: self.phase_progress.clone(),
            agent_status: self.agents.clone(),
        }
    }
}
