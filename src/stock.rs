//! Built-in simulated units.
//!
//! These stand in for the real content producers so the director can be
//! run end to end. Each operation waits out a configurable latency and
//! returns a success record with a fixed performance figure; no content
//! is produced.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::UnitError;
use crate::record::ResultRecord;
use crate::registry::UnitRole;
use crate::unit::{TaskOutcome, Unit};

/// A unit with a fixed set of operations and scripted outcomes.
pub struct SimulatedUnit {
    name: String,
    role: UnitRole,
    /// `(operation, performance)` pairs.
    operations: Vec<(&'static str, f64)>,
    primary: Option<&'static str>,
    latency: Duration,
    failing: Vec<String>,
    runs: AtomicU64,
}

impl SimulatedUnit {
    pub fn new(name: impl Into<String>, role: UnitRole, operations: Vec<(&'static str, f64)>) -> Self {
        Self {
            name: name.into(),
            role,
            operations,
            primary: None,
            latency: Duration::ZERO,
            failing: Vec::new(),
            runs: AtomicU64::new(0),
        }
    }

    pub fn with_primary(mut self, operation: &'static str) -> Self {
        self.primary = Some(operation);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make `operation` fail. `"initialize"` fails bring-up.
    pub fn failing(mut self, operation: impl Into<String>) -> Self {
        self.failing.push(operation.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of task operations performed so far.
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }

    fn fails(&self, operation: &str) -> bool {
        self.failing.iter().any(|f| f == operation)
    }
}

#[async_trait]
impl Unit for SimulatedUnit {
    async fn initialize(&self) -> Result<(), UnitError> {
        if self.fails("initialize") {
            return Err(UnitError::failed(format!("{} could not start", self.name)));
        }
        info!(unit = %self.name, "{} initialized", self.name);
        Ok(())
    }

    async fn perform(&self, operation: &str) -> TaskOutcome {
        let Some(&(op, performance)) = self.operations.iter().find(|(op, _)| *op == operation) else {
            return Err(UnitError::UnsupportedOperation {
                unit: self.name.clone(),
                operation: operation.to_string(),
            });
        };

        debug!(unit = %self.name, operation = op, "running");
        tokio::time::sleep(self.latency).await;
        self.runs.fetch_add(1, Ordering::Relaxed);

        if self.fails(op) {
            return Err(UnitError::failed(format!("{}.{} failed", self.name, op)));
        }

        let role_key = match self.role {
            UnitRole::Agent => "agent",
            UnitRole::Helper => "helper",
        };
        Ok(ResultRecord::from_value(json!({
            role_key: self.name,
            "task": op,
            "result": "success",
            "performance": performance,
        })))
    }

    fn primary_operation(&self) -> Option<&str> {
        self.primary
    }
}

/// The standard set of agents and helpers, configured from `config`.
pub fn stock_units(config: &Config) -> Vec<(UnitRole, String, Arc<dyn Unit>)> {
    let latency = Duration::from_millis(config.units.latency_ms);

    let specs: Vec<(UnitRole, &str, Option<&'static str>, Vec<(&'static str, f64)>)> = vec![
        (
            UnitRole::Agent,
            "character_creator",
            Some("create_player_character"),
            vec![
                ("design_character_system", 0.95),
                ("create_player_character", 0.98),
                ("create_ai_team_members", 0.92),
            ],
        ),
        (
            UnitRole::Agent,
            "level_designer",
            Some("create_main_scenes"),
            vec![
                ("design_world_structure", 0.88),
                ("create_main_scenes", 0.91),
                ("optimize_level_performance", 0.85),
            ],
        ),
        (
            UnitRole::Agent,
            "mission_planner",
            Some("create_mission_structure"),
            vec![
                ("design_game_narrative", 0.89),
                ("create_mission_structure", 0.93),
            ],
        ),
        (
            UnitRole::Agent,
            "asset_generator",
            Some("generate_weapons"),
            vec![
                ("generate_weapons", 0.90),
                ("generate_gear", 0.87),
                ("generate_environment_assets", 0.84),
            ],
        ),
        (
            UnitRole::Helper,
            "unity_helper",
            None,
            vec![("setup_unity_project", 0.95), ("integrate_assets", 0.92)],
        ),
        (
            UnitRole::Helper,
            "code_generator",
            None,
            vec![
                ("generate_character_systems", 0.94),
                ("generate_ai_behavior", 0.91),
                ("generate_game_mechanics", 0.93),
            ],
        ),
        (
            UnitRole::Helper,
            "performance_optimizer",
            None,
            vec![("optimize_game_performance", 0.90)],
        ),
        (
            UnitRole::Helper,
            "task_manager",
            None,
            vec![("run_test_suite", 0.90)],
        ),
    ];

    specs
        .into_iter()
        .map(|(role, name, primary, operations)| {
            let scripted: Vec<&'static str> = std::iter::once("initialize")
                .chain(operations.iter().map(|(op, _)| *op))
                .filter(|op| config.should_fail(name, op))
                .collect();

            let mut unit = SimulatedUnit::new(name, role, operations).with_latency(latency);
            if let Some(op) = primary {
                unit = unit.with_primary(op);
            }
            for op in scripted {
                unit = unit.failing(op);
            }
            (role, name.to_string(), Arc::new(unit) as Arc<dyn Unit>)
        })
        .collect()
}
