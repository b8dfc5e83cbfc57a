//! Fixed mapping from phase to the ordered tasks that make it up.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

use super::{Phase, TaskSpec};

/// Mapping from phase to its ordered task list.
///
/// Every phase present in the table has at least one task; this is checked
/// when the table is built, so progress computation never divides by zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTable {
    phases: BTreeMap<Phase, Vec<TaskSpec>>,
}

impl PhaseTable {
    /// Start building a custom table.
    pub fn builder() -> PhaseTableBuilder {
        PhaseTableBuilder::default()
    }

    /// The standard development cycle table.
    pub fn standard() -> Self {
        let phases = BTreeMap::from([
            (
                Phase::Design,
                vec![
                    TaskSpec::agent("mission_planner", "design_game_narrative"),
                    TaskSpec::agent("character_creator", "design_character_system"),
                    TaskSpec::agent("level_designer", "design_world_structure"),
                ],
            ),
            (
                Phase::Creation,
                vec![
                    TaskSpec::agent("character_creator", "create_player_character"),
                    TaskSpec::agent("character_creator", "create_ai_team_members"),
                    TaskSpec::agent("asset_generator", "generate_weapons"),
                    TaskSpec::agent("asset_generator", "generate_gear"),
                    TaskSpec::agent("asset_generator", "generate_environment_assets"),
                ],
            ),
            (
                Phase::LevelDesign,
                vec![
                    TaskSpec::agent("level_designer", "create_main_scenes"),
                    TaskSpec::agent("mission_planner", "create_mission_structure"),
                    TaskSpec::agent("level_designer", "optimize_level_performance"),
                ],
            ),
            (
                Phase::Coding,
                vec![
                    TaskSpec::helper("code_generator", "generate_character_systems"),
                    TaskSpec::helper("code_generator", "generate_ai_behavior"),
                    TaskSpec::helper("code_generator", "generate_game_mechanics"),
                    TaskSpec::helper("unity_helper", "setup_unity_project"),
                ],
            ),
            (
                Phase::Integration,
                vec![
                    TaskSpec::helper("unity_helper", "integrate_assets"),
                    TaskSpec::helper("performance_optimizer", "optimize_game_performance"),
                    TaskSpec::helper("task_manager", "run_test_suite"),
                ],
            ),
        ]);
        Self { phases }
    }

    /// Ordered task list for a phase.
    ///
    /// # Errors
    ///
    /// `EmptyPhase` if the table has no tasks for `phase`.
    pub fn tasks(&self, phase: Phase) -> Result<&[TaskSpec]> {
        match self.phases.get(&phase) {
            Some(tasks) if !tasks.is_empty() => Ok(tasks),
            _ => Err(Error::EmptyPhase(phase)),
        }
    }

    /// Phases defined in this table, in cycle order.
    pub fn phases(&self) -> impl Iterator<Item = Phase> + '_ {
        self.phases.keys().copied()
    }

    pub fn contains(&self, phase: Phase) -> bool {
        self.phases.contains_key(&phase)
    }
}

impl Default for PhaseTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Builder for [`PhaseTable`].
#[derive(Debug, Default)]
pub struct PhaseTableBuilder {
    phases: BTreeMap<Phase, Vec<TaskSpec>>,
}

impl PhaseTableBuilder {
    /// Set the task list for a phase, replacing any earlier list.
    pub fn phase(mut self, phase: Phase, tasks: Vec<TaskSpec>) -> Self {
        self.phases.insert(phase, tasks);
        self
    }

    /// Finish the table.
    ///
    /// # Errors
    ///
    /// `EmptyPhase` for the first phase given an empty task list.
    pub fn build(self) -> Result<PhaseTable> {
        if let Some((phase, _)) = self.phases.iter().find(|(_, tasks)| tasks.is_empty()) {
            return Err(Error::EmptyPhase(*phase));
        }
        Ok(PhaseTable {
            phases: self.phases,
        })
    }
}
