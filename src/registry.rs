//! Named units, partitioned into agents and helpers.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::UnitError;
use crate::unit::Unit;

/// Role a unit is registered under.
///
/// Agents produce domain artifacts and get a status record each;
/// helpers support integration and are not individually tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitRole {
    Agent,
    Helper,
}

impl std::fmt::Display for UnitRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitRole::Agent => write!(f, "agent"),
            UnitRole::Helper => write!(f, "helper"),
        }
    }
}

/// A unit whose initialization failed. It stays registered.
#[derive(Debug, Clone, PartialEq)]
pub struct InitFailure {
    pub role: UnitRole,
    pub name: String,
    pub error: UnitError,
}

/// Result of bringing every registered unit up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitReport {
    /// `(role, name)` of units that initialized cleanly.
    pub initialized: Vec<(UnitRole, String)>,
    pub failed: Vec<InitFailure>,
}

impl InitReport {
    pub fn total(&self) -> usize {
        self.initialized.len() + self.failed.len()
    }

    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Holds every unit the director can schedule.
#[derive(Clone, Default)]
pub struct UnitRegistry {
    agents: BTreeMap<String, Arc<dyn Unit>>,
    helpers: BTreeMap<String, Arc<dyn Unit>>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn role_map(&self, role: UnitRole) -> &BTreeMap<String, Arc<dyn Unit>> {
        match role {
            UnitRole::Agent => &self.agents,
            UnitRole::Helper => &self.helpers,
        }
    }

    /// Register a unit under a role.
    ///
    /// Re-registering a name replaces the earlier unit and returns it.
    pub fn register(
        &mut self,
        role: UnitRole,
        name: impl Into<String>,
        unit: Arc<dyn Unit>,
    ) -> Option<Arc<dyn Unit>> {
        let name = name.into();
        debug!(%role, unit = %name, "registering unit");
        let map = match role {
            UnitRole::Agent => &mut self.agents,
            UnitRole::Helper => &mut self.helpers,
        };
        map.insert(name, unit)
    }

    pub fn get(&self, role: UnitRole, name: &str) -> Option<Arc<dyn Unit>> {
        self.role_map(role).get(name).cloned()
    }

    pub fn contains(&self, role: UnitRole, name: &str) -> bool {
        self.role_map(role).contains_key(name)
    }

    /// Registered names for a role, sorted.
    pub fn names(&self, role: UnitRole) -> impl Iterator<Item = &str> {
        self.role_map(role).keys().map(String::as_str)
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn helper_count(&self) -> usize {
        self.helpers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty() && self.helpers.is_empty()
    }

    /// Initialize every registered unit concurrently.
    ///
    /// Each initialization runs in its own task, so a failing or panicking
    /// unit cannot stop its siblings. Failures are logged and reported,
    /// never returned as errors.
    pub async fn initialize_all(&self) -> InitReport {
        let units: Vec<(UnitRole, String, Arc<dyn Unit>)> = self
            .agents
            .iter()
            .map(|(name, unit)| (UnitRole::Agent, name.clone(), Arc::clone(unit)))
            .chain(
                self.helpers
                    .iter()
                    .map(|(name, unit)| (UnitRole::Helper, name.clone(), Arc::clone(unit))),
            )
            .collect();

        info!(
            agents = self.agents.len(),
            helpers = self.helpers.len(),
            "initializing units"
        );

        let handles: Vec<_> = units
            .iter()
            .map(|(_, _, unit)| {
                let unit = Arc::clone(unit);
                tokio::spawn(async move { unit.initialize().await })
            })
            .collect();

        let results = join_all(handles).await;

        let mut report = InitReport::default();
        for ((role, name, _), result) in units.into_iter().zip(results) {
            let outcome = match result {
                Ok(outcome) => outcome,
                Err(join_err) => Err(UnitError::Panicked(join_err.to_string())),
            };
            match outcome {
                Ok(()) => {
                    debug!(%role, unit = %name, "unit initialized");
                    report.initialized.push((role, name));
                }
                Err(error) => {
                    warn!(%role, unit = %name, %error, "unit failed to initialize");
                    report.failed.push(InitFailure { role, name, error });
                }
            }
        }

        info!(
            initialized = report.initialized.len(),
            failed = report.failed.len(),
            "initialized {} agents and {} helpers",
            self.agents.len(),
            self.helpers.len()
        );
        report
    }
}

impl std::fmt::Debug for UnitRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitRegistry")
            .field("agents", &self.agents.keys().collect::<Vec<_>>())
            .field("helpers", &self.helpers.keys().collect::<Vec<_>>())
            .finish()
    }
}
