//! Success payloads returned by unit task operations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The success-case payload of a task operation.
///
/// Units hand back an open JSON mapping; [`ResultRecord::from_value`]
/// sorts it into the one shape the status tracker understands and
/// everything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultRecord {
    /// Names the agent and task it came from; eligible for status updates.
    AgentUpdate {
        agent: String,
        task: String,
        performance: Option<f64>,
        details: Value,
    },
    /// Anything else. Still a success, but never touches agent status.
    Opaque(Value),
}

impl ResultRecord {
    /// Classify an open mapping.
    ///
    /// The agent name is read from `agent`, falling back to `unit`; the
    /// task name from `task`. Both must be strings. `performance` is kept
    /// only when it is a finite number in `[0, 1]`.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(map) = value else {
            return ResultRecord::Opaque(value);
        };

        let agent = string_field(&map, "agent").or_else(|| string_field(&map, "unit"));
        let task = string_field(&map, "task");

        match (agent, task) {
            (Some(agent), Some(task)) => {
                let performance = map
                    .get("performance")
                    .and_then(Value::as_f64)
                    .filter(|p| p.is_finite() && (0.0..=1.0).contains(p));
                ResultRecord::AgentUpdate {
                    agent,
                    task,
                    performance,
                    details: Value::Object(map),
                }
            }
            _ => ResultRecord::Opaque(Value::Object(map)),
        }
    }

    /// Agent update with no extra details.
    pub fn agent_update(
        agent: impl Into<String>,
        task: impl Into<String>,
        performance: Option<f64>,
    ) -> Self {
        ResultRecord::AgentUpdate {
            agent: agent.into(),
            task: task.into(),
            performance,
            details: Value::Null,
        }
    }

    pub fn is_agent_update(&self) -> bool {
        matches!(self, ResultRecord::AgentUpdate { .. })
    }

    /// The raw payload as the unit produced it.
    pub fn details(&self) -> &Value {
        match self {
            ResultRecord::AgentUpdate { details, .. } => details,
            ResultRecord::Opaque(value) => value,
        }
    }
}

impl From<Value> for ResultRecord {
    fn from(value: Value) -> Self {
        ResultRecord::from_value(value)
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}
