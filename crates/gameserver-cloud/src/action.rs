//! Plan and apply result types

use crate::state::ResourceState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One node the stack would submit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Type of action to perform
    pub action_type: ActionType,

    /// Resource type or function token
    pub resource_type: String,

    /// Logical name
    pub name: String,

    /// Nodes that must settle first
    pub dependencies: Vec<String>,

    /// Properties, if already known at declaration time
    pub props: Option<serde_json::Value>,
}

/// Type of action to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a new resource
    Create,
    /// Query live attributes after dependencies settle
    Read,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Read => write!(f, "read"),
        }
    }
}

/// Plan containing all actions to be applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub actions: Vec<Action>,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    /// Get actions by type
    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.actions_by_type(ActionType::Create).len(),
            read: self.actions_by_type(ActionType::Read).len(),
        }
    }
}

/// Summary of planned actions
#[derive(Debug, Clone)]
pub struct PlanSummary {
    pub create: usize,
    pub read: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to create, {} to read", self.create, self.read)
    }
}

/// Result of applying a stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    /// Nodes that settled
    pub succeeded: Vec<ActionResult>,

    /// Nodes that failed or never got their inputs
    pub failed: Vec<ActionResult>,

    /// Live state of every created resource, by logical name
    pub resources: BTreeMap<String, ResourceState>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl ApplyResult {
    pub fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
            resources: BTreeMap::new(),
            duration_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn add_success(&mut self, name: String, message: String) {
        self.succeeded.push(ActionResult {
            name,
            success: true,
            message,
            error: None,
        });
    }

    pub fn add_failure(&mut self, name: String, error: String) {
        self.failed.push(ActionResult {
            name,
            success: false,
            message: String::new(),
            error: Some(error),
        });
    }
}

impl Default for ApplyResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a single node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub name: String,

    pub success: bool,

    pub message: String,

    /// Error message if failed
    pub error: Option<String>,
}
