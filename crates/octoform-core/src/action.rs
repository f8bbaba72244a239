//! Action types for resource reconciliation

use serde::{Deserialize, Serialize};

/// Represents a planned action for a resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Unique identifier for the action
    pub id: String,

    /// Type of action to perform
    pub action_type: ActionType,

    /// Resource type (e.g., "octopusdeploy_lifecycle")
    pub resource_type: String,

    /// Resource address (`<type>.<name>`)
    pub address: String,

    /// Description of the action
    pub description: String,
}

impl Action {
    pub fn new(
        action_type: ActionType,
        resource_type: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        let address = address.into();
        let description = match action_type {
            ActionType::Create => format!("{} will be created", address),
            ActionType::Update => format!("{} will be updated in-place", address),
            ActionType::Delete => format!("{} will be destroyed", address),
            ActionType::NoOp => format!("{} is up to date", address),
        };
        Self {
            id: format!("{}-{}", action_type, address),
            action_type,
            resource_type: resource_type.into(),
            address,
            description,
        }
    }
}

/// Type of action to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a new resource
    Create,
    /// Update an existing resource
    Update,
    /// Delete a resource
    Delete,
    /// No changes needed
    NoOp,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Update => write!(f, "update"),
            ActionType::Delete => write!(f, "delete"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

/// Result of applying actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    /// Successfully applied actions
    pub succeeded: Vec<ActionResult>,

    /// Failed actions
    pub failed: Vec<ActionResult>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl ApplyResult {
    pub fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn add_success(&mut self, action_id: String, message: String) {
        self.succeeded.push(ActionResult {
            action_id,
            success: true,
            message,
            error: None,
        });
    }

    pub fn add_failure(&mut self, action_id: String, error: String) {
        self.failed.push(ActionResult {
            action_id,
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

/// Result of a single action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    /// ID of the action
    pub action_id: String,

    /// Whether the action succeeded
    pub success: bool,

    /// Success message
    pub message: String,

    /// Error message if failed
    pub error: Option<String>,
}

/// Plan containing all actions to be applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// List of actions to perform
    pub actions: Vec<Action>,

    /// Whether the plan has any changes
    pub has_changes: bool,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        let has_changes = actions.iter().any(|a| a.action_type != ActionType::NoOp);
        Self {
            actions,
            has_changes,
        }
    }

    /// Get actions by type
    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    /// Summary of the plan
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.actions_by_type(ActionType::Create).len(),
            update: self.actions_by_type(ActionType::Update).len(),
            delete: self.actions_by_type(ActionType::Delete).len(),
            no_change: self.actions_by_type(ActionType::NoOp).len(),
        }
    }
}

/// Summary of planned actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub no_change: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to add, {} to change, {} to destroy, {} unchanged",
            self.create, self.update, self.delete, self.no_change
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_summary() {
        let plan = Plan::new(vec![
            Action::new(ActionType::Create, "octopusdeploy_lifecycle", "octopusdeploy_lifecycle.a"),
            Action::new(ActionType::NoOp, "octopusdeploy_lifecycle", "octopusdeploy_lifecycle.b"),
            Action::new(ActionType::Delete, "octopusdeploy_lifecycle", "octopusdeploy_lifecycle.c"),
        ]);

        assert!(plan.has_changes);
        assert_eq!(
            plan.summary().to_string(),
            "1 to add, 0 to change, 1 to destroy, 1 unchanged"
        );
    }

    #[test]
    fn test_noop_plan_has_no_changes() {
        let plan = Plan::new(vec![Action::new(
            ActionType::NoOp,
            "octopusdeploy_lifecycle",
            "octopusdeploy_lifecycle.a",
        )]);
        assert!(!plan.has_changes);
    }

    #[test]
    fn test_action_id() {
        let action = Action::new(
            ActionType::Update,
            "octopusdeploy_lifecycle",
            "octopusdeploy_lifecycle.main",
        );
        assert_eq!(action.id, "update-octopusdeploy_lifecycle.main");
        assert!(action.description.contains("updated in-place"));
    }
}
