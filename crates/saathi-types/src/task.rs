//! Outcomes of tasks run by the parallel task runner.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of one named parallel task: its value, or `{error: message}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskOutcome {
    Failed { error: String },
    Completed(Value),
}

impl TaskOutcome {
    pub fn failed(error: impl Into<String>) -> Self {
        TaskOutcome::Failed {
            error: error.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, TaskOutcome::Completed(_))
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            TaskOutcome::Completed(value) => Some(value),
            TaskOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            TaskOutcome::Failed { error } => Some(error),
            TaskOutcome::Completed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failed_serializes_as_error_object() {
        let value = serde_json::to_value(TaskOutcome::failed("boom")).unwrap();
        assert_eq!(value, json!({"error": "boom"}));
    }

    #[test]
    fn test_completed_serializes_transparently() {
        let outcome = TaskOutcome::Completed(json!({"study_plan": "week 1"}));
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"study_plan": "week 1"})
        );
        assert!(outcome.is_ok());
        assert!(outcome.error().is_none());
    }
}
