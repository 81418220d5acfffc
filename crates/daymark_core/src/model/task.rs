//! Task domain model.
//!
//! # Responsibility
//! - Define the task record, its checklist steps, and the partial-update
//!   payload shape.
//! - Enforce field-level validation before anything reaches storage.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another task.
//! - `completed_at` is `Some` exactly when `completed` is true.
//! - `created_at` is set once at creation and never changes.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Urgency level driving the ranked views.
///
/// Ranking treats `High > Medium > Low`; creation time breaks ties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Checklist entry owned exclusively by its parent task.
///
/// Steps have no identity of their own; edits replace the whole list and
/// renumber positions from zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    /// Serialized as `order` to match the external schema naming.
    #[serde(rename = "order", default)]
    pub position: i64,
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable global ID used for routing and owner-scoped lookups.
    #[serde(rename = "id")]
    pub uuid: TaskId,
    #[serde(rename = "ownerId")]
    pub owner: UserId,
    /// Display name. Non-empty after trimming.
    pub name: String,
    pub priority: Priority,
    pub steps: Vec<Step>,
    pub completed: bool,
    pub is_today: bool,
    /// Unix epoch milliseconds, assigned at creation.
    pub created_at: i64,
    /// Unix epoch milliseconds. `Some` exactly when `completed` is true.
    pub completed_at: Option<i64>,
}

impl Task {
    /// Creates an active task with defaulted fields.
    ///
    /// # Invariants
    /// - `priority` starts as `Medium`, `steps` empty, `is_today` true.
    /// - `completed` starts false with no completion timestamp.
    pub fn new(owner: UserId, name: impl Into<String>, created_at: i64) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            owner,
            name: name.into(),
            priority: Priority::default(),
            steps: Vec::new(),
            completed: false,
            is_today: true,
            created_at,
            completed_at: None,
        }
    }

    /// Replaces the checklist wholesale, renumbering positions from zero.
    pub fn replace_steps(&mut self, steps: Vec<Step>) {
        self.steps = steps;
        for (index, step) in self.steps.iter_mut().enumerate() {
            step.position = index as i64;
        }
    }

    /// Sets the completion flag and keeps `completed_at` consistent.
    pub fn set_completed(&mut self, completed: bool, now_ms: i64) {
        self.completed = completed;
        self.completed_at = completed.then_some(now_ms);
    }

    /// Checks field-level rules before persistence.
    ///
    /// # Errors
    /// - `EmptyName` when the trimmed name is empty.
    /// - `EmptyStepText` when any step text is blank.
    /// - `CompletionMismatch` when `completed` and `completed_at` disagree.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.name.trim().is_empty() {
            return Err(TaskValidationError::EmptyName);
        }
        for (index, step) in self.steps.iter().enumerate() {
            if step.text.trim().is_empty() {
                return Err(TaskValidationError::EmptyStepText { position: index });
            }
        }
        if self.completed != self.completed_at.is_some() {
            return Err(TaskValidationError::CompletionMismatch);
        }
        Ok(())
    }
}

/// Field-level validation failure for a task write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyName,
    EmptyStepText { position: usize },
    CompletionMismatch,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "task name must not be empty"),
            Self::EmptyStepText { position } => {
                write!(f, "step text at position {position} must not be empty")
            }
            Self::CompletionMismatch => {
                write!(f, "completed flag and completion timestamp disagree")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Creation payload for a task; omitted fields take their defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTask {
    pub name: String,
    pub priority: Option<Priority>,
    pub steps: Option<Vec<Step>>,
    #[serde(rename = "isToday")]
    pub is_today: Option<bool>,
}

impl NewTask {
    /// Convenience constructor leaving every optional field unset.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: None,
            steps: None,
            is_today: None,
        }
    }
}

/// Partial-update payload.
///
/// `None` means "leave the stored value untouched"; none of the task fields
/// are nullable, so presence always carries a concrete replacement value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub priority: Option<Priority>,
    pub steps: Option<Vec<Step>>,
    #[serde(rename = "isToday")]
    pub is_today: Option<bool>,
    pub completed: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::{Priority, Step, Task, TaskValidationError};
    use uuid::Uuid;

    fn task() -> Task {
        Task::new(Uuid::new_v4(), "write report", 1_000)
    }

    #[test]
    fn new_task_applies_defaults() {
        let task = task();
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.steps.is_empty());
        assert!(!task.completed);
        assert!(task.is_today);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn replace_steps_renumbers_positions() {
        let mut task = task();
        task.replace_steps(vec![
            Step {
                text: "outline".to_string(),
                completed: false,
                position: 9,
            },
            Step {
                text: "draft".to_string(),
                completed: true,
                position: 3,
            },
        ]);
        assert_eq!(task.steps[0].position, 0);
        assert_eq!(task.steps[1].position, 1);
    }

    #[test]
    fn set_completed_keeps_timestamp_consistent() {
        let mut task = task();
        task.set_completed(true, 5_000);
        assert_eq!(task.completed_at, Some(5_000));
        task.set_completed(false, 6_000);
        assert_eq!(task.completed_at, None);
        assert!(task.validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_name_and_step_text() {
        let mut task = task();
        task.name = "   ".to_string();
        assert_eq!(task.validate(), Err(TaskValidationError::EmptyName));

        let mut task = super::Task::new(Uuid::new_v4(), "ok", 0);
        task.replace_steps(vec![Step {
            text: " ".to_string(),
            completed: false,
            position: 0,
        }]);
        assert_eq!(
            task.validate(),
            Err(TaskValidationError::EmptyStepText { position: 0 })
        );
    }

    #[test]
    fn validate_rejects_completion_mismatch() {
        let mut task = task();
        task.completed = true;
        assert_eq!(task.validate(), Err(TaskValidationError::CompletionMismatch));
    }

    #[test]
    fn task_serializes_with_external_field_names() {
        let task = task();
        let value = serde_json::to_value(&task).unwrap();
        assert!(value.get("id").is_some());
        assert!(value.get("ownerId").is_some());
        assert!(value.get("isToday").is_some());
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["priority"], "medium");
    }
}
