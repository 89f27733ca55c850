//! Task record: a unit of work inside a project.
//!
//! # Invariants
//! - `owner_id` is derived from the parent project and never written.
//! - Default listing order is `due_date` ascending, undated tasks last.

use super::project::{project_url, ProjectId};
use super::user::UserId;
use super::{check_required, ModelValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type TaskId = i64;

pub const TASK_TITLE_MAX_LEN: usize = 200;

/// Task priority. Stored as 1/2/3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn value(self) -> i64 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    pub fn from_value(value: i64) -> Result<Self, ModelValidationError> {
        match value {
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            other => Err(ModelValidationError::InvalidPriority(other)),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// Persisted task as read back from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    /// Owner of the parent project.
    #[serde(skip_serializing, default)]
    pub owner_id: UserId,
    pub title: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub note: Option<String>,
    pub complete: bool,
    /// Legacy tag names, lower-case and sorted.
    pub tags: Vec<String>,
}

impl Task {
    /// Always the parent project's task list.
    pub fn absolute_url(&self) -> String {
        project_url(self.project_id)
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

/// Editable task fields, used for both create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub project_id: ProjectId,
    pub title: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub note: Option<String>,
    pub complete: bool,
}

impl TaskDraft {
    /// New open task with default priority and no due date.
    pub fn new(project_id: ProjectId, title: impl Into<String>) -> Self {
        Self {
            project_id,
            title: title.into(),
            priority: Priority::default(),
            due_date: None,
            note: None,
            complete: false,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        check_required("title", &self.title, TASK_TITLE_MAX_LEN)
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        Self {
            project_id: task.project_id,
            title: task.title.clone(),
            priority: task.priority,
            due_date: task.due_date,
            note: task.note.clone(),
            complete: task.complete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Priority, Task, TaskDraft};

    #[test]
    fn priority_roundtrips_through_storage_values() {
        for priority in Priority::ALL {
            assert_eq!(Priority::from_value(priority.value()), Ok(priority));
        }
        assert!(Priority::from_value(4).is_err());
        assert_eq!(Priority::default(), Priority::Low);
    }

    #[test]
    fn absolute_url_points_at_parent_project() {
        let task = Task {
            id: 42,
            project_id: 3,
            owner_id: 1,
            title: "Create site map".to_string(),
            priority: Priority::High,
            due_date: None,
            note: None,
            complete: false,
            tags: Vec::new(),
        };
        assert_eq!(task.absolute_url(), "/project/3");
        assert_eq!(task.to_string(), "Create site map");
    }

    #[test]
    fn new_draft_defaults() {
        let draft = TaskDraft::new(1, "x");
        assert_eq!(draft.priority, Priority::Low);
        assert!(!draft.complete);
        assert!(draft.validate().is_ok());
        assert!(TaskDraft::new(1, " ").validate().is_err());
    }
}
