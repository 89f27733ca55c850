//! Project record: the owned, top-level grouping of tasks.

use super::user::UserId;
use super::{check_max_len, check_required, ModelValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type ProjectId = i64;

pub const PROJECT_TITLE_MAX_LEN: usize = 200;
pub const PROJECT_DESCRIPTION_MAX_LEN: usize = 500;

/// Persisted project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    /// Owning user. Deleting the user deletes the project.
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
}

impl Project {
    /// Path of this project's task list.
    pub fn absolute_url(&self) -> String {
        project_url(self.id)
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

impl Display for Project {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

/// Editable project fields, used for both create and update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectDraft {
    pub title: String,
    pub description: Option<String>,
}

impl ProjectDraft {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        check_required("title", &self.title, PROJECT_TITLE_MAX_LEN)?;
        if let Some(description) = self.description.as_deref() {
            check_max_len("description", description, PROJECT_DESCRIPTION_MAX_LEN)?;
        }
        Ok(())
    }
}

/// Task-list path for a project id.
pub fn project_url(id: ProjectId) -> String {
    format!("/project/{id}")
}

#[cfg(test)]
mod tests {
    use super::{Project, ProjectDraft};
    use crate::model::ModelValidationError;

    #[test]
    fn display_is_title() {
        let project = Project {
            id: 1,
            user_id: 7,
            title: "Portfolio".to_string(),
            description: Some("Tasks to complete portfolio website".to_string()),
        };
        assert_eq!(project.to_string(), "Portfolio");
        assert_eq!(project.absolute_url(), "/project/1");
        assert!(project.is_owned_by(7));
        assert!(!project.is_owned_by(8));
    }

    #[test]
    fn draft_limits_description_length() {
        let draft = ProjectDraft {
            title: "ok".to_string(),
            description: Some("x".repeat(501)),
        };
        assert!(matches!(
            draft.validate(),
            Err(ModelValidationError::TooLong {
                field: "description",
                ..
            })
        ));
    }
}
