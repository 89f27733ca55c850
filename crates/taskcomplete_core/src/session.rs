//! Per-visitor session state.
//!
//! Holds the authenticated user and the "current project" used to preselect a
//! project when creating a task. Persistence lives in
//! [`crate::repo::session_repo`]; cookie transport lives in the web crate.

use crate::model::project::ProjectId;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session lifetime in seconds (two weeks).
pub const SESSION_TTL_SECS: i64 = 14 * 24 * 60 * 60;

/// Serialized session payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Project whose task list was opened last; cleared by the full task list.
    #[serde(default)]
    pub current_project: Option<ProjectId>,
    /// Whether `current_project` had open tasks when it was remembered.
    #[serde(default)]
    pub has_tasks: Option<bool>,
}

impl SessionData {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn remember_project(&mut self, project: ProjectId, has_tasks: bool) {
        self.current_project = Some(project);
        self.has_tasks = Some(has_tasks);
    }

    /// Forgets the remembered project and its open-task flag.
    pub fn clear_current_project(&mut self) {
        self.current_project = None;
        self.has_tasks = None;
    }
}

/// Generates an unguessable session key.
pub fn new_session_key() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::{new_session_key, SessionData};

    #[test]
    fn remember_and_clear_project() {
        let mut data = SessionData::for_user(3);
        data.remember_project(9, true);
        assert_eq!(data.current_project, Some(9));
        assert_eq!(data.has_tasks, Some(true));

        data.clear_current_project();
        assert_eq!(data.current_project, None);
        assert_eq!(data.has_tasks, None);
        assert_eq!(data.user_id, Some(3));
    }

    #[test]
    fn missing_keys_deserialize_to_defaults() {
        let data: SessionData = serde_json::from_str("{}").unwrap();
        assert_eq!(data, SessionData::default());
    }

    #[test]
    fn session_keys_are_unique_hex() {
        let a = new_session_key();
        let b = new_session_key();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
