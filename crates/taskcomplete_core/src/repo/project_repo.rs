//! Project repository contract and SQLite implementation.
//!
//! # Invariants
//! - Listing is always scoped to one owner.
//! - Deleting a project cascades to its tasks through the foreign key.

use crate::model::project::{Project, ProjectDraft, ProjectId};
use crate::model::user::UserId;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const PROJECT_SELECT_SQL: &str = "SELECT id, user_id, title, description FROM projects";

pub trait ProjectRepository {
    fn create_project(&self, owner: UserId, draft: &ProjectDraft) -> RepoResult<ProjectId>;
    fn update_project(&self, id: ProjectId, draft: &ProjectDraft) -> RepoResult<()>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    /// Owner's projects in creation order.
    fn list_projects(&self, owner: UserId) -> RepoResult<Vec<Project>>;
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, owner: UserId, draft: &ProjectDraft) -> RepoResult<ProjectId> {
        draft.validate()?;

        self.conn.execute(
            "INSERT INTO projects (user_id, title, description) VALUES (?1, ?2, ?3);",
            params![owner, draft.title.as_str(), draft.description.as_deref()],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_project(&self, id: ProjectId, draft: &ProjectDraft) -> RepoResult<()> {
        draft.validate()?;

        let changed = self.conn.execute(
            "UPDATE projects SET title = ?1, description = ?2 WHERE id = ?3;",
            params![draft.title.as_str(), draft.description.as_deref(), id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project",
                id,
            });
        }
        Ok(())
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let project = self
            .conn
            .query_row(
                &format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_project_row,
            )
            .optional()?;
        Ok(project)
    }

    fn list_projects(&self, owner: UserId) -> RepoResult<Vec<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE user_id = ?1 ORDER BY id ASC;"))?;
        let projects = stmt
            .query_map([owner], parse_project_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project",
                id,
            });
        }
        Ok(())
    }
}

fn parse_project_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
    })
}
