//! Task and tag repository contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over `tasks`, always joined to the parent project for ownership.
//! - Own legacy tag storage and task-tag link replacement.
//!
//! # Invariants
//! - Every list/count query is scoped to exactly one owner.
//! - List order is `due_date ASC` with undated tasks last, then `id ASC`.
//! - `set_task_tags` replaces the whole tag set atomically.

use crate::model::project::ProjectId;
use crate::model::tag::{normalize_tags, validate_tag_name, Tag, TagId};
use crate::model::task::{Priority, Task, TaskDraft, TaskId};
use crate::model::user::UserId;
use crate::repo::{bool_to_int, int_to_bool, with_savepoint, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

const TASK_SELECT_SQL: &str = "SELECT
    t.id,
    t.project_id,
    p.user_id AS owner_id,
    t.title,
    t.priority,
    t.due_date,
    t.note,
    t.complete
FROM tasks t
INNER JOIN projects p ON p.id = t.project_id";

/// Owner-scoped filter for task listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskListQuery {
    pub owner: UserId,
    pub project: Option<ProjectId>,
    /// `Some(false)` = open tasks, `Some(true)` = completed, `None` = both.
    pub complete: Option<bool>,
}

impl TaskListQuery {
    /// Owner's open tasks (the default listing).
    pub fn open(owner: UserId) -> Self {
        Self {
            owner,
            project: None,
            complete: Some(false),
        }
    }

    /// Owner's completed tasks.
    pub fn completed(owner: UserId) -> Self {
        Self {
            owner,
            project: None,
            complete: Some(true),
        }
    }

    pub fn in_project(mut self, project: ProjectId) -> Self {
        self.project = Some(project);
        self
    }
}

pub trait TaskRepository {
    fn create_task(&self, draft: &TaskDraft) -> RepoResult<TaskId>;
    fn update_task(&self, id: TaskId, draft: &TaskDraft) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    fn count_tasks(&self, query: &TaskListQuery) -> RepoResult<u64>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    /// Replaces all tags of one task; names are normalized first.
    fn set_task_tags(&self, id: TaskId, tags: &[String]) -> RepoResult<()>;
    /// All known tags sorted by name.
    fn list_tags(&self) -> RepoResult<Vec<Tag>>;
    /// Returns the id of the (normalized) tag, creating it when missing.
    fn ensure_tag(&self, name: &str) -> RepoResult<TagId>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, draft: &TaskDraft) -> RepoResult<TaskId> {
        draft.validate()?;

        self.conn.execute(
            "INSERT INTO tasks (project_id, title, priority, due_date, note, complete)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                draft.project_id,
                draft.title.as_str(),
                draft.priority.value(),
                draft.due_date.map(format_due_date),
                draft.note.as_deref(),
                bool_to_int(draft.complete),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_task(&self, id: TaskId, draft: &TaskDraft) -> RepoResult<()> {
        draft.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                project_id = ?1,
                title = ?2,
                priority = ?3,
                due_date = ?4,
                note = ?5,
                complete = ?6
             WHERE id = ?7;",
            params![
                draft.project_id,
                draft.title.as_str(),
                draft.priority.value(),
                draft.due_date.map(format_due_date),
                draft.note.as_deref(),
                bool_to_int(draft.complete),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: "task", id });
        }
        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE t.id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(self.parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let (filter, bind_values) = task_filter(query);
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL} {filter}
             ORDER BY t.due_date IS NULL ASC, t.due_date ASC, t.id ASC;"
        ))?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(self.parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn count_tasks(&self, query: &TaskListQuery) -> RepoResult<u64> {
        let (filter, bind_values) = task_filter(query);
        let count: i64 = self.conn.query_row(
            &format!(
                "SELECT COUNT(*)
                 FROM tasks t
                 INNER JOIN projects p ON p.id = t.project_id
                 {filter};"
            ),
            params_from_iter(bind_values),
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative task count `{count}`")))
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM tasks WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "task", id });
        }
        Ok(())
    }

    fn set_task_tags(&self, id: TaskId, tags: &[String]) -> RepoResult<()> {
        let normalized = normalize_tags(tags);
        for tag in &normalized {
            validate_tag_name(tag)?;
        }

        with_savepoint(self.conn, "set_task_tags", || {
            let exists: i64 = self.conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM tasks WHERE id = ?1);",
                [id],
                |row| row.get(0),
            )?;
            if exists == 0 {
                return Err(RepoError::NotFound { entity: "task", id });
            }

            self.conn
                .execute("DELETE FROM task_tags WHERE task_id = ?1;", [id])?;
            for tag in &normalized {
                let tag_id = self.ensure_tag(tag)?;
                self.conn.execute(
                    "INSERT OR IGNORE INTO task_tags (task_id, tag_id) VALUES (?1, ?2);",
                    params![id, tag_id],
                )?;
            }
            Ok(())
        })
    }

    fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM tags ORDER BY name COLLATE NOCASE ASC;")?;
        let tags = stmt
            .query_map([], |row| {
                Ok(Tag {
                    id: row.get("id")?,
                    name: row.get("name")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    fn ensure_tag(&self, name: &str) -> RepoResult<TagId> {
        let normalized = name.trim().to_lowercase();
        validate_tag_name(&normalized)?;

        self.conn.execute(
            "INSERT OR IGNORE INTO tags (name) VALUES (?1);",
            [normalized.as_str()],
        )?;
        let id = self
            .conn
            .query_row(
                "SELECT id FROM tags WHERE name = ?1 COLLATE NOCASE;",
                [normalized.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        id.ok_or_else(|| RepoError::InvalidData(format!("tag `{normalized}` vanished after insert")))
    }
}

impl SqliteTaskRepository<'_> {
    fn parse_task_row(&self, row: &Row<'_>) -> RepoResult<Task> {
        let id: TaskId = row.get("id")?;

        let priority_value: i64 = row.get("priority")?;
        let priority = Priority::from_value(priority_value).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid priority `{priority_value}` in tasks.priority"
            ))
        })?;

        let due_date = match row.get::<_, Option<String>>("due_date")? {
            Some(text) => Some(parse_due_date(&text).ok_or_else(|| {
                RepoError::InvalidData(format!("invalid date `{text}` in tasks.due_date"))
            })?),
            None => None,
        };

        Ok(Task {
            id,
            project_id: row.get("project_id")?,
            owner_id: row.get("owner_id")?,
            title: row.get("title")?,
            priority,
            due_date,
            note: row.get("note")?,
            complete: int_to_bool(row.get("complete")?, "tasks.complete")?,
            tags: self.load_tag_names(id)?,
        })
    }

    fn load_tag_names(&self, task_id: TaskId) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT g.name
             FROM task_tags tt
             INNER JOIN tags g ON g.id = tt.tag_id
             WHERE tt.task_id = ?1
             ORDER BY g.name COLLATE NOCASE ASC;",
        )?;
        let names = stmt
            .query_map([task_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }
}

fn task_filter(query: &TaskListQuery) -> (String, Vec<Value>) {
    let mut filter = String::from("WHERE p.user_id = ?");
    let mut bind_values = vec![Value::Integer(query.owner)];

    if let Some(project) = query.project {
        filter.push_str(" AND t.project_id = ?");
        bind_values.push(Value::Integer(project));
    }
    if let Some(complete) = query.complete {
        filter.push_str(" AND t.complete = ?");
        bind_values.push(Value::Integer(bool_to_int(complete)));
    }

    (filter, bind_values)
}

fn format_due_date(date: NaiveDate) -> String {
    date.format(DUE_DATE_FORMAT).to_string()
}

/// Parses an ISO `YYYY-MM-DD` calendar date.
pub fn parse_due_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DUE_DATE_FORMAT).ok()
}
