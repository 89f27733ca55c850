//! Request handlers and their page contexts.
//!
//! Every page context is a serializable struct; forms render as
//! [`FormContext`] with the echoed fields and the collected errors.

use crate::extract::CurrentUser;
use crate::error::WebResult;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;
use taskcomplete_core::form::account_form::SECRET_FIELDS;
use taskcomplete_core::{
    FormErrors, FormInput, Project, ProjectService, SqliteProjectRepository,
    SqliteTaskRepository, Task, TaskService,
};

pub mod accounts;
pub mod index;
pub mod projects;
pub mod tasks;

/// Raw urlencoded body as parsed by `axum::Form`.
pub type FormBody = axum::Form<HashMap<String, String>>;

/// An entity serialized together with its canonical URL.
#[derive(Debug, Serialize)]
pub struct Linked<T: Serialize> {
    #[serde(flatten)]
    pub item: T,
    pub url: String,
}

impl From<Project> for Linked<Project> {
    fn from(project: Project) -> Self {
        let url = project.absolute_url();
        Self { item: project, url }
    }
}

impl From<Task> for Linked<Task> {
    fn from(task: Task) -> Self {
        let url = task.absolute_url();
        Self { item: task, url }
    }
}

pub fn linked<T: Serialize>(items: Vec<T>) -> Vec<Linked<T>>
where
    Linked<T>: From<T>,
{
    items.into_iter().map(Linked::from).collect()
}

#[derive(Debug, Default, Serialize)]
pub struct FormContext {
    pub fields: FormInput,
    pub errors: FormErrors,
}

impl FormContext {
    pub fn initial(fields: FormInput) -> Self {
        Self {
            fields,
            errors: FormErrors::new(),
        }
    }

    /// Echoes a rejected submission without its secret fields.
    pub fn invalid(input: &FormInput, errors: FormErrors) -> Self {
        Self {
            fields: input.without(SECRET_FIELDS),
            errors,
        }
    }
}

pub(crate) fn project_service(conn: &Connection) -> ProjectService<SqliteProjectRepository<'_>> {
    ProjectService::new(SqliteProjectRepository::new(conn))
}

pub(crate) fn task_service(
    conn: &Connection,
) -> TaskService<SqliteTaskRepository<'_>, SqliteProjectRepository<'_>> {
    TaskService::new(
        SqliteTaskRepository::new(conn),
        SqliteProjectRepository::new(conn),
    )
}

/// `num_of_tasks` shown on every authenticated page.
pub(crate) fn open_task_count(conn: &Connection, current: &CurrentUser) -> WebResult<u64> {
    task_service(conn)
        .count_open_tasks(current.id())
        .map_err(|err| current.fail(err))
}
