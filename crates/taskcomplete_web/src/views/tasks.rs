//! Task pages.
//!
//! The create form preselects the session's current project; the unfiltered
//! open-task list forgets it.

use super::{linked, open_task_count, task_service, FormBody, FormContext, Linked};
use crate::error::WebResult;
use crate::extract::CurrentUser;
use crate::response::{found, page};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Form;
use rusqlite::Connection;
use serde::Serialize;
use taskcomplete_core::form::task_form::{clean_task_form, COMPLETE_LABEL};
use taskcomplete_core::{FormErrors, FormInput, Priority, ProjectId, Task, TaskId};

#[derive(Debug, Serialize)]
pub struct TaskListPage {
    pub tasks: Vec<Linked<Task>>,
    pub num_of_tasks: u64,
}

#[derive(Debug, Serialize)]
pub struct ProjectChoice {
    pub id: ProjectId,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct PriorityChoice {
    pub value: i64,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TaskFormPage {
    pub task: Option<Linked<Task>>,
    pub form: FormContext,
    pub projects: Vec<ProjectChoice>,
    pub priorities: Vec<PriorityChoice>,
    pub complete_label: &'static str,
    pub num_of_tasks: u64,
}

#[derive(Debug, Serialize)]
pub struct TaskDeletePage {
    pub task: Linked<Task>,
    pub num_of_tasks: u64,
}

/// Open tasks across all of the user's projects.
pub async fn list_open_tasks(
    State(state): State<AppState>,
    current: CurrentUser,
) -> WebResult<Response> {
    let mut session = current.session.data();
    let context = state.with_conn(|conn| {
        let tasks = task_service(conn)
            .list_open_tasks(current.id(), &mut session)
            .map_err(|err| current.fail(err))?;
        Ok(TaskListPage {
            num_of_tasks: tasks.len() as u64,
            tasks: linked(tasks),
        })
    })?;
    current.session.replace(session);
    Ok(page(context))
}

pub async fn list_completed_tasks(
    State(state): State<AppState>,
    current: CurrentUser,
) -> WebResult<Response> {
    let context = state.with_conn(|conn| {
        let tasks = task_service(conn)
            .list_completed_tasks(current.id())
            .map_err(|err| current.fail(err))?;
        Ok(TaskListPage {
            tasks: linked(tasks),
            num_of_tasks: open_task_count(conn, &current)?,
        })
    })?;
    Ok(page(context))
}

pub async fn create_task_page(
    State(state): State<AppState>,
    current: CurrentUser,
) -> WebResult<Response> {
    let session = current.session.data();
    let context = state.with_conn(|conn| {
        let default_project = task_service(conn)
            .default_project(current.id(), &session)
            .map_err(|err| current.fail(err))?;
        let fields = default_project
            .map(|id| ("project", id.to_string()))
            .into_iter()
            .collect();
        form_page(conn, &current, None, FormContext::initial(fields))
    })?;
    Ok(page(context))
}

/// An explicit `project` wins over the session's current project.
pub async fn create_task(
    State(state): State<AppState>,
    current: CurrentUser,
    Form(body): FormBody,
) -> WebResult<Response> {
    let input = FormInput::new(body);
    let session = current.session.data();
    state.with_tx(|conn| {
        let service = task_service(conn);
        let choices = choice_ids(conn, &current)?;
        let default_project = service
            .default_project(current.id(), &session)
            .map_err(|err| current.fail(err))?;
        match clean_task_form(&input, &choices, default_project) {
            Ok(draft) => {
                let task = service
                    .create_task(current.id(), &draft)
                    .map_err(|err| current.fail(err))?;
                Ok(found(&task.absolute_url()))
            }
            Err(errors) => Ok(page(invalid_page(conn, &current, None, &input, errors)?)),
        }
    })
}

pub async fn update_task_page(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<TaskId>,
) -> WebResult<Response> {
    let context = state.with_conn(|conn| {
        let task = task_service(conn)
            .get_owned(current.id(), id)
            .map_err(|err| current.fail(err))?;
        let form = FormContext::initial(task_fields(&task));
        form_page(conn, &current, Some(task), form)
    })?;
    Ok(page(context))
}

/// A submission without `project` keeps the task where it is.
pub async fn update_task(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<TaskId>,
    Form(body): FormBody,
) -> WebResult<Response> {
    let input = FormInput::new(body);
    state.with_tx(|conn| {
        let service = task_service(conn);
        let task = service
            .get_owned(current.id(), id)
            .map_err(|err| current.fail(err))?;
        let choices = choice_ids(conn, &current)?;
        match clean_task_form(&input, &choices, Some(task.project_id)) {
            Ok(draft) => {
                let updated = service
                    .update_task(current.id(), id, &draft)
                    .map_err(|err| current.fail(err))?;
                Ok(found(&updated.absolute_url()))
            }
            Err(errors) => Ok(page(invalid_page(
                conn,
                &current,
                Some(task),
                &input,
                errors,
            )?)),
        }
    })
}

pub async fn delete_task_page(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<TaskId>,
) -> WebResult<Response> {
    let context = state.with_conn(|conn| {
        let task = task_service(conn)
            .get_owned(current.id(), id)
            .map_err(|err| current.fail(err))?;
        Ok(TaskDeletePage {
            task: task.into(),
            num_of_tasks: open_task_count(conn, &current)?,
        })
    })?;
    Ok(page(context))
}

/// Deletes and returns to the parent project's task list.
pub async fn delete_task(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<TaskId>,
) -> WebResult<Response> {
    let deleted = state.with_tx(|conn| {
        task_service(conn)
            .delete_task(current.id(), id)
            .map_err(|err| current.fail(err))
    })?;
    Ok(found(&deleted.absolute_url()))
}

fn choice_ids(conn: &Connection, current: &CurrentUser) -> WebResult<Vec<ProjectId>> {
    let projects = task_service(conn)
        .project_choices(current.id())
        .map_err(|err| current.fail(err))?;
    Ok(projects.into_iter().map(|project| project.id).collect())
}

fn form_page(
    conn: &Connection,
    current: &CurrentUser,
    task: Option<Task>,
    form: FormContext,
) -> WebResult<TaskFormPage> {
    let projects = task_service(conn)
        .project_choices(current.id())
        .map_err(|err| current.fail(err))?
        .into_iter()
        .map(|project| ProjectChoice {
            id: project.id,
            title: project.title,
        })
        .collect();
    let priorities = Priority::ALL
        .iter()
        .map(|priority| PriorityChoice {
            value: priority.value(),
            label: priority.label(),
        })
        .collect();
    Ok(TaskFormPage {
        task: task.map(Linked::from),
        form,
        projects,
        priorities,
        complete_label: COMPLETE_LABEL,
        num_of_tasks: open_task_count(conn, current)?,
    })
}

fn invalid_page(
    conn: &Connection,
    current: &CurrentUser,
    task: Option<Task>,
    input: &FormInput,
    errors: FormErrors,
) -> WebResult<TaskFormPage> {
    form_page(conn, current, task, FormContext::invalid(input, errors))
}

fn task_fields(task: &Task) -> FormInput {
    let mut fields = vec![
        ("title", task.title.clone()),
        ("project", task.project_id.to_string()),
        ("priority", task.priority.value().to_string()),
        ("note", task.note.clone().unwrap_or_default()),
    ];
    if let Some(due_date) = task.due_date {
        fields.push(("due_date", due_date.format("%Y-%m-%d").to_string()));
    }
    if task.complete {
        fields.push(("complete", "on".to_string()));
    }
    fields.into_iter().collect()
}
