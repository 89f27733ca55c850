//! Project pages: list, detail (with open tasks), create, update, delete.

use super::{
    linked, open_task_count, project_service, task_service, FormBody, FormContext, Linked,
};
use crate::error::WebResult;
use crate::extract::CurrentUser;
use crate::response::{found, page};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Form;
use serde::Serialize;
use taskcomplete_core::form::project_form::clean_project_form;
use taskcomplete_core::{FormInput, Project, ProjectId, Task};

#[derive(Debug, Serialize)]
pub struct ProjectListPage {
    pub projects: Vec<Linked<Project>>,
    pub num_of_tasks: u64,
}

#[derive(Debug, Serialize)]
pub struct ProjectDetailPage {
    pub project: Linked<Project>,
    pub tasks: Vec<Linked<Task>>,
    pub has_tasks: bool,
    pub num_of_tasks: u64,
}

#[derive(Debug, Serialize)]
pub struct ProjectFormPage {
    pub project: Option<Linked<Project>>,
    pub form: FormContext,
    pub num_of_tasks: u64,
}

#[derive(Debug, Serialize)]
pub struct ProjectDeletePage {
    pub project: Linked<Project>,
    pub num_of_tasks: u64,
}

pub async fn list_projects(
    State(state): State<AppState>,
    current: CurrentUser,
) -> WebResult<Response> {
    let context = state.with_conn(|conn| {
        let projects = project_service(conn)
            .list_projects(current.id())
            .map_err(|err| current.fail(err))?;
        Ok(ProjectListPage {
            projects: linked(projects),
            num_of_tasks: open_task_count(conn, &current)?,
        })
    })?;
    Ok(page(context))
}

/// Owner-only; remembers the project as the session's current project.
pub async fn project_detail(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<ProjectId>,
) -> WebResult<Response> {
    let mut session = current.session.data();
    let context = state.with_conn(|conn| {
        let listing = task_service(conn)
            .open_project(current.id(), id, &mut session)
            .map_err(|err| current.fail(err))?;
        Ok(ProjectDetailPage {
            has_tasks: !listing.tasks.is_empty(),
            project: listing.project.into(),
            tasks: linked(listing.tasks),
            num_of_tasks: open_task_count(conn, &current)?,
        })
    })?;
    current.session.replace(session);
    Ok(page(context))
}

pub async fn create_project_page(
    State(state): State<AppState>,
    current: CurrentUser,
) -> WebResult<Response> {
    let num_of_tasks = state.with_conn(|conn| open_task_count(conn, &current))?;
    Ok(page(ProjectFormPage {
        project: None,
        form: FormContext::default(),
        num_of_tasks,
    }))
}

pub async fn create_project(
    State(state): State<AppState>,
    current: CurrentUser,
    Form(body): FormBody,
) -> WebResult<Response> {
    let input = FormInput::new(body);
    state.with_tx(|conn| match clean_project_form(&input) {
        Ok(draft) => {
            let project = project_service(conn)
                .create_project(current.id(), &draft)
                .map_err(|err| current.fail(err))?;
            Ok(found(&project.absolute_url()))
        }
        Err(errors) => Ok(page(ProjectFormPage {
            project: None,
            form: FormContext::invalid(&input, errors),
            num_of_tasks: open_task_count(conn, &current)?,
        })),
    })
}

pub async fn update_project_page(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<ProjectId>,
) -> WebResult<Response> {
    let context = state.with_conn(|conn| {
        let project = project_service(conn)
            .get_owned(current.id(), id)
            .map_err(|err| current.fail(err))?;
        Ok(ProjectFormPage {
            form: FormContext::initial(project_fields(&project)),
            project: Some(project.into()),
            num_of_tasks: open_task_count(conn, &current)?,
        })
    })?;
    Ok(page(context))
}

/// Ownership is checked before the submission is validated.
pub async fn update_project(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<ProjectId>,
    Form(body): FormBody,
) -> WebResult<Response> {
    let input = FormInput::new(body);
    state.with_tx(|conn| {
        let service = project_service(conn);
        let project = service
            .get_owned(current.id(), id)
            .map_err(|err| current.fail(err))?;
        match clean_project_form(&input) {
            Ok(draft) => {
                let updated = service
                    .update_project(current.id(), id, &draft)
                    .map_err(|err| current.fail(err))?;
                Ok(found(&updated.absolute_url()))
            }
            Err(errors) => Ok(page(ProjectFormPage {
                project: Some(project.into()),
                form: FormContext::invalid(&input, errors),
                num_of_tasks: open_task_count(conn, &current)?,
            })),
        }
    })
}

pub async fn delete_project_page(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<ProjectId>,
) -> WebResult<Response> {
    let context = state.with_conn(|conn| {
        let project = project_service(conn)
            .get_owned(current.id(), id)
            .map_err(|err| current.fail(err))?;
        Ok(ProjectDeletePage {
            project: project.into(),
            num_of_tasks: open_task_count(conn, &current)?,
        })
    })?;
    Ok(page(context))
}

pub async fn delete_project(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<ProjectId>,
) -> WebResult<Response> {
    state.with_tx(|conn| {
        project_service(conn)
            .delete_project(current.id(), id)
            .map_err(|err| current.fail(err))
    })?;
    Ok(found("/projects/"))
}

fn project_fields(project: &Project) -> FormInput {
    [
        ("title", project.title.clone()),
        ("description", project.description.clone().unwrap_or_default()),
    ]
    .into_iter()
    .collect()
}
