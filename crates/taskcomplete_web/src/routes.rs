//! Path → handler table.

use crate::request_log::log_request;
use crate::session::session_layer;
use crate::state::AppState;
use crate::views::{accounts, index, projects, tasks};
use axum::routing::get;
use axum::{middleware, Router};

/// Builds the application router with session and request-log layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index::index))
        .route("/projects/", get(projects::list_projects))
        .route(
            "/project/create",
            get(projects::create_project_page).post(projects::create_project),
        )
        .route(
            "/project/{id}",
            get(projects::project_detail).post(projects::project_detail),
        )
        .route(
            "/project/{id}/update",
            get(projects::update_project_page).post(projects::update_project),
        )
        .route(
            "/project/{id}/delete",
            get(projects::delete_project_page).post(projects::delete_project),
        )
        .route("/tasks/", get(tasks::list_open_tasks))
        .route("/completedtasks/", get(tasks::list_completed_tasks))
        .route(
            "/task/create",
            get(tasks::create_task_page).post(tasks::create_task),
        )
        .route(
            "/task/{id}/update",
            get(tasks::update_task_page).post(tasks::update_task),
        )
        .route(
            "/task/{id}/delete",
            get(tasks::delete_task_page).post(tasks::delete_task),
        )
        .route(
            "/signup/",
            get(accounts::signup_page).post(accounts::signup),
        )
        .route(
            "/account/login/",
            get(accounts::login_page).post(accounts::login),
        )
        .route(
            "/account/logout/",
            get(accounts::logout).post(accounts::logout),
        )
        .layer(middleware::from_fn_with_state(state.clone(), session_layer))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
