//! Signup, login and logout.
//!
//! Argon2 hashing and verification run on the blocking pool and never while
//! the database connection is held.

use super::{FormBody, FormContext};
use crate::error::{WebError, WebResult};
use crate::response::{found, is_local_path, page};
use crate::session::Session;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::Form;
use serde::{Deserialize, Serialize};
use taskcomplete_core::form::account_form::{
    clean_login_form, clean_signup_form, invalid_login_errors,
};
use taskcomplete_core::{
    check_password, hash_signup, AccountService, FormErrors, FormInput, ServiceError,
    SessionData, SqliteUserRepository,
};

#[derive(Debug, Serialize)]
pub struct AccountFormPage {
    pub form: FormContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

pub async fn signup_page() -> Response {
    page(AccountFormPage {
        form: FormContext::default(),
        next: None,
    })
}

/// Creates the account and sends the visitor to the login page.
pub async fn signup(State(state): State<AppState>, Form(body): FormBody) -> WebResult<Response> {
    let input = FormInput::new(body);
    let data = match clean_signup_form(&input) {
        Ok(data) => data,
        Err(errors) => return Ok(invalid(&input, errors, None)),
    };

    let login_url = state.settings().login_url.clone();
    let draft = off_request_thread(move || hash_signup(&data))
        .await?
        .map_err(|err| WebError::from_service(err, &login_url))?;

    let outcome = state.with_tx(|conn| {
        match AccountService::new(SqliteUserRepository::new(conn)).signup(&draft) {
            Ok(user) => Ok(Ok(user)),
            Err(ServiceError::Invalid(errors)) => Ok(Err(errors)),
            Err(err) => Err(WebError::from_service(err, &login_url)),
        }
    })?;

    match outcome {
        Ok(_) => Ok(found(&login_url)),
        Err(errors) => Ok(invalid(&input, errors, None)),
    }
}

pub async fn login_page(Query(query): Query<NextQuery>) -> Response {
    page(AccountFormPage {
        form: FormContext::default(),
        next: query.next,
    })
}

/// Authenticates and moves the user into a fresh session.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<NextQuery>,
    Form(body): FormBody,
) -> WebResult<Response> {
    let input = FormInput::new(body);
    let next = input.text("next").map(str::to_string).or(query.next);

    let credentials = match clean_login_form(&input) {
        Ok(credentials) => credentials,
        Err(errors) => return Ok(invalid(&input, errors, next)),
    };

    let settings = state.settings();
    let stored = state.with_conn(|conn| {
        AccountService::new(SqliteUserRepository::new(conn))
            .find_credentials(&credentials.username)
            .map_err(|err| WebError::from_service(err, &settings.login_url))
    })?;
    let password = credentials.password;
    let user = off_request_thread(move || check_password(stored, &password)).await?;

    let Some(user) = user else {
        return Ok(invalid(&input, invalid_login_errors(), next));
    };
    session.cycle(SessionData::for_user(user.id));

    let target = next
        .filter(|target| is_local_path(target))
        .unwrap_or_else(|| settings.login_redirect.clone());
    Ok(found(&target))
}

pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    session.flush();
    found(&state.settings().logout_redirect)
}

async fn off_request_thread<T, F>(work: F) -> WebResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| WebError::internal(format!("password task failed: {err}")))
}

fn invalid(input: &FormInput, errors: FormErrors, next: Option<String>) -> Response {
    page(AccountFormPage {
        form: FormContext::invalid(input, errors),
        next,
    })
}
