//! Login gate.
//!
//! [`CurrentUser`] resolves the session's user. Anonymous or inactive
//! visitors are redirected to the login URL with the requested path in `next`.

use crate::error::WebError;
use crate::response::login_location;
use crate::session::Session;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use taskcomplete_core::{AccountService, ServiceError, SqliteUserRepository, User, UserId};

pub struct CurrentUser {
    pub user: User,
    pub session: Session,
    login_location: String,
}

impl CurrentUser {
    pub fn id(&self) -> UserId {
        self.user.id
    }

    /// Maps a service failure for this request; `Denied` goes back to login.
    pub fn fail(&self, err: ServiceError) -> WebError {
        WebError::from_service(err, &self.login_location)
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = WebError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        let next = parts
            .uri
            .path_and_query()
            .map(|value| value.as_str())
            .unwrap_or("/");
        let login_location = login_location(&state.settings().login_url, next);

        let user = match session.user_id() {
            Some(id) => state.with_conn(|conn| {
                AccountService::new(SqliteUserRepository::new(conn))
                    .get_user(id)
                    .map_err(|err| WebError::from_service(err, &login_location))
            })?,
            None => None,
        };

        match user {
            Some(user) => Ok(Self {
                user,
                session,
                login_location,
            }),
            None => Err(WebError::Redirect(login_location)),
        }
    }
}
