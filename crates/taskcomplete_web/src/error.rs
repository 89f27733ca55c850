//! Request error type and its HTTP mapping.
//!
//! - `NotFound` answers 404.
//! - `Redirect` answers 302; failed ownership checks land here, not 403.
//! - `Internal` is logged and answers 500 with a JSON body.

use crate::response::found;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde_json::json;
use std::error::Error;
use std::fmt::{Display, Formatter};
use taskcomplete_core::{DbError, RepoError, ServiceError};

pub type WebResult<T> = Result<T, WebError>;

#[derive(Debug)]
pub enum WebError {
    NotFound { entity: &'static str, id: i64 },
    /// Send the client elsewhere with `302 Found`.
    Redirect(String),
    Internal(String),
}

impl WebError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Maps a service failure; `Denied` becomes a redirect to `login_location`.
    pub fn from_service(err: ServiceError, login_location: &str) -> Self {
        match err {
            ServiceError::NotFound { entity, id } => Self::NotFound { entity, id },
            ServiceError::Denied => Self::Redirect(login_location.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl Display for WebError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Redirect(location) => write!(f, "redirect to {location}"),
            Self::Internal(message) => write!(f, "internal error: {message}"),
        }
    }
}

impl Error for WebError {}

impl From<RepoError> for WebError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<DbError> for WebError {
    fn from(value: DbError) -> Self {
        Self::Internal(value.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(location) => found(&location),
            Self::NotFound { entity, id } => {
                let body = json!({
                    "error": true,
                    "message": format!("{entity} {id} not found"),
                    "status": StatusCode::NOT_FOUND.as_u16(),
                });
                (StatusCode::NOT_FOUND, Json(body)).into_response()
            }
            Self::Internal(message) => {
                error!("event=http_error module=web status=error message={message:?}");
                let body = json!({
                    "error": true,
                    "message": "internal server error",
                    "status": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::WebError;
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;
    use taskcomplete_core::ServiceError;

    #[test]
    fn denied_redirects_to_login_location() {
        let response =
            WebError::from_service(ServiceError::Denied, "/account/login/?next=x").into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/account/login/?next=x"
        );
    }

    #[test]
    fn not_found_and_internal_statuses() {
        let not_found = WebError::from_service(
            ServiceError::NotFound {
                entity: "task",
                id: 3,
            },
            "/login",
        );
        assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

        let internal =
            WebError::from_service(ServiceError::MissingGroup("g".to_string()), "/login");
        assert_eq!(
            internal.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
