//! Response helpers shared by the views.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// `302 Found` to `location`.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// `200` JSON page context.
pub fn page<T: Serialize>(context: T) -> Response {
    (StatusCode::OK, Json(context)).into_response()
}

/// Login URL carrying the path to come back to.
pub fn login_location(login_url: &str, next: &str) -> String {
    match serde_urlencoded::to_string([("next", next)]) {
        Ok(query) => format!("{login_url}?{query}"),
        Err(_) => login_url.to_string(),
    }
}

/// Accepts only same-site absolute paths as post-login targets.
///
/// Browsers drop tabs and newlines from URLs, so `/\t/host` would act like
/// `//host`. Any control or whitespace character rejects the target.
pub fn is_local_path(target: &str) -> bool {
    if target
        .chars()
        .any(|c| c.is_control() || c.is_whitespace())
    {
        return false;
    }
    target.starts_with('/') && !target.starts_with("//") && !target.contains('\\')
}
