//! Cookie-backed sessions.
//!
//! # Responsibility
//! - Load [`SessionData`] for the `sessionid` cookie before the handler runs.
//! - Persist changes afterwards and (re)issue the cookie.
//!
//! # Invariants
//! - Storage is touched after the handler only when the session changed.
//! - `cycle` and `flush` drop the previous key from storage.

use crate::error::{WebError, WebResult};
use crate::state::{AppState, WebSettings};
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use cookie::time::Duration;
use cookie::{Cookie, SameSite};
use log::{debug, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use taskcomplete_core::session::new_session_key;
use taskcomplete_core::{SessionData, SessionRepository, SqliteSessionRepository, UserId};

#[derive(Debug, Default)]
struct SessionState {
    key: Option<String>,
    data: SessionData,
    modified: bool,
    /// Key that must be removed from storage on save.
    stale_key: Option<String>,
    flushed: bool,
}

/// Per-request session handle, inserted by [`session_layer`].
#[derive(Debug, Clone, Default)]
pub struct Session(Arc<Mutex<SessionState>>);

impl Session {
    fn existing(key: String, data: SessionData) -> Self {
        Self(Arc::new(Mutex::new(SessionState {
            key: Some(key),
            data,
            ..SessionState::default()
        })))
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn data(&self) -> SessionData {
        self.lock().data.clone()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.lock().data.user_id
    }

    /// Stores `data`; unchanged data does not mark the session dirty.
    pub fn replace(&self, data: SessionData) {
        let mut state = self.lock();
        if state.data != data {
            state.data = data;
            state.modified = true;
            state.flushed = false;
        }
    }

    /// Moves `data` under a fresh key.
    pub fn cycle(&self, data: SessionData) {
        let mut state = self.lock();
        state.stale_key = state.key.take();
        state.data = data;
        state.modified = true;
        state.flushed = false;
    }

    /// Drops all data and the key.
    pub fn flush(&self) {
        let mut state = self.lock();
        state.stale_key = state.key.take();
        state.data = SessionData::default();
        state.modified = true;
        state.flushed = true;
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| WebError::internal("session layer is not installed"))
    }
}

/// Middleware: loads the session, runs the handler, saves the session.
pub async fn session_layer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let now = Utc::now().timestamp();
    let session = match read_cookie(request.headers(), &state.settings().session_cookie) {
        Some(key) => load(&state, key, now),
        None => Session::default(),
    };
    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).await;
    match persist(&state, &session, now) {
        Ok(Some(cookie)) => match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(err) => return WebError::internal(format!("bad cookie: {err}")).into_response(),
        },
        Ok(None) => {}
        Err(err) => return err.into_response(),
    }
    response
}

fn load(state: &AppState, key: String, now: i64) -> Session {
    let loaded = state.with_conn(|conn| {
        Ok(SqliteSessionRepository::new(conn).load_session(&key, now)?)
    });
    match loaded {
        Ok(Some(data)) => Session::existing(key, data),
        Ok(None) => Session::default(),
        Err(err) => {
            warn!("event=session_load module=web status=error error={err}");
            Session::default()
        }
    }
}

fn persist(state: &AppState, session: &Session, now: i64) -> WebResult<Option<Cookie<'static>>> {
    let mut inner = session.lock();
    if !inner.modified {
        return Ok(None);
    }
    let settings = state.settings();
    state.with_tx(|conn| {
        let repo = SqliteSessionRepository::new(conn);
        if let Some(stale) = inner.stale_key.take() {
            repo.delete_session(&stale)?;
        }
        if inner.flushed {
            debug!("event=session_flush module=web status=ok");
            return Ok(Some(removal_cookie(settings)));
        }
        let key = inner.key.get_or_insert_with(new_session_key).clone();
        repo.save_session(&key, &inner.data, now + settings.session_ttl_secs)?;
        debug!("event=session_save module=web status=ok");
        Ok(Some(session_cookie(settings, key)))
    })
}

fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| Cookie::split_parse(raw).flatten().collect::<Vec<_>>())
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

fn session_cookie(settings: &WebSettings, key: String) -> Cookie<'static> {
    Cookie::build((settings.session_cookie.clone(), key))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(settings.session_ttl_secs))
        .build()
}

fn removal_cookie(settings: &WebSettings) -> Cookie<'static> {
    Cookie::build((settings.session_cookie.clone(), String::new()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::ZERO)
        .build()
}

#[cfg(test)]
mod tests {
    use super::{read_cookie, session_cookie, Session};
    use crate::state::WebSettings;
    use axum::http::header::COOKIE;
    use axum::http::{HeaderMap, HeaderValue};
    use taskcomplete_core::SessionData;

    #[test]
    fn reads_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; sessionid=abc123"));
        assert_eq!(read_cookie(&headers, "sessionid").as_deref(), Some("abc123"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn cookie_attributes() {
        let rendered = session_cookie(&WebSettings::default(), "k".to_string()).to_string();
        assert!(rendered.starts_with("sessionid=k"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Max-Age=1209600"));
    }

    #[test]
    fn replace_with_same_data_stays_clean() {
        let session = Session::existing("k".to_string(), SessionData::for_user(1));
        session.replace(SessionData::for_user(1));
        assert!(!session.lock().modified);

        let mut data = session.data();
        data.remember_project(4, false);
        session.replace(data);
        assert!(session.lock().modified);
    }

    #[test]
    fn cycle_and_flush_retire_the_old_key() {
        let session = Session::existing("old".to_string(), SessionData::default());
        session.cycle(SessionData::for_user(2));
        {
            let state = session.lock();
            assert_eq!(state.stale_key.as_deref(), Some("old"));
            assert!(state.key.is_none());
        }

        let session = Session::existing("old".to_string(), SessionData::for_user(2));
        session.flush();
        assert_eq!(session.user_id(), None);
        assert!(session.lock().flushed);
    }
}
