//! Shared application state.
//!
//! One SQLite connection behind a mutex. Read paths borrow it directly;
//! mutating paths run inside a transaction that commits only when the
//! closure succeeds.

use crate::error::{WebError, WebResult};
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};
use taskcomplete_core::SESSION_TTL_SECS;

/// Web behaviour knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebSettings {
    pub login_url: String,
    /// Where a successful login lands when no `next` was given.
    pub login_redirect: String,
    pub logout_redirect: String,
    pub session_cookie: String,
    pub session_ttl_secs: i64,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            login_url: "/account/login/".to_string(),
            login_redirect: "/projects/".to_string(),
            logout_redirect: "/".to_string(),
            session_cookie: "sessionid".to_string(),
            session_ttl_secs: SESSION_TTL_SECS,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    settings: Arc<WebSettings>,
}

impl AppState {
    pub fn new(conn: Connection, settings: WebSettings) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &WebSettings {
        &self.settings
    }

    /// Runs `f` against the shared connection without a transaction.
    pub fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> WebResult<T>) -> WebResult<T> {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Runs `f` inside one transaction; any error rolls everything back.
    pub fn with_tx<T>(&self, f: impl FnOnce(&Connection) -> WebResult<T>) -> WebResult<T> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|err| WebError::internal(format!("begin transaction failed: {err}")))?;
        let value = f(&tx)?;
        tx.commit()
            .map_err(|err| WebError::internal(format!("commit failed: {err}")))?;
        Ok(value)
    }

    fn lock(&self) -> WebResult<MutexGuard<'_, Connection>> {
        self.db
            .lock()
            .map_err(|_| WebError::internal("database lock poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use super::{AppState, WebSettings};
    use crate::error::WebError;
    use taskcomplete_core::db::open_db_in_memory;

    fn state() -> AppState {
        AppState::new(open_db_in_memory().unwrap(), WebSettings::default())
    }

    fn group_count(state: &AppState) -> i64 {
        state
            .with_conn(|conn| {
                Ok(conn
                    .query_row("SELECT COUNT(*) FROM groups;", [], |row| row.get(0))
                    .unwrap())
            })
            .unwrap()
    }

    #[test]
    fn failed_transaction_rolls_back() {
        let state = state();
        let before = group_count(&state);
        let result: Result<(), WebError> = state.with_tx(|conn| {
            conn.execute("INSERT INTO groups (name) VALUES ('temp');", [])
                .unwrap();
            Err(WebError::internal("boom"))
        });
        assert!(result.is_err());
        assert_eq!(group_count(&state), before);
    }

    #[test]
    fn successful_transaction_commits() {
        let state = state();
        let before = group_count(&state);
        state
            .with_tx(|conn| {
                conn.execute("INSERT INTO groups (name) VALUES ('temp');", [])
                    .unwrap();
                Ok(())
            })
            .unwrap();
        assert_eq!(group_count(&state), before + 1);
    }
}
