//! Server-side session storage.
//!
//! # Invariants
//! - Session payloads are stored as JSON (`SessionData`).
//! - Expired rows are invisible to `load_session` even before purging.

use crate::repo::{RepoError, RepoResult};
use crate::session::SessionData;
use rusqlite::{params, Connection, OptionalExtension};

pub trait SessionRepository {
    /// Loads a live session; `now` is unix epoch seconds.
    fn load_session(&self, key: &str, now: i64) -> RepoResult<Option<SessionData>>;
    /// Inserts or replaces the session row.
    fn save_session(&self, key: &str, data: &SessionData, expire_at: i64) -> RepoResult<()>;
    fn delete_session(&self, key: &str) -> RepoResult<()>;
    /// Removes expired rows and returns how many were deleted.
    fn purge_expired(&self, now: i64) -> RepoResult<usize>;
}

pub struct SqliteSessionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSessionRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SessionRepository for SqliteSessionRepository<'_> {
    fn load_session(&self, key: &str, now: i64) -> RepoResult<Option<SessionData>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM sessions WHERE session_key = ?1 AND expire_at > ?2;",
                params![key, now],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(text) => serde_json::from_str(&text).map(Some).map_err(|err| {
                RepoError::InvalidData(format!("invalid session payload in sessions.data: {err}"))
            }),
            None => Ok(None),
        }
    }

    fn save_session(&self, key: &str, data: &SessionData, expire_at: i64) -> RepoResult<()> {
        let payload = serde_json::to_string(data)
            .map_err(|err| RepoError::InvalidData(format!("unserializable session: {err}")))?;
        self.conn.execute(
            "INSERT INTO sessions (session_key, data, expire_at) VALUES (?1, ?2, ?3)
             ON CONFLICT (session_key) DO UPDATE SET data = excluded.data, expire_at = excluded.expire_at;",
            params![key, payload, expire_at],
        )?;
        Ok(())
    }

    fn delete_session(&self, key: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM sessions WHERE session_key = ?1;", [key])?;
        Ok(())
    }

    fn purge_expired(&self, now: i64) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM sessions WHERE expire_at <= ?1;", [now])?;
        Ok(removed)
    }
}
