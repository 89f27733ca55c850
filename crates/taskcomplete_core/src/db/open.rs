//! Connection setup shared by file and in-memory stores.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where a connection points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    File(PathBuf),
    /// Private, empty database that disappears with the connection.
    Memory,
}

impl Display for StoreTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Memory => f.write_str(":memory:"),
        }
    }
}

/// Opens or creates the database file and migrates it.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    StoreTarget::File(path.as_ref().to_path_buf()).open()
}

/// Fresh in-memory database with the full schema.
pub fn open_db_in_memory() -> DbResult<Connection> {
    StoreTarget::Memory.open()
}

impl StoreTarget {
    /// Connects, enforces foreign keys and applies pending migrations.
    pub fn open(&self) -> DbResult<Connection> {
        let started = Instant::now();
        let result = self.connect_and_migrate();
        let elapsed_ms = started.elapsed().as_millis();

        match result {
            Ok((conn, applied)) => {
                info!(
                    "event=db_open module=db status=ok target={self} migrations_applied={applied} duration_ms={elapsed_ms}"
                );
                Ok(conn)
            }
            Err(err) => {
                error!(
                    "event=db_open module=db status=error target={self} duration_ms={elapsed_ms} error={err}"
                );
                Err(err)
            }
        }
    }

    fn connect_and_migrate(&self) -> DbResult<(Connection, usize)> {
        let mut conn = match self {
            Self::File(path) => Connection::open(path)?,
            Self::Memory => Connection::open_in_memory()?,
        };
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let applied = apply_migrations(&mut conn)?;
        Ok((conn, applied))
    }
}
