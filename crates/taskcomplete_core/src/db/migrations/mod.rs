//! Ordered schema scripts and the runner that applies them.
//!
//! Applied scripts are recorded twice: `PRAGMA user_version` for a cheap
//! version check, and one `schema_migrations` row each so operators can list
//! what ran and when.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::{params, Connection, Transaction};

struct Script {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCRIPTS: [Script; 3] = [
    Script {
        version: 1,
        name: "init",
        sql: include_str!("0001_init.sql"),
    },
    Script {
        version: 2,
        name: "tags",
        sql: include_str!("0002_tags.sql"),
    },
    Script {
        version: 3,
        name: "sessions",
        sql: include_str!("0003_sessions.sql"),
    },
];

const LEDGER_DDL: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);";

/// One row of the migration ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub version: u32,
    pub name: String,
    pub applied_at: String,
}

/// Highest version this build can apply.
pub fn latest_version() -> u32 {
    SCRIPTS.iter().map(|script| script.version).max().unwrap_or(0)
}

pub fn current_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Ledger rows in version order.
pub fn applied_migrations(conn: &Connection) -> DbResult<Vec<AppliedMigration>> {
    let mut stmt = conn.prepare(
        "SELECT version, name, applied_at FROM schema_migrations ORDER BY version ASC;",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(AppliedMigration {
            version: row.get(0)?,
            name: row.get(1)?,
            applied_at: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Brings the schema up to [`latest_version`] in a single transaction.
///
/// Returns how many scripts ran; a current schema returns `0` untouched.
///
/// # Errors
/// - [`DbError::SchemaTooNew`] when the file comes from a newer build.
/// - [`DbError::Migration`] naming the script that failed.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let found = current_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }
    if found == supported {
        debug!("event=db_migrate module=db status=ok version={found} applied=0");
        return Ok(0);
    }

    let tx = conn.transaction()?;
    tx.execute_batch(LEDGER_DDL)?;
    let pending = SCRIPTS.iter().filter(|script| script.version > found);
    let mut applied = 0;
    for script in pending {
        run_script(&tx, script).map_err(|source| DbError::Migration {
            version: script.version,
            name: script.name,
            source,
        })?;
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            script.version, script.name
        );
        applied += 1;
    }
    tx.commit()?;
    Ok(applied)
}

fn run_script(tx: &Transaction<'_>, script: &Script) -> rusqlite::Result<()> {
    tx.execute_batch(script.sql)?;
    tx.execute(
        "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2);",
        params![script.version, script.name],
    )?;
    tx.pragma_update(None, "user_version", script.version)
}
