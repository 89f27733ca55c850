use rusqlite::Connection;
use taskcomplete_core::db::migrations::{
    applied_migrations, apply_migrations, current_version, latest_version,
};
use taskcomplete_core::db::{open_db, open_db_in_memory, DbError, StoreTarget};
use taskcomplete_core::SIGNUP_GROUP;

const TABLES: [&str; 9] = [
    "users",
    "groups",
    "user_groups",
    "projects",
    "tasks",
    "tags",
    "task_tags",
    "sessions",
    "schema_migrations",
];

fn table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name;")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<rusqlite::Result<Vec<String>>>()
        .unwrap()
}

#[test]
fn fresh_store_has_full_schema_and_ledger() {
    let conn = open_db_in_memory().unwrap();
    let names = table_names(&conn);
    for table in TABLES {
        assert!(names.iter().any(|name| name == table), "missing {table}");
    }

    assert_eq!(current_version(&conn).unwrap(), latest_version());
    let ledger = applied_migrations(&conn).unwrap();
    let versions = ledger.iter().map(|row| row.version).collect::<Vec<_>>();
    assert_eq!(versions, (1..=latest_version()).collect::<Vec<_>>());
    assert_eq!(ledger[0].name, "init");
    assert!(!ledger[0].applied_at.is_empty());
}

#[test]
fn signup_group_is_seeded() {
    let conn = open_db_in_memory().unwrap();
    let seeded: String = conn
        .query_row("SELECT name FROM groups;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(seeded, SIGNUP_GROUP);
}

#[test]
fn reopening_a_file_store_runs_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.sqlite3");

    drop(open_db(&path).unwrap());
    let mut reopened = StoreTarget::File(path.clone()).open().unwrap();

    assert_eq!(apply_migrations(&mut reopened).unwrap(), 0);
    assert_eq!(
        applied_migrations(&reopened).unwrap().len() as u32,
        latest_version()
    );
}

#[test]
fn store_from_newer_build_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ahead.sqlite3");
    Connection::open(&path)
        .unwrap()
        .pragma_update(None, "user_version", 42)
        .unwrap();

    let err = open_db(&path).unwrap_err();
    assert!(matches!(
        err,
        DbError::SchemaTooNew { found: 42, supported } if supported == latest_version()
    ));
}

#[test]
fn failing_script_is_named_and_rolled_back() {
    let mut conn = Connection::open_in_memory().unwrap();
    // Clashes with the first script's table.
    conn.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY);")
        .unwrap();

    match apply_migrations(&mut conn).unwrap_err() {
        DbError::Migration { version, name, .. } => {
            assert_eq!(version, 1);
            assert_eq!(name, "init");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(current_version(&conn).unwrap(), 0);
    assert!(!table_names(&conn).iter().any(|name| name == "schema_migrations"));
}

#[test]
fn orphan_project_violates_foreign_key() {
    let conn = open_db_in_memory().unwrap();
    let inserted = conn.execute(
        "INSERT INTO projects (user_id, title) VALUES (4242, 'orphan');",
        [],
    );
    assert!(inserted.is_err());
}
