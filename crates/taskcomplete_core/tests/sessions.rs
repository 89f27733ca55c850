use taskcomplete_core::db::open_db_in_memory;
use taskcomplete_core::{SessionData, SessionRepository, SqliteSessionRepository};

#[test]
fn save_and_load_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSessionRepository::new(&conn);

    let mut data = SessionData::for_user(5);
    data.remember_project(3, true);
    repo.save_session("abc", &data, 2_000).unwrap();

    assert_eq!(repo.load_session("abc", 1_000).unwrap(), Some(data.clone()));

    data.clear_current_project();
    repo.save_session("abc", &data, 3_000).unwrap();
    let reloaded = repo.load_session("abc", 2_500).unwrap().unwrap();
    assert_eq!(reloaded.current_project, None);
    assert_eq!(reloaded.has_tasks, None);
}

#[test]
fn expired_sessions_are_invisible_and_purged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSessionRepository::new(&conn);

    repo.save_session("old", &SessionData::default(), 100).unwrap();
    repo.save_session("new", &SessionData::default(), 500).unwrap();

    assert!(repo.load_session("old", 100).unwrap().is_none());
    assert_eq!(repo.purge_expired(100).unwrap(), 1);
    assert!(repo.load_session("new", 100).unwrap().is_some());
}

#[test]
fn delete_session_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSessionRepository::new(&conn);
    repo.save_session("k", &SessionData::default(), 100).unwrap();
    repo.delete_session("k").unwrap();
    repo.delete_session("k").unwrap();
    assert!(repo.load_session("k", 0).unwrap().is_none());
}

#[test]
fn corrupt_payload_is_reported() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO sessions (session_key, data, expire_at) VALUES ('bad', 'not json', 100);",
        [],
    )
    .unwrap();
    assert!(SqliteSessionRepository::new(&conn)
        .load_session("bad", 0)
        .is_err());
}
