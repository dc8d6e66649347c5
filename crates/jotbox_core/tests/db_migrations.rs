use jotbox_core::db::migrations::latest_version;
use jotbox_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "users");
    assert_table_exists(&conn, "notes");
    assert_table_exists(&conn, "sessions");
}

#[test]
fn connections_enforce_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);

    let err = conn
        .execute(
            "INSERT INTO notes (user_id, title, content, created_at, updated_at, is_current)
             VALUES (999, 'orphan', '', 0, 0, 0);",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("FOREIGN KEY"));
}

#[test]
fn schema_rejects_second_current_note_for_same_owner() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO users (email, password_hash, created_at) VALUES ('a@b.com', 'x', 0);",
        [],
    )
    .unwrap();
    let user_id = conn.last_insert_rowid();

    let insert_current = "INSERT INTO notes (user_id, title, content, created_at, updated_at, is_current)
                          VALUES (?1, 'T', '', 0, 0, 1);";
    conn.execute(insert_current, [user_id]).unwrap();
    assert!(conn.execute(insert_current, [user_id]).is_err());
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jotbox.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "notes");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn opening_database_in_missing_directory_names_the_directory() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("not-created");

    let err = open_db(missing.join("jotbox.db")).unwrap_err();
    match &err {
        DbError::MissingDirectory(reported) => assert_eq!(reported, &missing),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("not-created"));
    assert!(!missing.exists());
}

#[test]
fn failed_migration_reports_its_version_and_rolls_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clash.db");

    // A stray table at version 0 collides with the first migration.
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE sessions (token TEXT);").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::Migration { version, .. } => assert_eq!(version, 1),
        other => panic!("unexpected error: {other}"),
    }

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), 0);
    let users: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'users';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(users, 0);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
