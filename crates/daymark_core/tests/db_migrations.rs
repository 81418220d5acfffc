use daymark_core::db::migrations::latest_version;
use daymark_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "users");
    assert_table_exists(&conn, "tasks");
    assert_table_exists(&conn, "steps");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daymark.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "tasks");
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
fn email_uniqueness_is_enforced_by_the_store() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO users (uuid, email, password_hash) VALUES ('u1', 'a@b.com', 'h1');",
        [],
    )
    .unwrap();
    let err = conn
        .execute(
            "INSERT INTO users (uuid, email, password_hash) VALUES ('u2', 'a@b.com', 'h2');",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("UNIQUE"));
}

#[test]
fn deleting_a_task_cascades_to_its_steps() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO users (uuid, email, password_hash) VALUES ('u1', 'a@b.com', 'h1');
         INSERT INTO tasks (uuid, owner, name, priority, created_at)
            VALUES ('t1', 'u1', 'task', 'medium', 1000);
         INSERT INTO steps (task_uuid, position, text) VALUES ('t1', 0, 'step');",
    )
    .unwrap();

    conn.execute("DELETE FROM tasks WHERE uuid = 't1';", []).unwrap();
    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM steps;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 0);
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
