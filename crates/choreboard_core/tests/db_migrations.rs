use choreboard_core::db::migrations::latest_version;
use choreboard_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "families");
    assert_table_exists(&conn, "users_families");
    assert_table_exists(&conn, "categories");
    assert_table_exists(&conn, "chores");
    assert_table_exists(&conn, "chore_completions");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("choreboard.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "chore_completions");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

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
fn completion_uniqueness_is_enforced_by_the_schema() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO families (id, name, code, created_at)
         VALUES (1, 'Home', 'home', '2025-01-01T00:00:00');
         INSERT INTO chores (id, family_id, title, frequency, weight, priority, is_active, created_at, updated_at)
         VALUES (1, 1, 'Dishes', 'daily', 1, 1, 1, '2025-01-01T00:00:00', '2025-01-01T00:00:00');
         INSERT INTO chore_completions (chore_id, family_id, period_key, completed_by_user_id, completed_at)
         VALUES (1, 1, '2025-01-01', 7, '2025-01-01T08:00:00');",
    )
    .unwrap();

    let duplicate = conn.execute(
        "INSERT INTO chore_completions (chore_id, family_id, period_key, completed_by_user_id, completed_at)
         VALUES (1, 1, '2025-01-01', 8, '2025-01-01T09:00:00');",
        [],
    );
    assert!(duplicate.is_err());
}

#[test]
fn score_columns_reject_out_of_range_values() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO families (id, name, code, created_at)
         VALUES (1, 'Home', 'home', '2025-01-01T00:00:00');",
    )
    .unwrap();

    let result = conn.execute(
        "INSERT INTO chores (family_id, title, frequency, weight, priority, is_active, created_at, updated_at)
         VALUES (1, 'Dishes', 'daily', 6, 1, 1, '2025-01-01T00:00:00', '2025-01-01T00:00:00');",
        [],
    );
    assert!(result.is_err());
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
