use reelshare_core::db::migrations::latest_version;
use reelshare_core::db::{open_db, open_db_in_memory, DbError};
use reelshare_core::{
    RecordStore, RepoError, SqliteItemRepository, SqliteUserRepository, StoreError,
};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "items");
    assert_table_exists(&conn, "users");
    assert_table_exists(&conn, "user_shared_items");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reelshare.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "items");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }

    let store_err = RecordStore::open(&path).unwrap_err();
    assert!(matches!(
        store_err,
        StoreError::Repo(RepoError::Db(DbError::UnsupportedSchemaVersion { .. }))
    ));
}

#[test]
fn repositories_reject_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteItemRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }

    assert!(RecordStore::from_connection(conn).is_err());
}

#[test]
fn repositories_reject_missing_tables_and_columns() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!(
        "CREATE TABLE items (id TEXT PRIMARY KEY, title TEXT, description TEXT, created_at INTEGER);
         PRAGMA user_version = {};",
        latest_version()
    ))
    .unwrap();

    assert!(matches!(
        SqliteItemRepository::try_new(&conn),
        Err(RepoError::MissingRequiredColumn {
            table: "items",
            column: "updated_at"
        })
    ));
    assert!(matches!(
        SqliteUserRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("users"))
    ));
}

#[test]
fn schema_rejects_empty_fields_and_reversed_timestamps() {
    let conn = open_db_in_memory().unwrap();

    let empty_title = conn.execute(
        "INSERT INTO items (id, title, description, created_at) VALUES ('x', '', 'd', 1);",
        [],
    );
    assert!(empty_title.is_err());

    let reversed = conn.execute(
        "INSERT INTO items (id, title, description, created_at, updated_at)
         VALUES ('y', 't', 'd', 10, 5);",
        [],
    );
    assert!(reversed.is_err());
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
