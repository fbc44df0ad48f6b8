use leaflog_core::db::migrations::{latest_version, schema_version};
use leaflog_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

fn plant_columns(conn: &Connection) -> Vec<String> {
    let mut stmt = conn.prepare("PRAGMA table_info(plants);").unwrap();
    let rows = stmt.query_map([], |row| row.get::<_, String>(1)).unwrap();
    rows.map(Result::unwrap).collect()
}

#[test]
fn fresh_database_has_plant_table_at_latest_version() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    let columns = plant_columns(&conn);
    for expected in [
        "id",
        "name",
        "species",
        "last_watered_ms",
        "watering_frequency_days",
        "notes",
    ] {
        assert!(columns.iter().any(|c| c == expected), "missing column {expected}");
    }
}

#[test]
fn reopening_a_file_keeps_schema_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("leaflog.sqlite3");

    {
        let conn = open_db(&path).unwrap();
        conn.execute(
            "INSERT INTO plants (id, name, species, watering_frequency_days)
             VALUES ('11111111-2222-4333-8444-555555555555', 'Ivy', 'Hedera', 7);",
            [],
        )
        .unwrap();
    }

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM plants;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn open_db_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("data").join("leaflog.sqlite3");

    open_db(&path).unwrap();
    assert!(path.exists());
}

#[test]
fn open_db_reports_uncreatable_parent() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let err = open_db(blocker.join("leaflog.sqlite3")).unwrap_err();
    assert!(matches!(err, DbError::CreateDir { .. }), "unexpected error: {err}");
}

#[test]
fn schema_rejects_out_of_range_frequency() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO plants (id, name, species, watering_frequency_days)
         VALUES ('11111111-2222-4333-8444-555555555555', 'Ivy', 'Hedera', 400);",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn database_from_newer_binary_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");
    Connection::open(&path)
        .unwrap()
        .execute_batch("PRAGMA user_version = 999;")
        .unwrap();

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version: 999,
            latest_supported,
        } => assert_eq!(latest_supported, latest_version()),
        other => panic!("unexpected error: {other}"),
    }
}
