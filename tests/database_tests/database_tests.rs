//! Tests for Database
//!
//! These tests verify:
//! - Table creation writes both files to disk
//! - Duplicate / missing table errors and their messages
//! - Remove deletes both files and leaves no trace
//! - Behaviour with only one of the two files present
//! - State survives reopening the directory
//! - Partial failures while creating or removing a table
//! - Id allocation never falls behind the data file

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use flintdb::fs::{FileSystem, MemoryFs};
use flintdb::{ColumnType, Config, Database, FlintError, Value};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_db() -> (TempDir, Database) {
    let dir = TempDir::new().unwrap();
    let db = Database::open_path(dir.path()).unwrap();
    (dir, db)
}

fn create_users(db: &Database) {
    db.create(
        "users",
        [("name", ColumnType::String), ("age", ColumnType::Integer)],
    )
    .unwrap();
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// MemoryFs that refuses writes or deletes of paths containing a pattern
struct FailingFs {
    inner: MemoryFs,
    fail_writes: Option<&'static str>,
    fail_deletes: Option<&'static str>,
}

impl FailingFs {
    fn denied(path: &str) -> FlintError {
        io::Error::new(io::ErrorKind::PermissionDenied, format!("{}: denied", path)).into()
    }
}

impl FileSystem for FailingFs {
    fn exists(&self, path: &str) -> flintdb::Result<bool> {
        self.inner.exists(path)
    }

    fn read_all(&self, path: &str) -> flintdb::Result<Bytes> {
        self.inner.read_all(path)
    }

    fn write_all(&self, path: &str, contents: &[u8]) -> flintdb::Result<()> {
        match self.fail_writes {
            Some(pattern) if path.contains(pattern) => Err(Self::denied(path)),
            _ => self.inner.write_all(path, contents),
        }
    }

    fn delete(&self, path: &str) -> flintdb::Result<()> {
        match self.fail_deletes {
            Some(pattern) if path.contains(pattern) => Err(Self::denied(path)),
            _ => self.inner.delete(path),
        }
    }
}

fn failing_db(
    inner: &MemoryFs,
    fail_writes: Option<&'static str>,
    fail_deletes: Option<&'static str>,
) -> Database {
    let fs = FailingFs {
        inner: inner.clone(),
        fail_writes,
        fail_deletes,
    };
    Database::with_fs(Config::default(), Arc::new(fs))
}

// =============================================================================
// Create Tests
// =============================================================================

#[test]
fn test_open_creates_data_directory() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("nested").join("store");

    let db = Database::open_path(&nested).unwrap();

    assert!(nested.is_dir());
    assert_eq!(db.config().data_dir, nested);
}

#[test]
fn test_create_writes_both_files() {
    let (dir, db) = setup_db();

    create_users(&db);

    assert_eq!(
        file_names(dir.path()),
        vec!["users.config.json", "users.data.json"]
    );
    assert!(db.exists("users").unwrap());
    assert_eq!(fs::read_to_string(dir.path().join("users.data.json")).unwrap(), "");
}

#[test]
fn test_create_duplicate_table_fails() {
    let (_dir, db) = setup_db();
    create_users(&db);

    let err = db
        .create("users", [("other", ColumnType::Boolean)])
        .unwrap_err();

    assert!(matches!(err, FlintError::DuplicateTable(_)));
    assert_eq!(err.to_string(), "Table \"users\" already exists");
    // The original schema is untouched
    let schema = db.table("users").unwrap().schema().unwrap();
    assert!(schema.has_column("age"));
    assert!(!schema.has_column("other"));
}

#[test]
fn test_create_invalid_schema_writes_nothing() {
    let (dir, db) = setup_db();

    let err = db
        .create("bad", [("id", ColumnType::Integer)])
        .unwrap_err();

    assert!(matches!(err, FlintError::InvalidSchema(_)));
    assert!(file_names(dir.path()).is_empty());
}

#[test]
fn test_table_missing_fails_with_message() {
    let (_dir, db) = setup_db();

    let err = db.table("ghost").unwrap_err();

    assert!(matches!(err, FlintError::TableNotFound(ref name) if name == "ghost"));
    assert_eq!(err.to_string(), "Table \"ghost\" does not exist");
    assert!(!db.exists("ghost").unwrap());
}

// =============================================================================
// Remove Tests
// =============================================================================

#[test]
fn test_remove_deletes_both_files() {
    let (dir, db) = setup_db();
    create_users(&db);

    db.remove("users").unwrap();

    assert!(file_names(dir.path()).is_empty());
    assert!(!db.exists("users").unwrap());
    assert!(matches!(db.table("users"), Err(FlintError::TableNotFound(_))));
}

#[test]
fn test_remove_missing_table_fails() {
    let (_dir, db) = setup_db();

    assert!(matches!(db.remove("ghost"), Err(FlintError::TableNotFound(_))));
}

#[test]
fn test_remove_then_recreate_with_new_schema() {
    let (_dir, db) = setup_db();
    create_users(&db);
    let users = db.table("users").unwrap();
    users
        .insert([("name", Value::from("Kriss")), ("age", Value::from(31))])
        .unwrap();

    db.remove("users").unwrap();
    let users = db.create("users", [("email", ColumnType::String)]).unwrap();

    assert_eq!(users.count().unwrap(), 0);
    assert_eq!(users.last_id().unwrap(), 0);
    assert!(users.schema().unwrap().has_column("email"));
}

#[test]
fn test_handle_removed_through_itself() {
    let (dir, db) = setup_db();
    create_users(&db);

    db.table("users").unwrap().remove().unwrap();

    assert!(file_names(dir.path()).is_empty());
}

// =============================================================================
// Partial State Tests
// =============================================================================

#[test]
fn test_data_file_without_schema_is_not_a_table() {
    let (dir, db) = setup_db();
    fs::write(dir.path().join("users.data.json"), "").unwrap();

    assert!(!db.exists("users").unwrap());
    assert!(matches!(db.table("users"), Err(FlintError::TableNotFound(_))));
    assert!(matches!(db.remove("users"), Err(FlintError::TableNotFound(_))));
    // Nothing was deleted
    assert_eq!(file_names(dir.path()), vec!["users.data.json"]);
}

#[test]
fn test_create_overwrites_orphaned_data_file() {
    let (dir, db) = setup_db();
    fs::write(
        dir.path().join("users.data.json"),
        "{\"id\":1,\"name\":\"stale\",\"age\":1}\n",
    )
    .unwrap();

    create_users(&db);

    let users = db.table("users").unwrap();
    assert_eq!(users.count().unwrap(), 0);
}

#[test]
fn test_remove_with_missing_data_file_clears_schema() {
    let (dir, db) = setup_db();
    create_users(&db);
    fs::remove_file(dir.path().join("users.data.json")).unwrap();

    let err = db.remove("users").unwrap_err();

    assert!(matches!(err, FlintError::TableNotFound(_)));
    assert!(file_names(dir.path()).is_empty());
    assert!(!db.exists("users").unwrap());
}

#[test]
fn test_query_with_missing_data_file_fails() {
    let (dir, db) = setup_db();
    create_users(&db);
    fs::remove_file(dir.path().join("users.data.json")).unwrap();

    let users = db.table("users").unwrap();

    assert!(matches!(users.find_all(), Err(FlintError::TableNotFound(_))));
}

#[test]
fn test_corrupt_data_file_fails_query() {
    let (dir, db) = setup_db();
    create_users(&db);
    fs::write(
        dir.path().join("users.data.json"),
        "{\"id\":1,\"name\":\"Kamil\",\"age\":25}\n{\"id\":2,\"name\":\"Kriss\",\"age\":\"old\"}\n",
    )
    .unwrap();

    let err = db.table("users").unwrap().find_all().unwrap_err();

    assert!(matches!(err, FlintError::CorruptRecord { line: 2, .. }));
}

// =============================================================================
// Partial Failure Tests
// =============================================================================

#[test]
fn test_failed_data_write_rolls_back_schema() {
    let files = MemoryFs::new();
    let db = failing_db(&files, Some(".data."), None);

    let err = db
        .create("users", [("name", ColumnType::String)])
        .unwrap_err();

    assert!(matches!(err, FlintError::Io(_)), "got {:?}", err);
    assert_eq!(files.file_count(), 0);
    assert!(!db.exists("users").unwrap());
}

#[test]
fn test_failed_rollback_reports_inconsistent_table() {
    let files = MemoryFs::new();
    let db = failing_db(&files, Some(".data."), Some(".config."));

    let err = db
        .create("users", [("name", ColumnType::String)])
        .unwrap_err();

    match err {
        FlintError::InconsistentTable { table, detail } => {
            assert_eq!(table, "users");
            assert!(detail.contains("data file"), "detail: {}", detail);
            assert!(detail.contains("schema"), "detail: {}", detail);
        }
        other => panic!("expected InconsistentTable, got {:?}", other),
    }
    // The schema could not be rolled back and is still there
    assert!(files.exists("users.config.json").unwrap());
}

#[test]
fn test_failed_data_delete_reports_inconsistent_table() {
    let files = MemoryFs::new();
    Database::with_fs(Config::default(), Arc::new(files.clone()))
        .create("users", [("name", ColumnType::String)])
        .unwrap();
    let db = failing_db(&files, None, Some(".data."));

    let err = db.remove("users").unwrap_err();

    assert!(
        matches!(err, FlintError::InconsistentTable { ref table, .. } if table == "users"),
        "got {:?}",
        err
    );
    assert!(!files.exists("users.config.json").unwrap());
    assert!(files.exists("users.data.json").unwrap());
    assert!(matches!(db.table("users"), Err(FlintError::TableNotFound(_))));
}

// =============================================================================
// Id Allocation Tests
// =============================================================================

#[test]
fn test_stale_counter_does_not_reuse_ids() {
    let (dir, db) = setup_db();
    create_users(&db);
    let users = db.table("users").unwrap();
    for (name, age) in [("Kamil", 25), ("Kriss", 31)] {
        users
            .insert([("name", Value::from(name)), ("age", Value::from(age))])
            .unwrap();
    }

    // Counter restored from an older copy of the config
    fs::write(
        dir.path().join("users.config.json"),
        r#"{"last_id": 0, "schema": {"id": "integer", "name": "string", "age": "integer"}}"#,
    )
    .unwrap();

    let inserted = users
        .insert([("name", Value::from("Paul")), ("age", Value::from(19))])
        .unwrap();

    assert_eq!(inserted.id(), 3);
    assert_eq!(users.last_id().unwrap(), 3);
    let ids: Vec<u64> = users.find_all().unwrap().iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn test_insert_fails_once_ids_are_exhausted() {
    let (dir, db) = setup_db();
    create_users(&db);
    fs::write(
        dir.path().join("users.config.json"),
        format!(
            r#"{{"last_id": {}, "schema": {{"id": "integer", "name": "string", "age": "integer"}}}}"#,
            i64::MAX - 1
        ),
    )
    .unwrap();
    let users = db.table("users").unwrap();

    let last = users
        .insert([("name", Value::from("Kamil")), ("age", Value::from(25))])
        .unwrap();
    assert_eq!(last.id(), i64::MAX as u64);
    assert_eq!(last.get("id"), Some(&Value::Integer(i64::MAX)));

    let err = users
        .insert([("name", Value::from("Kriss")), ("age", Value::from(31))])
        .unwrap_err();
    assert!(matches!(err, FlintError::Serialization(_)), "got {:?}", err);
    assert_eq!(users.count().unwrap(), 1);
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_records_and_ids_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let db = Database::open_path(dir.path()).unwrap();
        create_users(&db);
        let users = db.table("users").unwrap();
        for (name, age) in [("Kamil", 25), ("Kriss", 31)] {
            users
                .insert([("name", Value::from(name)), ("age", Value::from(age))])
                .unwrap();
        }
        users.delete(2).unwrap();
    }

    let db = Database::open_path(dir.path()).unwrap();
    let users = db.table("users").unwrap();
    assert_eq!(users.count().unwrap(), 1);

    let inserted = users
        .insert([("name", Value::from("Paul")), ("age", Value::from(19))])
        .unwrap();
    assert_eq!(inserted.id(), 3);
}

#[test]
fn test_custom_file_extension() {
    let dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(dir.path())
        .file_extension("db")
        .build();
    let db = Database::open(config).unwrap();

    create_users(&db);

    assert_eq!(file_names(dir.path()), vec!["users.config.db", "users.data.db"]);
}

#[test]
fn test_in_memory_database_is_isolated() {
    let first = Database::in_memory();
    let second = Database::in_memory();

    create_users(&first);

    assert!(first.exists("users").unwrap());
    assert!(!second.exists("users").unwrap());
}

#[test]
fn test_many_tables_are_independent() {
    let (_dir, db) = setup_db();
    create_users(&db);
    let order = db.create("order", [("total", ColumnType::Float)]).unwrap();

    order.insert([("total", Value::from(9.5))]).unwrap();
    db.remove("users").unwrap();

    assert_eq!(order.count().unwrap(), 1);
    assert_eq!(order.last_id().unwrap(), 1);
}
