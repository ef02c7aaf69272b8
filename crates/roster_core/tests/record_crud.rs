use roster_core::db::migrations::latest_version;
use roster_core::db::open_db_in_memory;
use roster_core::{
    Collection, MemoryRecordRepository, Record, RecordRepository, RecordService, RepoError,
    SqliteRecordRepository,
};
use rusqlite::Connection;
use serde_json::json;

fn sqlite_repo() -> SqliteRecordRepository {
    SqliteRecordRepository::try_new(open_db_in_memory().unwrap()).unwrap()
}

fn check_create_then_read_returns_created_data<R: RecordRepository>(repo: R) {
    let service = RecordService::new(repo, Collection::STUDENTS);

    let input = Record::new("Alpha")
        .with_field("author", "Ada")
        .with_field("grade", json!(7));
    let created = service.create(input.clone()).unwrap();
    assert!(created.has_id());

    let loaded = service.read(&created.id).unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.title, input.title);
    assert_eq!(loaded.fields, input.fields);
}

fn check_update_replaces_all_fields_and_keeps_id<R: RecordRepository>(repo: R) {
    let service = RecordService::new(repo, Collection::TRAINEES);

    let mut original = Record::new("Draft").with_field("author", "Ada");
    original.image_url = Some("/uploads/1-draft.png".to_string());
    let created = service.create(original).unwrap();

    let mut replacement = Record::new("Final").with_field("description", "rewritten");
    replacement.id = "some-other-id".to_string();
    let updated = service.update(&created.id, replacement).unwrap();
    assert_eq!(updated.id, created.id);

    let loaded = service.read(&created.id).unwrap();
    assert_eq!(loaded.title, "Final");
    assert_eq!(loaded.image_url, None);
    assert_eq!(loaded.field_str("author"), None);
    assert_eq!(loaded.field_str("description"), Some("rewritten"));
    assert!(matches!(
        service.read("some-other-id").unwrap_err(),
        RepoError::NotFound { .. }
    ));
}

fn check_delete_then_read_is_not_found<R: RecordRepository>(repo: R) {
    let service = RecordService::new(repo, Collection::STUDENTS);

    let created = service.create(Record::new("Gone soon")).unwrap();
    service.delete(&created.id).unwrap();

    let err = service.read(&created.id).unwrap_err();
    match err {
        RepoError::NotFound { collection, id } => {
            assert_eq!(collection, Collection::STUDENTS);
            assert_eq!(id, created.id);
        }
        other => panic!("unexpected error: {other}"),
    }

    // Deleting again stays silent.
    service.delete(&created.id).unwrap();
}

#[test]
fn sqlite_create_then_read_returns_created_data() {
    check_create_then_read_returns_created_data(sqlite_repo());
}

#[test]
fn memory_create_then_read_returns_created_data() {
    check_create_then_read_returns_created_data(MemoryRecordRepository::new());
}

#[test]
fn sqlite_update_replaces_all_fields_and_keeps_id() {
    check_update_replaces_all_fields_and_keeps_id(sqlite_repo());
}

#[test]
fn memory_update_replaces_all_fields_and_keeps_id() {
    check_update_replaces_all_fields_and_keeps_id(MemoryRecordRepository::new());
}

#[test]
fn sqlite_delete_then_read_is_not_found() {
    check_delete_then_read_is_not_found(sqlite_repo());
}

#[test]
fn memory_delete_then_read_is_not_found() {
    check_delete_then_read_is_not_found(MemoryRecordRepository::new());
}

#[test]
fn create_keeps_caller_supplied_id() {
    let service = RecordService::new(sqlite_repo(), Collection::STUDENTS);

    let mut record = Record::new("Named");
    record.id = "student-42".to_string();
    let created = service.create(record).unwrap();

    assert_eq!(created.id, "student-42");
    assert_eq!(service.read("student-42").unwrap().title, "Named");
}

#[test]
fn update_of_unknown_id_creates_the_record() {
    let service = RecordService::new(sqlite_repo(), Collection::TRAINEES);

    service.update("fresh-id", Record::new("Upserted")).unwrap();

    let loaded = service.read("fresh-id").unwrap();
    assert_eq!(loaded.id, "fresh-id");
    assert_eq!(loaded.title, "Upserted");
}

#[test]
fn collections_do_not_share_records() {
    let conn = open_db_in_memory().unwrap();
    let repo = std::sync::Arc::new(SqliteRecordRepository::try_new(conn).unwrap());
    let students = RecordService::new(repo.clone(), Collection::STUDENTS);
    let trainees = RecordService::new(repo, Collection::TRAINEES);

    let student = students.create(Record::new("Alpha")).unwrap();

    assert!(matches!(
        trainees.read(&student.id).unwrap_err(),
        RepoError::NotFound { .. }
    ));
    assert!(trainees.list(10, None).unwrap().items.is_empty());
}

#[test]
fn corrupt_persisted_body_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO records (collection, id, title, body)
         VALUES ('student', 'broken', 'Broken', '{not json');",
        [],
    )
    .unwrap();
    let repo = SqliteRecordRepository::try_new(conn).unwrap();

    let err = repo.get(Collection::STUDENTS, "broken").unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn body_id_mismatch_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO records (collection, id, title, body)
         VALUES ('student', 'row-id', 'Alpha', '{\"id\":\"other\",\"title\":\"Alpha\"}');",
        [],
    )
    .unwrap();
    let repo = SqliteRecordRepository::try_new(conn).unwrap();

    let err = repo.get(Collection::STUDENTS, "row-id").unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteRecordRepository::try_new(conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_records_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteRecordRepository::try_new(conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("records"))
    ));
}

#[test]
fn repository_rejects_connection_missing_body_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE records (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            title TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteRecordRepository::try_new(conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "records",
            column: "body"
        })
    ));
}
