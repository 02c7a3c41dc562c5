use chrono::{NaiveDate, NaiveTime};
use lazytask_core::db::open_db_in_memory;
use lazytask_core::{SqliteTaskStore, StoreError, Task, TaskStore};

fn seeded_store(raw_value: &str) -> SqliteTaskStore {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_entries (key, value) VALUES ('todos', ?1);",
        [raw_value],
    )
    .unwrap();
    SqliteTaskStore::new(conn)
}

fn sample_tasks() -> Vec<Task> {
    let mut done = Task::new("pay rent", NaiveDate::from_ymd_opt(2024, 2, 1), None).unwrap();
    done.toggle();
    vec![
        Task::new(
            "dentist",
            NaiveDate::from_ymd_opt(2024, 3, 5),
            NaiveTime::from_hms_opt(14, 30, 0),
        )
        .unwrap(),
        done,
        Task::new("read book", None, None).unwrap(),
    ]
}

#[test]
fn empty_store_loads_empty_collection() {
    let store = SqliteTaskStore::open_in_memory().unwrap();
    assert!(store.load_all().is_empty());
}

#[test]
fn save_then_load_roundtrips_in_order() {
    let store = SqliteTaskStore::open_in_memory().unwrap();
    let tasks = sample_tasks();

    store.save_all(&tasks).unwrap();
    assert_eq!(store.load_all(), tasks);

    let shorter = &tasks[1..];
    store.save_all(shorter).unwrap();
    assert_eq!(store.load_all(), shorter.to_vec());
}

#[test]
fn stored_records_use_wire_field_names() {
    let store = SqliteTaskStore::open_in_memory().unwrap();
    let tasks = sample_tasks();
    store.save_all(&tasks).unwrap();

    let exported: serde_json::Value = serde_json::from_str(&store.export_json().unwrap()).unwrap();
    let first = &exported[0];
    assert_eq!(first["id"], tasks[0].id.to_string());
    assert_eq!(first["text"], "dentist");
    assert_eq!(first["completed"], false);
    assert_eq!(first["date"], "2024-03-05");
    assert_eq!(first["time"], "14:30");
    assert!(exported[2]["date"].is_null());
    assert!(exported[2]["time"].is_null());
}

#[test]
fn corrupt_value_loads_as_empty_but_strict_read_reports_it() {
    let store = seeded_store("{not json");

    assert!(store.load_all().is_empty());
    assert!(matches!(store.try_load_all(), Err(StoreError::Serialize(_))));
}

#[test]
fn records_with_blank_text_are_treated_as_corrupt() {
    let store = seeded_store(
        r#"[{"id":"0190c7d2-0000-7000-8000-000000000001","text":"","completed":false,"date":null,"time":null}]"#,
    );
    assert!(store.load_all().is_empty());
}

#[test]
fn legacy_records_without_optional_fields_load() {
    let store = seeded_store(
        r#"[{"id":"0190c7d2-0000-7000-8000-000000000001","text":"call mom","completed":true}]"#,
    );
    let tasks = store.load_all();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].text, "call mom");
    assert!(tasks[0].completed);
    assert_eq!(tasks[0].date, None);
    assert_eq!(tasks[0].time, None);
}

#[test]
fn import_replaces_collection_and_rejects_bad_documents() {
    let source = SqliteTaskStore::open_in_memory().unwrap();
    source.save_all(&sample_tasks()).unwrap();
    let document = source.export_json().unwrap();

    let target = SqliteTaskStore::open_in_memory().unwrap();
    target
        .save_all(&[Task::new("stale", None, None).unwrap()])
        .unwrap();
    assert_eq!(target.import_json(&document).unwrap(), 3);
    assert_eq!(target.load_all(), source.load_all());

    assert!(target.import_json("[{\"id\":1}]").is_err());
    assert_eq!(target.load_all().len(), 3);
}

#[test]
fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.sqlite3");
    let tasks = sample_tasks();

    SqliteTaskStore::open(&path).unwrap().save_all(&tasks).unwrap();
    assert_eq!(SqliteTaskStore::open(&path).unwrap().load_all(), tasks);
}

#[test]
fn separate_keys_do_not_share_collections() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTaskStore::with_key(conn, "work");
    store
        .save_all(&[Task::new("ship release", None, None).unwrap()])
        .unwrap();
    assert_eq!(store.load_all().len(), 1);
}

#[test]
fn save_rejects_duplicate_ids_and_keeps_previous_collection() {
    let store = SqliteTaskStore::open_in_memory().unwrap();
    let original = sample_tasks();
    store.save_all(&original).unwrap();

    let first = Task::new("first", None, None).unwrap();
    let clash = Task::with_id(first.id, "clash", None, None).unwrap();
    let err = store.save_all(&[first, clash]).unwrap_err();

    assert!(matches!(err, StoreError::InvalidData(message) if message.contains("duplicate")));
    assert_eq!(store.load_all(), original);
}

#[test]
fn save_rejects_blank_text_and_keeps_previous_collection() {
    let store = SqliteTaskStore::open_in_memory().unwrap();
    let original = sample_tasks();
    store.save_all(&original).unwrap();

    let mut blank = Task::new("placeholder", None, None).unwrap();
    blank.text = "   ".to_string();
    let err = store
        .save_all(&[Task::new("fine", None, None).unwrap(), blank])
        .unwrap_err();

    assert!(matches!(err, StoreError::InvalidData(_)));
    assert_eq!(store.load_all(), original);
}

#[test]
fn sub_second_times_roundtrip_exactly() {
    let store = SqliteTaskStore::open_in_memory().unwrap();
    let tasks = vec![Task::new(
        "precise",
        NaiveDate::from_ymd_opt(2024, 1, 1),
        NaiveTime::from_hms_milli_opt(9, 0, 0, 500),
    )
    .unwrap()];

    store.save_all(&tasks).unwrap();
    assert_eq!(store.load_all(), tasks);
}
