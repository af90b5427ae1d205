//! Integration tests for the recording and clinical note accessors.
//!
//! Each test gets its own temporary database directory. Stored rows are
//! inspected with plain rusqlite queries, since the store exposes no
//! read-back operation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;
use tempfile::TempDir;

use clinvault_core::anonymizer::anonymize;
use clinvault_core::config::{ClinicalConfig, StorageConfig};
use clinvault_core::error::ClinicalError;
use clinvault_core::types::{Partition, SCHEMA_VERSION};
use clinvault_storage::{partition_exists, schema_version, ClinicalStore};

// =============================================================================
// Helpers
// =============================================================================

fn make_store() -> (TempDir, ClinicalStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = ClinicalStore::new(db_path(&dir), StorageConfig::default());
    (dir, store)
}

fn db_path(dir: &TempDir) -> PathBuf {
    dir.path().join("data").join("clinicalData.sqlite3")
}

fn count_rows(path: &Path, partition: Partition) -> i64 {
    let conn = Connection::open(path).unwrap();
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", partition.name()),
        [],
        |row| row.get(0),
    )
    .unwrap()
}

fn read_note(path: &Path, key: &str) -> String {
    let conn = Connection::open(path).unwrap();
    conn.query_row("SELECT value FROM notes WHERE key = ?1", [key], |row| {
        row.get(0)
    })
    .unwrap()
}

/// A store whose database directory cannot be created.
fn unavailable_store() -> (TempDir, ClinicalStore) {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let store = ClinicalStore::new(blocker.join("clinicalData.sqlite3"), StorageConfig::default());
    (dir, store)
}

// =============================================================================
// Recordings
// =============================================================================

#[tokio::test]
async fn test_store_recording_persists_blob() {
    let (dir, store) = make_store();
    let blob = vec![0x52u8, 0x49, 0x46, 0x46, 0x00, 0xff];

    let id = store.store_recording(blob.clone()).await.unwrap();

    let conn = Connection::open(db_path(&dir)).unwrap();
    let stored: Vec<u8> = conn
        .query_row(
            "SELECT value FROM recordings WHERE key = ?1",
            [id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored, blob);
    assert_eq!(count_rows(&db_path(&dir), Partition::Notes), 0);
}

#[tokio::test]
async fn test_store_recording_accepts_slices() {
    let (dir, store) = make_store();
    let data: &[u8] = b"chunk";
    store.store_recording(data).await.unwrap();
    assert_eq!(count_rows(&db_path(&dir), Partition::Recordings), 1);
}

#[tokio::test]
async fn test_recording_ids_unique_over_many_calls() {
    let (dir, store) = make_store();
    let mut ids = HashSet::new();

    for i in 0..10_000u32 {
        let id = store.store_recording(i.to_le_bytes().to_vec()).await.unwrap();
        assert!(ids.insert(id), "duplicate id {}", id);
    }

    assert_eq!(count_rows(&db_path(&dir), Partition::Recordings), 10_000);
}

// =============================================================================
// Clinical notes
// =============================================================================

#[tokio::test]
async fn test_store_clinical_note_persists_anonymized_text() {
    let (dir, store) = make_store();
    let note = "John Smith called from 12345678 about his results";

    let id = store.store_clinical_note(note).await.unwrap();

    let stored = read_note(&db_path(&dir), &id.to_string());
    assert_eq!(stored, "[NAME] called from [PHONE] about his results");
    assert_eq!(stored, anonymize(note));
}

#[tokio::test]
async fn test_store_clinical_note_never_persists_original() {
    let (dir, store) = make_store();
    let notes = [
        "Anna Hansen was seen today",
        "CPR 0101901234 verified",
        "reach the daughter on 87654321",
        "results sent to lab@rigshospitalet.dk",
        "moved to 2100 København last year",
    ];

    for note in notes {
        store.store_clinical_note(note).await.unwrap();
    }

    let conn = Connection::open(db_path(&dir)).unwrap();
    let mut stmt = conn.prepare("SELECT value FROM notes").unwrap();
    let stored: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(stored.len(), notes.len());
    for note in notes {
        assert!(!stored.iter().any(|s| s == note), "original stored: {}", note);
    }
}

#[tokio::test]
async fn test_store_clinical_note_empty_text() {
    let (dir, store) = make_store();
    let id = store.store_clinical_note("").await.unwrap();
    assert_eq!(read_note(&db_path(&dir), &id.to_string()), "");
}

#[tokio::test]
async fn test_note_ids_unique_over_many_calls() {
    let (dir, store) = make_store();
    let mut ids = HashSet::new();

    for i in 0..10_000u32 {
        let id = store
            .store_clinical_note(&format!("follow-up {}", i))
            .await
            .unwrap();
        assert!(ids.insert(id), "duplicate id {}", id);
    }

    assert_eq!(count_rows(&db_path(&dir), Partition::Notes), 10_000);
}

// =============================================================================
// Connection opener
// =============================================================================

#[tokio::test]
async fn test_open_connection_twice() {
    let (_dir, store) = make_store();

    let first = store.open_connection().await.unwrap();
    drop(first);
    let second = store.open_connection().await.unwrap();

    assert_eq!(schema_version(&second).unwrap(), SCHEMA_VERSION);
    assert!(partition_exists(&second, Partition::Recordings).unwrap());
    assert!(partition_exists(&second, Partition::Notes).unwrap());
}

#[tokio::test]
async fn test_open_connection_while_another_is_open() {
    let (_dir, store) = make_store();

    let held = store.open_connection().await.unwrap();
    let other = store.open_connection().await.unwrap();

    assert_eq!(schema_version(&held).unwrap(), SCHEMA_VERSION);
    assert_eq!(schema_version(&other).unwrap(), SCHEMA_VERSION);
}

#[tokio::test]
async fn test_store_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ClinicalConfig::default();
    config.general.data_dir = dir.path().join("vault").to_string_lossy().into_owned();

    let store = ClinicalStore::from_config(&config);
    store.store_recording(vec![1u8, 2, 3]).await.unwrap();

    let expected = dir.path().join("vault").join("clinicalData.sqlite3");
    assert_eq!(store.path(), expected.as_path());
    assert_eq!(count_rows(&expected, Partition::Recordings), 1);
}

// =============================================================================
// Failure propagation
// =============================================================================

#[tokio::test]
async fn test_store_recording_rejects_when_unavailable() {
    let (_dir, store) = unavailable_store();

    let result = tokio::time::timeout(Duration::from_secs(10), store.store_recording(vec![1u8]))
        .await
        .expect("store_recording hung");
    let err = result.unwrap_err();
    assert!(err.is_open_failure(), "unexpected error: {:?}", err);
}

#[tokio::test]
async fn test_store_clinical_note_rejects_when_unavailable() {
    let (_dir, store) = unavailable_store();

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        store.store_clinical_note("Anna Hansen"),
    )
    .await
    .expect("store_clinical_note hung");
    assert!(result.unwrap_err().is_open_failure());
}

#[tokio::test]
async fn test_open_connection_rejects_newer_schema() {
    let (dir, store) = make_store();
    let path = db_path(&dir);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    {
        let conn = Connection::open(&path).unwrap();
        conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1)
            .unwrap();
    }

    let err = store.store_clinical_note("note").await.unwrap_err();
    assert!(matches!(err, ClinicalError::VersionMismatch { .. }));
}

#[tokio::test]
async fn test_store_clinical_note_fails_while_partition_locked() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        busy_timeout_ms: 0,
        ..StorageConfig::default()
    };
    let store = ClinicalStore::new(db_path(&dir), config);

    // Create the file and partitions, then hold the write lock elsewhere.
    drop(store.open_connection().await.unwrap());
    let holder = Connection::open(db_path(&dir)).unwrap();
    holder
        .execute_batch(
            "BEGIN IMMEDIATE;
             INSERT INTO notes (key, value) VALUES ('held', 'pending');",
        )
        .unwrap();

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        store.store_clinical_note("Anna Hansen"),
    )
    .await
    .expect("store_clinical_note hung");
    let err = result.unwrap_err();
    assert!(matches!(err, ClinicalError::Transaction(_)), "unexpected error: {:?}", err);

    holder.execute_batch("ROLLBACK;").unwrap();
    drop(holder);
    assert_eq!(count_rows(&db_path(&dir), Partition::Notes), 0);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writes_on_fresh_database() {
    let (dir, store) = make_store();

    let mut handles = Vec::new();
    for i in 0..32u32 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                store.store_recording(i.to_le_bytes().to_vec()).await
            } else {
                store.store_clinical_note(&format!("Karen Jensen visit {}", i)).await
            }
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        let id = handle.await.unwrap().unwrap();
        assert!(ids.insert(id));
    }

    let path = db_path(&dir);
    assert_eq!(count_rows(&path, Partition::Recordings), 16);
    assert_eq!(count_rows(&path, Partition::Notes), 16);
}
