//! Async accessors for storing recordings and clinical notes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::types::ToSql;
use rusqlite::Connection;
use tracing::debug;

use clinvault_core::anonymizer::anonymize_with_report;
use clinvault_core::config::{ClinicalConfig, StorageConfig};
use clinvault_core::error::ClinicalError;
use clinvault_core::types::{Partition, RecordId};

use crate::db::{close_connection, open_connection};
use crate::repository;

/// Handle to the local clinical database.
///
/// Holds only the location and settings of the database; no connection is
/// kept between calls. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct ClinicalStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    path: PathBuf,
    config: StorageConfig,
}

impl ClinicalStore {
    /// Create a store for the database file at `path`.
    ///
    /// Nothing is touched on disk until the first call that needs a
    /// connection.
    pub fn new(path: impl Into<PathBuf>, config: StorageConfig) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                path: path.into(),
                config,
            }),
        }
    }

    /// Create a store at the location described by `config`.
    pub fn from_config(config: &ClinicalConfig) -> Self {
        Self::new(config.database_path(), config.storage.clone())
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Open a connection, creating the database and its partitions if they
    /// do not exist yet. The caller is responsible for closing it.
    pub async fn open_connection(&self) -> Result<Connection, ClinicalError> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || open_connection(&inner.path, &inner.config))
            .await
            .map_err(|e| ClinicalError::Open(format!("Open task failed: {}", e)))?
    }

    /// Store an audio recording under a freshly generated key.
    pub async fn store_recording(&self, blob: impl Into<Vec<u8>>) -> Result<RecordId, ClinicalError> {
        let blob = blob.into();
        let bytes = blob.len();
        let id = self.put(Partition::Recordings, blob).await?;
        debug!(%id, bytes, "Stored recording");
        Ok(id)
    }

    /// Anonymize `note` and store the result under a freshly generated key.
    ///
    /// The original text is never written.
    pub async fn store_clinical_note(&self, note: &str) -> Result<RecordId, ClinicalError> {
        let anonymized = anonymize_with_report(note);
        let redactions = anonymized.total();
        let bytes = anonymized.text.len();
        let id = self.put(Partition::Notes, anonymized.text).await?;
        debug!(%id, bytes, redactions, "Stored clinical note");
        Ok(id)
    }

    /// Open a connection, write `value` in a single-partition transaction,
    /// and close the connection whatever the outcome.
    async fn put<V>(&self, partition: Partition, value: V) -> Result<RecordId, ClinicalError>
    where
        V: ToSql + Send + 'static,
    {
        let id = RecordId::new();
        let inner = Arc::clone(&self.inner);

        tokio::task::spawn_blocking(move || {
            let mut conn = open_connection(&inner.path, &inner.config)?;
            let outcome = repository::put(&mut conn, partition, &id, value);
            close_connection(conn, &inner.path);
            outcome
        })
        .await
        .map_err(|e| ClinicalError::Transaction(format!("Write task failed: {}", e)))??;

        Ok(id)
    }
}
