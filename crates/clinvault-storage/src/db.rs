//! Connection opener.
//!
//! Opens (or creates) the database file, applies the connection PRAGMAs and
//! makes sure both partitions exist before handing the connection out.

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;
use tracing::{debug, warn};

use clinvault_core::config::StorageConfig;
use clinvault_core::error::ClinicalError;

use crate::migrations;

/// Open a connection to the database at `path`, creating the file and its
/// partitions on first use.
///
/// The caller owns the returned connection and is expected to close it once
/// its transaction has completed.
pub fn open_connection(path: &Path, config: &StorageConfig) -> Result<Connection, ClinicalError> {
    // Ensure parent directory exists.
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut conn = Connection::open(path)
        .map_err(|e| ClinicalError::Open(format!("Failed to open database: {}", e)))?;

    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|e| ClinicalError::Open(format!("Failed to set busy timeout: {}", e)))?;

    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )
    .map_err(|e| ClinicalError::Open(format!("Failed to set pragmas: {}", e)))?;

    migrations::ensure_schema(&mut conn)?;

    debug!("Database opened at {}", path.display());
    Ok(conn)
}

/// Close a connection, logging instead of failing if SQLite refuses.
///
/// Used after the outcome of a write is already known, so a close error
/// must not replace it.
pub fn close_connection(conn: Connection, path: &Path) {
    if let Err((_conn, e)) = conn.close() {
        warn!("Failed to close database {}: {}", path.display(), e);
    }
}
