//! Database schema versioning.
//!
//! The schema version lives in `PRAGMA user_version`. A database below the
//! current version is upgraded by creating whichever partitions are
//! missing; a database above it is refused.

use rusqlite::{Connection, TransactionBehavior};
use tracing::info;

use clinvault_core::error::ClinicalError;
use clinvault_core::types::{Partition, SCHEMA_VERSION};

/// Read the schema version stored in the database header.
pub fn schema_version(conn: &Connection) -> Result<i64, ClinicalError> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| ClinicalError::Open(format!("Failed to query schema version: {}", e)))
}

/// Whether the table backing `partition` exists.
pub fn partition_exists(conn: &Connection, partition: Partition) -> Result<bool, ClinicalError> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [partition.name()],
            |row| row.get(0),
        )
        .map_err(|e| {
            ClinicalError::Open(format!("Failed to inspect partition {}: {}", partition, e))
        })?;
    Ok(count > 0)
}

/// Bring the database up to [`SCHEMA_VERSION`].
///
/// Safe to call on every open. The upgrade runs inside an IMMEDIATE
/// transaction and re-reads the version under the write lock, so two
/// connections racing on a fresh file do not both create partitions.
pub fn ensure_schema(conn: &mut Connection) -> Result<(), ClinicalError> {
    let found = schema_version(conn)?;
    check_not_newer(found)?;
    if found == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| ClinicalError::Open(format!("Failed to begin upgrade: {}", e)))?;

    let found = schema_version(&tx)?;
    check_not_newer(found)?;
    if found < SCHEMA_VERSION {
        for partition in Partition::ALL {
            if !partition_exists(&tx, partition)? {
                create_partition(&tx, partition)?;
                info!("Created partition {}", partition);
            }
        }
        tx.pragma_update(None, "user_version", SCHEMA_VERSION)
            .map_err(|e| ClinicalError::Open(format!("Failed to set schema version: {}", e)))?;
    }

    tx.commit()
        .map_err(|e| ClinicalError::Open(format!("Failed to commit upgrade: {}", e)))?;

    if found < SCHEMA_VERSION {
        info!("Upgraded schema from v{} to v{}", found, SCHEMA_VERSION);
    }
    Ok(())
}

fn check_not_newer(found: i64) -> Result<(), ClinicalError> {
    if found > SCHEMA_VERSION {
        return Err(ClinicalError::VersionMismatch {
            found,
            expected: SCHEMA_VERSION,
        });
    }
    Ok(())
}

fn create_partition(conn: &Connection, partition: Partition) -> Result<(), ClinicalError> {
    let value_type = match partition {
        Partition::Recordings => "BLOB",
        Partition::Notes => "TEXT",
    };
    let sql = format!(
        "CREATE TABLE {} (
            key     TEXT PRIMARY KEY NOT NULL,
            value   {} NOT NULL
        )",
        partition.name(),
        value_type
    );
    conn.execute_batch(&sql).map_err(|e| {
        ClinicalError::Open(format!("Failed to create partition {}: {}", partition, e))
    })
}
