//! Single-partition writes.

use rusqlite::types::ToSql;
use rusqlite::{Connection, TransactionBehavior};

use clinvault_core::error::ClinicalError;
use clinvault_core::types::{Partition, RecordId};

/// Write `value` under `key` in one readwrite transaction scoped to
/// `partition`.
///
/// There is no pre-check for an existing key; a collision is rejected by the
/// primary key and surfaces as [`ClinicalError::Write`].
pub fn put<V: ToSql>(
    conn: &mut Connection,
    partition: Partition,
    key: &RecordId,
    value: V,
) -> Result<(), ClinicalError> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| {
            ClinicalError::Transaction(format!("Failed to begin {} transaction: {}", partition, e))
        })?;

    let sql = format!("INSERT INTO {} (key, value) VALUES (?1, ?2)", partition.name());
    tx.execute(&sql, rusqlite::params![key.to_string(), value])
        .map_err(|e| ClinicalError::Write(format!("Failed to write to {}: {}", partition, e)))?;

    tx.commit().map_err(|e| {
        ClinicalError::Transaction(format!("Failed to commit {} transaction: {}", partition, e))
    })
}
