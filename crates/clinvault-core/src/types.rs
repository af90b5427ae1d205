use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Constants
// =============================================================================

/// Default name of the local database.
pub const DATABASE_NAME: &str = "clinicalData";

/// Schema version the partitions are created at.
pub const SCHEMA_VERSION: i64 = 1;

// =============================================================================
// Enums
// =============================================================================

/// One of the two independent key/value partitions of the database.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    /// Raw audio recordings (binary values).
    Recordings,
    /// Anonymized clinical notes (UTF-8 values).
    Notes,
}

impl Partition {
    pub const ALL: [Partition; 2] = [Partition::Recordings, Partition::Notes];

    /// Table name backing this partition.
    pub fn name(self) -> &'static str {
        match self {
            Partition::Recordings => "recordings",
            Partition::Notes => "notes",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Identifiers
// =============================================================================

/// Opaque key of a stored recording or note.
///
/// Generated at write time, never supplied by the caller. Carries no
/// ordering or meaning beyond identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generate a fresh random (v4) identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
