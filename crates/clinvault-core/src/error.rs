use thiserror::Error;

/// Top-level error type for clinvault.
///
/// Storage failures are split by where they happen: opening the database,
/// writing a single value, or beginning/committing the transaction around
/// it. The message of the underlying store error is carried verbatim.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClinicalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Open error: {0}")]
    Open(String),

    #[error("Schema version {found} is newer than supported version {expected}")]
    VersionMismatch { found: i64, expected: i64 },

    #[error("Write error: {0}")]
    Write(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClinicalError {
    /// True for failures raised while obtaining a connection.
    pub fn is_open_failure(&self) -> bool {
        matches!(
            self,
            ClinicalError::Open(_) | ClinicalError::VersionMismatch { .. } | ClinicalError::Io(_)
        )
    }
}

impl From<toml::de::Error> for ClinicalError {
    fn from(err: toml::de::Error) -> Self {
        ClinicalError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ClinicalError {
    fn from(err: toml::ser::Error) -> Self {
        ClinicalError::Config(err.to_string())
    }
}

/// A specialized `Result` type for clinvault operations.
pub type Result<T> = std::result::Result<T, ClinicalError>;
