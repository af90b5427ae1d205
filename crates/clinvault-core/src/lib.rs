pub mod anonymizer;
pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use anonymizer::{anonymize, anonymize_with_report, Anonymized, RedactionKind};
pub use config::{ClinicalConfig, GeneralConfig, StorageConfig};
pub use error::{ClinicalError, Result};
pub use types::*;
