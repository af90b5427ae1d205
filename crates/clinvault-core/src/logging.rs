//! Tracing subscriber bootstrap.

use tracing_subscriber::EnvFilter;

use crate::config::GeneralConfig;
use crate::error::{ClinicalError, Result};

/// Install a global fmt subscriber.
///
/// `RUST_LOG` takes precedence over `general.log_level`. Calling this when a
/// global subscriber is already set is a no-op.
pub fn init(general: &GeneralConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&general.log_level).map_err(|e| {
            ClinicalError::Config(format!("Invalid log level '{}': {}", general.log_level, e))
        })?,
    };

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
    {
        tracing::info!("Starting clinvault v{}", env!("CARGO_PKG_VERSION"));
    }
    Ok(())
}
