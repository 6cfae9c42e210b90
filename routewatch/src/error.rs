//! Crate-level error type.

use thiserror::Error;

use crate::cache::StoreError;
use crate::config::ConfigError;
use crate::logging::LoggingError;

/// Any error the core can return.
///
/// Geometry and policy functions never fail; they return `Option` or
/// `bool`. Errors only come from storage, configuration and logging setup.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Cache storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging setup error: {0}")]
    Logging(#[from] LoggingError),
}

/// Result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
