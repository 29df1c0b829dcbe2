//! Runtime error types.

use herald_core::FinderError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while wiring or using a [`HeraldRuntime`](crate::HeraldRuntime).
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Handler resolution failed.
    #[error("Resolution error: {0}")]
    Finder(#[from] FinderError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
