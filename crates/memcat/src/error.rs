//! Error types for memcat

use thiserror::Error;

use crate::backend::BackendError;

/// Main error type for memcat operations outside the categorization pipeline
#[derive(Error, Debug)]
pub enum MemcatError {
    /// Configuration errors (unreadable file, bad TOML, invalid host)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inference backend errors surfaced while constructing a client
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Result type alias for memcat operations
pub type Result<T> = std::result::Result<T, MemcatError>;
