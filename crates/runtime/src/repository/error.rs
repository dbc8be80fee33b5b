//! Error types raised by result sinks.

use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("result sink lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted record at line {line}: {reason}")]
    CorruptedData { line: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
