//! Storage error types

use thiserror::Error;

/// Errors from channel and settings persistence
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing a file failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A file's contents were not valid JSON
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document parsed but is not the expected shape
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// No platform configuration directory is available
    #[error("no configuration directory available")]
    NoConfigDir,
}

/// Convenience result alias for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;
