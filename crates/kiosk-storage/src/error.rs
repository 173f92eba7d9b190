//! Storage error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Stored value is corrupted: {0}")]
    Corrupted(String),

    #[error("Master key file is invalid: expected {expected} bytes, found {found}")]
    InvalidKeyFile { expected: usize, found: usize },
}

impl StorageError {
    /// Whether this failure means the stored bytes cannot be trusted
    /// (tampering, key mismatch, or on-disk damage) as opposed to the
    /// storage medium being unavailable.
    pub fn is_corruption(&self) -> bool {
        matches!(self, StorageError::Corrupted(_))
    }
}
