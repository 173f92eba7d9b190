//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Storage error: {0}")]
    Storage(#[from] kiosk_storage::StorageError),

    #[error("Session error: {0}")]
    Session(#[from] kiosk_session::SessionError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication aborted: {0}")]
    AuthenticationAborted(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for ShellError {
    fn from(e: std::io::Error) -> Self {
        ShellError::Config(e.to_string())
    }
}
