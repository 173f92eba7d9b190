//! Session error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session URL cannot be empty")]
    EmptyUrl,

    #[error("Storage error: {0}")]
    Storage(#[from] kiosk_storage::StorageError),
}
