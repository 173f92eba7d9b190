//! Kiosk Shell Storage Layer
//!
//! SQLite-based persistence with encryption at rest. Secure entries are
//! stored with AES-256-GCM-encrypted values keyed by a device-held master
//! key; entry names are stored as SHA-256 digests so the on-disk table
//! reveals neither keys nor values. A plain `settings` table holds the
//! few values that deliberately stay unencrypted (the first-launch flag).

mod crypto;
mod error;
mod migrations;
mod store;

pub use crypto::MasterKey;
pub use error::StorageError;
pub use store::{SecureKeyValueStore, SecureStore};

pub type Result<T> = std::result::Result<T, StorageError>;
