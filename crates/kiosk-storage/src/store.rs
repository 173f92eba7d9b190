//! Secure key-value store
//!
//! The storage capability the session layer builds on. `SecureStore` is
//! the SQLite-backed implementation; hosts with an OS keychain or another
//! encrypted backend implement [`SecureKeyValueStore`] themselves.

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

use crate::crypto::MasterKey;
use crate::error::StorageError;
use crate::migrations::run_migrations;
use crate::Result;

/// Encrypted-at-rest key-value storage on string keys and values.
///
/// Implementations must guarantee the write is durable before `put`
/// returns. Reads never observe a partially written entry.
pub trait SecureKeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// SQLite-backed [`SecureKeyValueStore`] with AES-256-GCM value encryption.
pub struct SecureStore {
    conn: Arc<Mutex<Connection>>,
    key: MasterKey,
}

impl SecureStore {
    pub fn open<P: AsRef<Path>>(path: P, key: MasterKey) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode keeps writers from blocking readers
        let _: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            key,
        })
    }

    pub fn open_in_memory(key: MasterKey) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            key,
        })
    }

    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    // === Plain settings (unencrypted by design) ===

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        self.with_connection(|conn| {
            let value = conn
                .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(value)
        })
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let updated_at = Utc::now().to_rfc3339();
        self.with_connection(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![key, value, updated_at],
            )?;
            Ok(())
        })?;

        Ok(())
    }
}

impl SecureKeyValueStore for SecureStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let digest = self.key.digest_entry_name(key);

        let row: Option<(Vec<u8>, Vec<u8>)> = self.with_connection(|conn| {
            let row = conn
                .query_row(
                    "SELECT nonce, ciphertext FROM secure_values WHERE key_digest = ?1",
                    [&digest],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            Ok(row)
        })?;

        let Some((nonce, ciphertext)) = row else {
            return Ok(None);
        };

        let plaintext = self.key.open(&ciphertext, &nonce)?;
        let value = String::from_utf8(plaintext)
            .map_err(|_| StorageError::Corrupted("entry is not valid UTF-8".to_string()))?;

        Ok(Some(value))
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let digest = self.key.digest_entry_name(key);
        let (ciphertext, nonce) = self.key.seal(value.as_bytes())?;
        let updated_at = Utc::now().to_rfc3339();

        self.with_connection(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO secure_values
                 (key_digest, nonce, ciphertext, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![digest, nonce.as_slice(), ciphertext, updated_at],
            )?;
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        let digest = self.key.digest_entry_name(key);

        self.with_connection(|conn| {
            conn.execute("DELETE FROM secure_values WHERE key_digest = ?1", [&digest])?;
            Ok(())
        })
    }
}

impl Clone for SecureStore {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            key: self.key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> SecureStore {
        SecureStore::open_in_memory(MasterKey::generate()).unwrap()
    }

    #[test]
    fn test_put_get_roundtrip() {
        let store = test_store();

        store.put("session_url", "https://app.example/dashboard").unwrap();

        let value = store.get("session_url").unwrap();
        assert_eq!(value.as_deref(), Some("https://app.example/dashboard"));
    }

    #[test]
    fn test_get_missing_returns_none() {
        let store = test_store();
        assert!(store.get("session_url").unwrap().is_none());
    }

    #[test]
    fn test_put_replaces_prior_value() {
        let store = test_store();

        store.put("session_url", "https://a.example/").unwrap();
        store.put("session_url", "https://b.example/").unwrap();

        assert_eq!(
            store.get("session_url").unwrap().as_deref(),
            Some("https://b.example/")
        );
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = test_store();

        store.put("session_url", "https://a.example/").unwrap();
        store.remove("session_url").unwrap();
        store.remove("session_url").unwrap();

        assert!(store.get("session_url").unwrap().is_none());
    }

    #[test]
    fn test_values_are_encrypted_on_disk() {
        let store = test_store();
        store.put("session_url", "https://app.example/dashboard").unwrap();

        // Neither the entry name nor the value appears in the table
        store
            .with_connection(|conn| {
                let mut stmt =
                    conn.prepare("SELECT key_digest, ciphertext FROM secure_values")?;
                let rows: Vec<(String, Vec<u8>)> = stmt
                    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .filter_map(|r| r.ok())
                    .collect();

                assert_eq!(rows.len(), 1);
                let (digest, ciphertext) = &rows[0];
                assert_ne!(digest, "session_url");
                assert!(!ciphertext
                    .windows(b"app.example".len())
                    .any(|w| w == b"app.example"));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_tampered_entry_reads_as_corrupted() {
        let store = test_store();
        store.put("session_url", "https://app.example/").unwrap();

        store
            .with_connection(|conn| {
                conn.execute("UPDATE secure_values SET ciphertext = x'00'", [])?;
                Ok(())
            })
            .unwrap();

        let err = store.get("session_url").unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_settings_are_plain() {
        let store = test_store();

        store.set_setting("first_launch", "false").unwrap();
        assert_eq!(
            store.get_setting("first_launch").unwrap().as_deref(),
            Some("false")
        );
        assert!(store.get_setting("missing").unwrap().is_none());
    }
}
