//! Master key handling and value encryption
//!
//! - AES-256-GCM for value confidentiality and integrity
//! - SHA-256 digests for entry-name confidentiality
//!
//! The key file is a stand-in for a platform keystore: on targets with a
//! hardware-backed keystore the host layer supplies the key material via
//! [`MasterKey::from_bytes`] instead.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::error::StorageError;
use crate::Result;

/// Size of the AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// Size of the AES-GCM nonce in bytes
pub const NONCE_SIZE: usize = 12;

/// Domain separator for entry-name digests
const DIGEST_CONTEXT: &[u8] = b"kiosk-storage/entry-name";

/// Device-held master key protecting all secure entries.
#[derive(Clone)]
pub struct MasterKey {
    bytes: [u8; KEY_SIZE],
}

impl MasterKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Load the key from `path`, generating and persisting one on first use.
    pub fn load_or_generate<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let bytes = std::fs::read(path)?;
            if bytes.len() != KEY_SIZE {
                return Err(StorageError::InvalidKeyFile {
                    expected: KEY_SIZE,
                    found: bytes.len(),
                });
            }

            let mut key = [0u8; KEY_SIZE];
            key.copy_from_slice(&bytes);
            return Ok(Self { bytes: key });
        }

        let key = Self::generate();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, key.bytes)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::info!(path = %path.display(), "Generated new master key");

        Ok(key)
    }

    /// Deterministic digest of an entry name. Lookup works without the
    /// plaintext name ever reaching disk.
    pub fn digest_entry_name(&self, name: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(DIGEST_CONTEXT);
        hasher.update(self.bytes);
        hasher.update([0u8]);
        hasher.update(name.as_bytes());

        let digest = hasher.finalize();
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Encrypt a value, returning the ciphertext and the nonce used.
    pub fn seal(&self, plaintext: &[u8]) -> Result<(Vec<u8>, [u8; NONCE_SIZE])> {
        let cipher = Aes256Gcm::new_from_slice(&self.bytes)
            .map_err(|e| StorageError::Encryption(e.to_string()))?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| StorageError::Encryption(e.to_string()))?;

        Ok((ciphertext, nonce_bytes))
    }

    /// Decrypt a value. Authentication failure surfaces as
    /// [`StorageError::Corrupted`] so callers can recover by treating the
    /// entry as absent.
    pub fn open(&self, ciphertext: &[u8], nonce: &[u8]) -> Result<Vec<u8>> {
        if nonce.len() != NONCE_SIZE {
            return Err(StorageError::Corrupted(format!(
                "nonce has {} bytes, expected {NONCE_SIZE}",
                nonce.len()
            )));
        }

        let cipher = Aes256Gcm::new_from_slice(&self.bytes)
            .map_err(|e| StorageError::Encryption(e.to_string()))?;

        let nonce = Nonce::from_slice(nonce);

        cipher.decrypt(nonce, ciphertext).map_err(|_| {
            StorageError::Corrupted("decryption failed - key mismatch or damaged data".to_string())
        })
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material
        f.debug_struct("MasterKey").finish_non_exhaustive()
    }
}
