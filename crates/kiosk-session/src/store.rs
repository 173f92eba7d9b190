//! Session Store
//!
//! Persists the single session record as three entries in the secure
//! store, mirroring the layout the host platforms share:
//! `session_url`, `session_timestamp` and `session_timeout` (both epoch
//! millis; `session_timeout` is the expiry instant, not a duration).
//!
//! Writes are confirmed before the call returns. Concurrent writers are
//! last-writer-wins; the intended owner is a single interactive control
//! path.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use kiosk_storage::SecureKeyValueStore;

use crate::clock::{Clock, SystemClock};
use crate::error::SessionError;
use crate::record::SessionRecord;
use crate::Result;

const KEY_SESSION_URL: &str = "session_url";
const KEY_SESSION_TIMESTAMP: &str = "session_timestamp";
const KEY_SESSION_TIMEOUT: &str = "session_timeout";

/// Validity window added to the save instant to compute expiry.
pub const DEFAULT_VALIDITY_HOURS: i64 = 24;

pub struct SessionStore {
    store: Arc<dyn SecureKeyValueStore>,
    clock: Arc<dyn Clock>,
    validity: Duration,
}

impl SessionStore {
    pub fn new(store: Arc<dyn SecureKeyValueStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn SecureKeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            validity: Duration::hours(DEFAULT_VALIDITY_HOURS),
        }
    }

    pub fn with_validity_window(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }

    pub fn validity_window(&self) -> Duration {
        self.validity
    }

    /// Save `url` as the sole session record, replacing any prior one.
    /// Expiry is recomputed from the current instant.
    pub fn save_session(&self, url: &str) -> Result<SessionRecord> {
        if url.trim().is_empty() {
            return Err(SessionError::EmptyUrl);
        }

        let now = self.clock.now();
        let record = SessionRecord::new(url.to_string(), now, self.validity);

        self.store.put(KEY_SESSION_URL, &record.url)?;
        self.store.put(
            KEY_SESSION_TIMESTAMP,
            &record.created_at.timestamp_millis().to_string(),
        )?;
        self.store.put(
            KEY_SESSION_TIMEOUT,
            &record.expires_at.timestamp_millis().to_string(),
        )?;

        tracing::debug!(expires_at = %record.expires_at, "Saved session");

        Ok(record)
    }

    /// The persisted URL, independent of expiry. Any storage fault reads
    /// as "no session".
    pub fn saved_url(&self) -> Option<String> {
        self.load().map(|record| record.url)
    }

    /// True iff a record exists, its URL is present, and now is before
    /// expiry. Never raises.
    pub fn is_session_valid(&self) -> bool {
        self.load()
            .map(|record| record.is_valid_at(self.clock.now()))
            .unwrap_or(false)
    }

    /// Push expiry forward to `now + validity_window`, leaving the URL and
    /// creation time untouched. Explicitly a no-op when no record exists;
    /// returns whether an extension happened.
    pub fn extend_session(&self) -> Result<bool> {
        let Some(record) = self.load() else {
            tracing::debug!("extend_session with no saved record, ignoring");
            return Ok(false);
        };

        if record.url.is_empty() {
            tracing::debug!("extend_session with empty URL, ignoring");
            return Ok(false);
        }

        let new_expiry = self.clock.now() + self.validity;
        self.store
            .put(KEY_SESSION_TIMEOUT, &new_expiry.timestamp_millis().to_string())?;

        tracing::debug!(expires_at = %new_expiry, "Extended session");

        Ok(true)
    }

    /// Remove the session record. Idempotent.
    pub fn clear_session(&self) -> Result<()> {
        self.store.remove(KEY_SESSION_URL)?;
        self.store.remove(KEY_SESSION_TIMESTAMP)?;
        self.store.remove(KEY_SESSION_TIMEOUT)?;

        tracing::debug!("Cleared session");

        Ok(())
    }

    /// Time elapsed since the session was saved; zero when no record
    /// exists or on any storage fault.
    pub fn session_age(&self) -> Duration {
        match self.load() {
            Some(record) if record.created_at.timestamp_millis() > 0 => {
                record.age_at(self.clock.now())
            }
            _ => Duration::zero(),
        }
    }

    /// The full record, when one exists and the store is readable.
    pub fn current_record(&self) -> Option<SessionRecord> {
        self.load()
    }

    /// Read the persisted entries back into a record. Corruption is
    /// recovered locally: the store is wiped and treated as empty, so
    /// callers fall back to manual authentication instead of failing.
    fn load(&self) -> Option<SessionRecord> {
        let url = match self.store.get(KEY_SESSION_URL) {
            Ok(Some(url)) => url,
            Ok(None) => return None,
            Err(e) => return self.recover(e),
        };

        let created_at = match self.read_millis(KEY_SESSION_TIMESTAMP) {
            Ok(value) => value,
            Err(e) => return self.recover(e),
        };
        let expires_at = match self.read_millis(KEY_SESSION_TIMEOUT) {
            Ok(value) => value,
            Err(e) => return self.recover(e),
        };

        Some(SessionRecord {
            url,
            created_at,
            expires_at,
        })
    }

    /// Missing timestamps read as the epoch, which is in the past and so
    /// never validates.
    fn read_millis(&self, key: &str) -> std::result::Result<DateTime<Utc>, kiosk_storage::StorageError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(DateTime::<Utc>::UNIX_EPOCH);
        };

        let millis: i64 = raw.parse().map_err(|_| {
            kiosk_storage::StorageError::Corrupted(format!("{key} is not an integer"))
        })?;

        DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
            kiosk_storage::StorageError::Corrupted(format!("{key} is out of range"))
        })
    }

    fn recover(&self, error: kiosk_storage::StorageError) -> Option<SessionRecord> {
        if error.is_corruption() {
            tracing::warn!(%error, "Session store corrupted, treating as empty");
            if let Err(e) = self.clear_session() {
                tracing::warn!(%e, "Failed to wipe corrupted session store");
            }
        } else {
            tracing::warn!(%error, "Session store unreadable, treating as empty");
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use kiosk_storage::{MasterKey, SecureStore, StorageError};

    fn manual_clock() -> Arc<ManualClock> {
        // Align to millis so timestamps round-trip through the store exactly.
        let now = DateTime::<Utc>::from_timestamp_millis(Utc::now().timestamp_millis()).unwrap();
        Arc::new(ManualClock::new(now))
    }

    fn test_store(clock: Arc<ManualClock>) -> SessionStore {
        let secure = SecureStore::open_in_memory(MasterKey::generate()).unwrap();
        SessionStore::with_clock(Arc::new(secure), clock)
    }

    #[test]
    fn test_save_then_read_back() {
        let sessions = test_store(manual_clock());

        sessions.save_session("https://app.example/dashboard").unwrap();

        assert_eq!(
            sessions.saved_url().as_deref(),
            Some("https://app.example/dashboard")
        );
        assert!(sessions.is_session_valid());
    }

    #[test]
    fn test_empty_url_rejected() {
        let sessions = test_store(manual_clock());

        assert!(matches!(
            sessions.save_session(""),
            Err(SessionError::EmptyUrl)
        ));
        assert!(matches!(
            sessions.save_session("   "),
            Err(SessionError::EmptyUrl)
        ));
        assert!(sessions.saved_url().is_none());
    }

    #[test]
    fn test_expiry_at_window_boundary() {
        let clock = manual_clock();
        let sessions = test_store(Arc::clone(&clock));

        sessions.save_session("https://app.example/dashboard").unwrap();

        clock.advance(Duration::hours(23) + Duration::minutes(59));
        assert!(sessions.is_session_valid());

        clock.advance(Duration::minutes(2)); // now at 24h01m
        assert!(!sessions.is_session_valid());

        // URL survives expiry
        assert_eq!(
            sessions.saved_url().as_deref(),
            Some("https://app.example/dashboard")
        );
    }

    #[test]
    fn test_fresh_store_is_empty() {
        let sessions = test_store(manual_clock());

        assert!(sessions.saved_url().is_none());
        assert!(!sessions.is_session_valid());
        assert_eq!(sessions.session_age(), Duration::zero());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let sessions = test_store(manual_clock());

        sessions.save_session("https://app.example/").unwrap();
        sessions.clear_session().unwrap();
        sessions.clear_session().unwrap();

        assert!(sessions.saved_url().is_none());
        assert!(!sessions.is_session_valid());
    }

    #[test]
    fn test_extend_pushes_expiry_forward() {
        let clock = manual_clock();
        let sessions = test_store(Arc::clone(&clock));

        let record = sessions.save_session("https://app.example/").unwrap();
        let first_expiry = record.expires_at;

        clock.advance(Duration::hours(6));
        assert!(sessions.extend_session().unwrap());

        let extended = sessions.current_record().unwrap();
        assert!(extended.expires_at > first_expiry);
        assert_eq!(extended.expires_at, clock.now() + Duration::hours(24));

        // URL and creation time untouched
        assert_eq!(extended.url, record.url);
        assert_eq!(extended.created_at, record.created_at);

        // Still valid past the first expiry
        clock.advance(Duration::hours(20));
        assert!(sessions.is_session_valid());
    }

    #[test]
    fn test_extend_on_empty_store_is_noop() {
        let sessions = test_store(manual_clock());

        assert!(!sessions.extend_session().unwrap());

        // No dangling expiry without a URL
        assert!(sessions.saved_url().is_none());
        assert!(!sessions.is_session_valid());
    }

    #[test]
    fn test_session_age() {
        let clock = manual_clock();
        let sessions = test_store(Arc::clone(&clock));

        sessions.save_session("https://app.example/").unwrap();
        clock.advance(Duration::minutes(90));

        assert_eq!(sessions.session_age(), Duration::minutes(90));
    }

    #[test]
    fn test_custom_validity_window() {
        let clock = manual_clock();
        let secure = SecureStore::open_in_memory(MasterKey::generate()).unwrap();
        let sessions = SessionStore::with_clock(Arc::new(secure), Arc::clone(&clock) as Arc<dyn Clock>)
            .with_validity_window(Duration::minutes(30));

        sessions.save_session("https://app.example/").unwrap();

        clock.advance(Duration::minutes(29));
        assert!(sessions.is_session_valid());

        clock.advance(Duration::minutes(2));
        assert!(!sessions.is_session_valid());
    }

    /// Store whose reads always fail, for the recover-local policy.
    struct BrokenStore;

    impl SecureKeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> kiosk_storage::Result<Option<String>> {
            Err(StorageError::Corrupted("bad ciphertext".to_string()))
        }

        fn put(&self, _key: &str, _value: &str) -> kiosk_storage::Result<()> {
            Ok(())
        }

        fn remove(&self, _key: &str) -> kiosk_storage::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_corruption_reads_as_no_session() {
        let sessions = SessionStore::with_clock(Arc::new(BrokenStore), manual_clock());

        assert!(sessions.saved_url().is_none());
        assert!(!sessions.is_session_valid());
        assert_eq!(sessions.session_age(), Duration::zero());
        assert!(!sessions.extend_session().unwrap());
    }

    #[test]
    fn test_garbage_timestamp_reads_as_no_session() {
        let secure = SecureStore::open_in_memory(MasterKey::generate()).unwrap();
        let sessions =
            SessionStore::with_clock(Arc::new(secure.clone()), manual_clock());

        sessions.save_session("https://app.example/").unwrap();
        secure.put("session_timestamp", "not-a-number").unwrap();

        assert!(sessions.saved_url().is_none());
        assert!(!sessions.is_session_valid());

        // Recovery wiped the record entirely
        assert!(secure.get("session_url").unwrap().is_none());
    }
}
