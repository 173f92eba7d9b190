//! Session record

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Last successfully authenticated destination
    pub url: String,
    /// When the session was saved
    pub created_at: DateTime<Utc>,
    /// Instant the session stops being valid
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(url: String, created_at: DateTime<Utc>, validity: Duration) -> Self {
        Self {
            url,
            created_at,
            expires_at: created_at + validity,
        }
    }

    /// Valid iff the URL is present and `now` is before expiry.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.url.is_empty() && now < self.expires_at
    }

    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now - self.created_at
    }
}
