//! Session detection
//!
//! Decides which page loads count as "the user is authenticated":
//! a non-login URL finishing to load, or cookies carrying one of the
//! configured auth markers. Both checks are substring heuristics driven
//! by [`DetectionPolicy`], never hardcoded.

use url::Url;

use crate::config::DetectionPolicy;

pub struct SessionDetector {
    policy: DetectionPolicy,
}

impl SessionDetector {
    pub fn new(policy: DetectionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &DetectionPolicy {
        &self.policy
    }

    /// Whether a finished page load at `url` should be persisted as the
    /// session destination. Login pages never are, and the URL must
    /// actually parse.
    pub fn should_persist_url(&self, url: &str) -> bool {
        if Url::parse(url).is_err() {
            return false;
        }

        let lowered = url.to_lowercase();
        !self
            .policy
            .login_url_markers
            .iter()
            .any(|marker| lowered.contains(&marker.to_lowercase()))
    }

    /// Whether the cookie string carries any of the configured auth
    /// markers (case-sensitive: framework cookie names are).
    pub fn cookies_indicate_auth(&self, cookies: &str) -> bool {
        self.policy
            .auth_cookie_markers
            .iter()
            .any(|marker| cookies.contains(marker.as_str()))
    }
}

impl Default for SessionDetector {
    fn default() -> Self {
        Self::new(DetectionPolicy::default())
    }
}
