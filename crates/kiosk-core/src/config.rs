//! Shell configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::Result;

/// Session-detection policy: which page loads count as an authenticated
/// session. Substring heuristics, deliberately configurable rather than
/// hardcoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionPolicy {
    /// Cookie-name fragments that indicate an authenticated session
    pub auth_cookie_markers: Vec<String>,
    /// URL fragments that mark a page as a login page (matched
    /// case-insensitively); such URLs are never persisted
    pub login_url_markers: Vec<String>,
}

impl Default for DetectionPolicy {
    fn default() -> Self {
        Self {
            auth_cookie_markers: vec![
                "auth".to_string(),
                "session".to_string(),
                "token".to_string(),
                "AspNetCore".to_string(),
                ".ASPXAUTH".to_string(),
            ],
            login_url_markers: vec!["login".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    /// The single remote destination this shell displays
    pub target_url: String,
    /// Path to the encrypted store database
    pub database_path: PathBuf,
    /// Path to the master key file (stand-in for a platform keystore)
    pub key_path: PathBuf,
    /// Hours a saved session stays valid
    pub session_validity_hours: i64,
    /// Session-detection policy
    pub detection: DetectionPolicy,
}

impl ShellConfig {
    pub fn new(target_url: String, data_dir: PathBuf) -> Self {
        Self {
            target_url,
            database_path: data_dir.join("kiosk.db"),
            key_path: data_dir.join("master.key"),
            session_validity_hours: 24,
            detection: DetectionPolicy::default(),
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("KioskShell"))
            .unwrap_or_else(|| PathBuf::from(".kiosk"))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }
}

// Simple dirs implementation for common directories
mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_markers() {
        let policy = DetectionPolicy::default();

        assert!(policy.auth_cookie_markers.contains(&"auth".to_string()));
        assert!(policy.auth_cookie_markers.contains(&".ASPXAUTH".to_string()));
        assert_eq!(policy.login_url_markers, vec!["login"]);
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = std::env::temp_dir().join(format!("kiosk-config-test-{}", std::process::id()));
        let path = dir.join("config.json");

        let config = ShellConfig::new(
            "https://app.example/".to_string(),
            PathBuf::from("/tmp/kiosk-data"),
        );
        config.save(&path).unwrap();

        let loaded = ShellConfig::load(&path).unwrap();
        assert_eq!(loaded.target_url, config.target_url);
        assert_eq!(loaded.session_validity_hours, 24);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
