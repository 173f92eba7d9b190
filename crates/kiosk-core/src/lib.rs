//! Kiosk Core
//!
//! Central coordination layer for the kiosk shell. Rust owns all state
//! and decisions; the embedded browser surface, biometric prompt, and
//! platform permission dialogs are capabilities the host implements.

mod config;
mod detector;
mod error;
mod launch;
mod overlay;
mod shell;

pub use config::{DetectionPolicy, ShellConfig};
pub use detector::SessionDetector;
pub use error::ShellError;
pub use launch::{plan_launch, LaunchDecision};
pub use overlay::{LoadingOverlay, OverlayText};
pub use shell::{EmbeddedSurface, PageOutcome, Shell};

// Re-export core components
pub use kiosk_auth::{
    AuthenticationPrompter, BiometricAvailability, BiometricGate, GateOutcome, PromptError,
    PromptOutcome, PromptRequest,
};
pub use kiosk_privacy::{
    PermissionBridge, PermissionKind, PlatformPermissionState, WebPermissionDecision,
    WebPermissionRequest, WebResource,
};
pub use kiosk_session::{Clock, SessionError, SessionRecord, SessionStore, SystemClock};
pub use kiosk_storage::{MasterKey, SecureKeyValueStore, SecureStore, StorageError};

pub type Result<T> = std::result::Result<T, ShellError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
