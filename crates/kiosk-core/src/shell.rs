//! Main shell state container
//!
//! The shell owns every decision: what to load, whether to gate behind
//! the biometric prompt, when a page load counts as an authenticated
//! session, and what to reload after a surface crash. The host layer
//! implements the capabilities and executes the decisions.

use chrono::Duration;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

use kiosk_auth::{AuthenticationPrompter, BiometricGate, GateOutcome, PromptRequest};
use kiosk_privacy::{
    PermissionBridge, PermissionKind, PlatformPermissionState, WebPermissionDecision,
    WebPermissionRequest,
};
use kiosk_session::SessionStore;
use kiosk_storage::{MasterKey, SecureStore};

use crate::config::ShellConfig;
use crate::detector::SessionDetector;
use crate::error::ShellError;
use crate::launch::{plan_launch, LaunchDecision};
use crate::overlay::{LoadingOverlay, OverlayText};
use crate::Result;

const KEY_FIRST_LAUNCH: &str = "first_launch";

/// Embedded browser surface capability.
pub trait EmbeddedSurface {
    fn load(&mut self, url: &str);
    fn current_url(&self) -> Option<String>;
}

/// What a finished page load meant for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// The load was persisted as the session destination. `first_login`
    /// is set on the very first successful login so the host can show
    /// the biometric setup hint.
    SessionSaved { first_login: bool },
    /// Login page or unrecognized load; nothing persisted
    Ignored,
}

pub struct Shell {
    config: ShellConfig,
    store: SecureStore,
    sessions: SessionStore,
    detector: SessionDetector,
    prompt: PromptRequest,
    overlay: RwLock<LoadingOverlay>,
    permissions: Mutex<PermissionBridge>,
}

impl Shell {
    /// Open (or create) the shell's storage and build the coordinator.
    pub fn new(config: ShellConfig) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let key = MasterKey::load_or_generate(&config.key_path)?;
        let store = SecureStore::open(&config.database_path, key)?;

        Ok(Self::with_store(config, store))
    }

    /// Build the shell over an already-opened store (hosts with their own
    /// keystore-backed key, and tests, come through here).
    pub fn with_store(config: ShellConfig, store: SecureStore) -> Self {
        let sessions = SessionStore::new(Arc::new(store.clone()))
            .with_validity_window(Duration::hours(config.session_validity_hours));
        let detector = SessionDetector::new(config.detection.clone());

        Self {
            config,
            store,
            sessions,
            detector,
            prompt: PromptRequest::default(),
            overlay: RwLock::new(LoadingOverlay::new()),
            permissions: Mutex::new(PermissionBridge::new()),
        }
    }

    // === Launch ===

    pub fn plan_launch(&self) -> LaunchDecision {
        plan_launch(self.is_first_launch(), self.sessions.is_session_valid())
    }

    /// Where navigation should go: the saved destination while the
    /// session is valid, otherwise the configured target.
    pub fn navigation_target(&self) -> String {
        if self.sessions.is_session_valid() {
            if let Some(url) = self.sessions.saved_url() {
                return url;
            }
        }

        self.config.target_url.clone()
    }

    /// Run the launch sequence: gate when a valid session exists, then
    /// point the surface at the navigation target. A terminal gate
    /// failure aborts the launch.
    pub fn start(
        &self,
        surface: &mut dyn EmbeddedSurface,
        prompter: &dyn AuthenticationPrompter,
    ) -> Result<()> {
        match self.plan_launch() {
            LaunchDecision::GateThenLoad => match BiometricGate::run(prompter, &self.prompt) {
                GateOutcome::Authenticated | GateOutcome::Fallback => {
                    surface.load(&self.navigation_target());
                }
                GateOutcome::Aborted(reason) => {
                    return Err(ShellError::AuthenticationAborted(reason));
                }
            },
            LaunchDecision::LoadDirect => {
                surface.load(&self.navigation_target());
            }
        }

        Ok(())
    }

    /// What to reload after the surface's render process crashes:
    /// whatever it was showing, else the saved destination (expired or
    /// not), else the target.
    pub fn recovery_target(&self, current_url: Option<&str>) -> String {
        if let Some(url) = current_url {
            return url.to_string();
        }

        self.sessions
            .saved_url()
            .unwrap_or_else(|| self.config.target_url.clone())
    }

    // === Page lifecycle ===

    /// A page finished loading. Persist it as the session destination
    /// when the detection policy says so, and complete first launch on
    /// the first successful login.
    pub fn handle_page_finished(&self, url: &str, cookies: Option<&str>) -> Result<PageOutcome> {
        let authenticated_load = self.detector.should_persist_url(url)
            || cookies
                .map(|c| self.detector.cookies_indicate_auth(c))
                .unwrap_or(false);

        if !authenticated_load {
            tracing::debug!(%url, "Page load not persisted");
            return Ok(PageOutcome::Ignored);
        }

        self.sessions.save_session(url)?;

        let first_login = self.is_first_launch();
        if first_login {
            self.set_first_launch_completed()?;
        }

        tracing::info!(%url, first_login, "Session destination saved");

        Ok(PageOutcome::SessionSaved { first_login })
    }

    // === First launch ===

    /// The flag is deliberately plain (unencrypted): it only gates the
    /// biometric setup hint and must be readable without the master key.
    pub fn is_first_launch(&self) -> bool {
        match self.store.get_setting(KEY_FIRST_LAUNCH) {
            Ok(Some(value)) => value != "false",
            Ok(None) => true,
            Err(e) => {
                tracing::warn!(%e, "Failed to read first-launch flag");
                true
            }
        }
    }

    fn set_first_launch_completed(&self) -> Result<()> {
        self.store.set_setting(KEY_FIRST_LAUNCH, "false")?;
        Ok(())
    }

    // === Loading overlay ===

    pub fn overlay_page_started(&self) -> Option<OverlayText> {
        self.overlay.write().on_page_started()
    }

    pub fn overlay_progress(&self, progress: u8) -> Option<OverlayText> {
        self.overlay.write().on_progress(progress)
    }

    pub fn overlay_page_finished(&self) -> Option<OverlayText> {
        self.overlay.write().on_page_finished()
    }

    pub fn dismiss_overlay(&self) {
        self.overlay.write().dismiss();
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay.read().is_visible()
    }

    // === Permissions ===

    pub fn decide_web_permission(
        &self,
        request: WebPermissionRequest,
        microphone: PlatformPermissionState,
    ) -> WebPermissionDecision {
        self.permissions.lock().decide(request, microphone)
    }

    pub fn platform_permission_result(
        &self,
        kind: PermissionKind,
        granted: bool,
    ) -> Option<WebPermissionDecision> {
        self.permissions.lock().platform_result(kind, granted)
    }

    // === Accessors ===

    pub fn session_store(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }
}
