//! Permission decision logic

use serde::{Deserialize, Serialize};

/// Platform-level permission the shell can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionKind {
    Microphone,
    Camera,
}

/// What the platform currently reports for a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformPermissionState {
    Granted,
    Denied,
    Undetermined,
}

/// Resource named in a web-content permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebResource {
    AudioCapture,
    VideoCapture,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebPermissionRequest {
    pub origin: String,
    pub resources: Vec<WebResource>,
}

impl WebPermissionRequest {
    pub fn wants(&self, resource: WebResource) -> bool {
        self.resources.contains(&resource)
    }
}

/// What the host should do with a web permission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebPermissionDecision {
    /// Grant exactly these resources
    Grant(Vec<WebResource>),
    /// Deny the request
    Deny,
    /// Ask the platform for this permission first; the request is parked
    /// until [`PermissionBridge::platform_result`] resolves it
    RequestPlatform(PermissionKind),
}

/// Bridges web-content permission requests to platform permission state.
///
/// Holds at most one parked request: the surface serializes permission
/// prompts, so a second request cannot arrive while one is parked.
#[derive(Default)]
pub struct PermissionBridge {
    pending: Option<WebPermissionRequest>,
}

impl PermissionBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Decide a web permission request against current platform state.
    pub fn decide(
        &mut self,
        request: WebPermissionRequest,
        microphone: PlatformPermissionState,
    ) -> WebPermissionDecision {
        tracing::debug!(
            origin = %request.origin,
            resources = ?request.resources,
            "Web permission requested"
        );

        if request.wants(WebResource::AudioCapture) {
            return match microphone {
                PlatformPermissionState::Granted => {
                    WebPermissionDecision::Grant(vec![WebResource::AudioCapture])
                }
                _ => {
                    // Obtain the platform permission first, then resolve
                    self.pending = Some(request);
                    WebPermissionDecision::RequestPlatform(PermissionKind::Microphone)
                }
            };
        }

        if request.wants(WebResource::VideoCapture) {
            return WebPermissionDecision::Grant(vec![WebResource::VideoCapture]);
        }

        WebPermissionDecision::Grant(request.resources)
    }

    /// Resolve the parked request once the platform answers. Returns
    /// `None` when nothing was parked (stale platform callbacks happen).
    pub fn platform_result(
        &mut self,
        kind: PermissionKind,
        granted: bool,
    ) -> Option<WebPermissionDecision> {
        if kind != PermissionKind::Microphone {
            return None;
        }

        let request = self.pending.take()?;

        if granted {
            tracing::debug!(origin = %request.origin, "Platform granted microphone, granting web audio");
            Some(WebPermissionDecision::Grant(vec![WebResource::AudioCapture]))
        } else {
            tracing::info!(origin = %request.origin, "Platform denied microphone, denying web audio");
            Some(WebPermissionDecision::Deny)
        }
    }
}
