//! Kiosk Shell Permission Broker
//!
//! Web content asks the embedded surface for capture permissions; the
//! platform holds the real grants. This crate decides, per request,
//! whether to grant directly, park the request while the platform
//! permission is obtained, or deny - the host only executes the decision.

mod broker;

pub use broker::{
    PermissionBridge, PermissionKind, PlatformPermissionState, WebPermissionDecision,
    WebPermissionRequest, WebResource,
};
