//! Launch planning
//!
//! First launch goes straight to manual login (there is nothing to
//! protect yet). A still-valid session is worth gating behind the
//! biometric prompt. An absent or expired session falls through to
//! manual login.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchDecision {
    /// Load the navigation target with no gate
    LoadDirect,
    /// Run the biometric gate, then load the navigation target
    GateThenLoad,
}

pub fn plan_launch(first_launch: bool, session_valid: bool) -> LaunchDecision {
    if first_launch {
        return LaunchDecision::LoadDirect;
    }

    if session_valid {
        LaunchDecision::GateThenLoad
    } else {
        LaunchDecision::LoadDirect
    }
}
