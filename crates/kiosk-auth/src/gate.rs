//! Biometric gate logic

use serde::{Deserialize, Serialize};

/// What the platform reports about biometric hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BiometricAvailability {
    Available,
    NoHardware,
    HardwareUnavailable,
    NoneEnrolled,
    Unknown,
}

/// Terminal prompt failures. Individual failed attempts are retried
/// inside the platform prompt and never reach this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    Cancelled,
    Lockout,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Succeeded,
    Failed(PromptError),
}

/// Text shown by the platform prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptRequest {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub negative_button: String,
}

impl Default for PromptRequest {
    fn default() -> Self {
        Self {
            title: "Secure Login".to_string(),
            subtitle: "Use your fingerprint to access the app".to_string(),
            description: "Touch the fingerprint sensor to authenticate".to_string(),
            negative_button: "Cancel".to_string(),
        }
    }
}

/// Platform biometric prompt capability.
pub trait AuthenticationPrompter {
    fn availability(&self) -> BiometricAvailability;
    fn authenticate(&self, request: &PromptRequest) -> PromptOutcome;
}

/// Result of running the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Biometric check passed
    Authenticated,
    /// Biometrics unavailable; proceed with manual login
    Fallback,
    /// Terminal prompt failure; the launch should not proceed
    Aborted(String),
}

pub struct BiometricGate;

impl BiometricGate {
    /// Run the gate: prompt when biometrics are usable, fall back to
    /// manual login when they are not, abort on terminal prompt errors.
    pub fn run(prompter: &dyn AuthenticationPrompter, request: &PromptRequest) -> GateOutcome {
        match prompter.availability() {
            BiometricAvailability::Available => {}
            availability => {
                tracing::info!(?availability, "Biometrics unavailable, falling back");
                return GateOutcome::Fallback;
            }
        }

        match prompter.authenticate(request) {
            PromptOutcome::Succeeded => {
                tracing::info!("Biometric authentication succeeded");
                GateOutcome::Authenticated
            }
            PromptOutcome::Failed(PromptError::Cancelled) => {
                GateOutcome::Aborted("Authentication cancelled".to_string())
            }
            PromptOutcome::Failed(PromptError::Lockout) => GateOutcome::Aborted(
                "Too many failed attempts. Please try again later.".to_string(),
            ),
            PromptOutcome::Failed(PromptError::Other(message)) => {
                GateOutcome::Aborted(format!("Authentication error: {message}"))
            }
        }
    }

    pub fn is_available(prompter: &dyn AuthenticationPrompter) -> bool {
        prompter.availability() == BiometricAvailability::Available
    }
}
