//! Kiosk Shell Biometric Gate
//!
//! The platform biometric prompt is a capability the host implements;
//! this crate owns the decision logic around it: when the prompt is
//! worth showing, how unavailable hardware degrades to manual login, and
//! how terminal prompt errors map to user-facing abort reasons.

mod gate;

pub use gate::{
    AuthenticationPrompter, BiometricAvailability, BiometricGate, GateOutcome, PromptError,
    PromptOutcome, PromptRequest,
};
