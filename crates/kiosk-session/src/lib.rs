//! Kiosk Shell Session Store
//!
//! A session is a locally cached claim that the user recently
//! authenticated: the last good destination URL plus an expiry instant.
//! At most one record exists at a time; validity is a time predicate, not
//! persisted state. Storage faults never propagate out of read paths -
//! every failure degrades to "no valid session" so the host falls back to
//! manual login.

mod clock;
mod error;
mod record;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::SessionError;
pub use record::SessionRecord;
pub use store::{SessionStore, DEFAULT_VALIDITY_HOURS};

pub type Result<T> = std::result::Result<T, SessionError>;
