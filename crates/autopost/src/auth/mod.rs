//! Persisted browser authentication.
//!
//! The auth state is recorded once by an operator (`autopost auth`) and
//! mounted read-only for unattended runs.

mod recorder;
mod state;

pub use recorder::AuthRecorder;
pub use state::{AuthState, StoredCookie};
