//! Injected notification capability.
//!
//! Sound playback, desktop toasts, and celebratory animation are
//! environment-specific side effects, not part of the state machine. The
//! lifecycle manager fans session events out to whatever notifiers the shell
//! installed; a notifier failure is swallowed there -- it never blocks the
//! lifecycle.

use crate::session::{CompletionResponse, FocusSession};

/// Receives session lifecycle side effects. All hooks default to no-ops.
pub trait Notifier: Send + Sync {
    /// A focus session was opened server-side.
    fn session_started(
        &self,
        _session: &FocusSession,
    ) -> Result<(), Box<dyn std::error::Error>> {
        Ok(()) // default no-op
    }

    /// A focus session completed, with its reward payload.
    fn session_completed(
        &self,
        _completion: &CompletionResponse,
    ) -> Result<(), Box<dyn std::error::Error>> {
        Ok(()) // default no-op
    }
}

/// Notifier that does nothing, for headless use.
pub struct NullNotifier;

impl Notifier for NullNotifier {}
