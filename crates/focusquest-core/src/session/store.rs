//! The remote session store seam.
//!
//! The lifecycle manager talks to the server exclusively through this trait,
//! so it can be unit-tested against an in-memory double and the HTTP client
//! stays swappable. The server, not the client, enforces the at-most-one-
//! active-session invariant; `Conflict` is how that enforcement reaches us.

use crate::session::types::{
    CompletionResponse, CreateSessionRequest, FocusSession, SessionUpdate,
};
use crate::settings::FocusSettings;

/// Errors reported by a session store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The server already holds an active session for this user. Not fatal:
    /// the caller resyncs via the active-session query.
    #[error("an active session already exists")]
    Conflict,

    /// Completion was retried against a session the server already closed.
    /// Callers treat this as success, not as an error.
    #[error("session is already completed")]
    AlreadyCompleted,

    /// The server rejected the payload before touching any state.
    #[error("request rejected: {0}")]
    Validation(String),

    /// Transport-level failure. The local countdown is unaffected; reward
    /// attribution is deferred until the call is retried or abandoned.
    #[error("network error: {0}")]
    Network(String),

    /// Any other non-success response.
    #[error("server error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Remote store for the user's focus sessions and settings.
pub trait SessionStore {
    /// Open a new session. Fails with [`StoreError::Conflict`] when an
    /// active session already exists for the user.
    fn create_session(&self, request: &CreateSessionRequest) -> Result<FocusSession, StoreError>;

    /// The user's active session, if any.
    fn active_session(&self) -> Result<Option<FocusSession>, StoreError>;

    /// Partial update of an in-flight session.
    fn update_session(&self, id: &str, update: &SessionUpdate) -> Result<FocusSession, StoreError>;

    /// Complete a session, triggering server-side reward computation.
    /// Fails with [`StoreError::AlreadyCompleted`] on a duplicate call.
    fn complete_session(&self, id: &str) -> Result<CompletionResponse, StoreError>;

    /// Delete (abandon) a session without completing it.
    fn delete_session(&self, id: &str) -> Result<(), StoreError>;

    fn fetch_settings(&self) -> Result<FocusSettings, StoreError>;

    fn update_settings(&self, settings: &FocusSettings) -> Result<FocusSettings, StoreError>;
}

impl StoreError {
    /// Errors worth surfacing as "degraded, retry later" rather than as a
    /// caller mistake.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Network(_) | StoreError::Api { status: 500..=599, .. }
        )
    }
}
