mod http;
mod manager;
#[cfg(test)]
mod manager_tests;
mod store;
mod types;

pub use http::HttpSessionStore;
pub use manager::{BeginOutcome, CompleteOutcome, SessionManager};
pub use store::{SessionStore, StoreError};
pub use types::{
    CompletionResponse, CreateSessionRequest, FocusSession, PhaseReport, SessionBinding,
    SessionType, SessionUpdate,
};
