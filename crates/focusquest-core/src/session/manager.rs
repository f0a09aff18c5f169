//! Session lifecycle manager.
//!
//! Bridges phase-clock events to the remote session store. The countdown is
//! independent of network state: a failed `begin` leaves the clock running
//! in degraded mode, a failed `complete` can be retried, and a duplicate
//! completion yields the one cached reward attribution rather than two.

use crate::error::{CoreError, Result};
use crate::notify::Notifier;
use crate::session::store::{SessionStore, StoreError};
use crate::session::types::{
    CompletionResponse, CreateSessionRequest, FocusSession, PhaseReport, SessionBinding,
};
use crate::settings::FocusSettings;

/// Result of `begin_focus_session`.
#[derive(Debug)]
pub enum BeginOutcome {
    /// A fresh session was opened and bound to the timer.
    Started(FocusSession),
    /// The server already holds an active session (reload, second tab).
    /// The shell should offer to resume it rather than start another.
    AlreadyActive(FocusSession),
    /// The store was unreachable. The countdown may keep running locally,
    /// but no reward will be attributed; the shell must surface this.
    Degraded(StoreError),
}

/// Result of `complete_focus_session`.
#[derive(Debug, Clone)]
pub enum CompleteOutcome {
    /// First successful completion, with the server's reward payload.
    Recorded(CompletionResponse),
    /// The session was already completed -- either by an earlier call
    /// through this manager (cached payload) or server-side (no payload).
    /// Never a second reward attribution.
    AlreadyRecorded(Option<CompletionResponse>),
    /// Degraded mode: the phase ran with no bound session, so nothing was
    /// recorded and no reward exists.
    Unrecorded,
}

/// Mediates between the phase clock and the remote session store, keeping
/// the client's side of the at-most-one-active-session bargain: always look
/// for an existing active session before opening a new one, and treat
/// conflicts as a resync signal rather than a failure.
pub struct SessionManager<S: SessionStore> {
    store: S,
    binding: SessionBinding,
    /// The one reward attribution for the most recently completed session.
    last_completion: Option<(String, CompletionResponse)>,
    notifiers: Vec<Box<dyn Notifier>>,
}

impl<S: SessionStore> SessionManager<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            binding: SessionBinding::Unbound,
            last_completion: None,
            notifiers: Vec::new(),
        }
    }

    /// Restore a binding saved by the shell between invocations.
    pub fn with_binding(mut self, binding: SessionBinding) -> Self {
        self.binding = binding;
        self
    }

    pub fn add_notifier(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    pub fn binding(&self) -> &SessionBinding {
        &self.binding
    }

    pub fn bound_session_id(&self) -> Option<&str> {
        self.binding.session_id()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Open a server session for a new focus phase. Called once per phase,
    /// when the user starts it -- not on resume from pause.
    ///
    /// Validation failures are errors; everything the caller can act on
    /// (conflict, unreachable store) is an outcome, not an error. No
    /// automatic retry -- the caller decides whether to re-issue.
    pub fn begin_focus_session(&mut self, request: CreateSessionRequest) -> Result<BeginOutcome> {
        request.validate()?;

        // The singleton lives server-side; our obligation is to look before
        // we create.
        match self.store.active_session() {
            Ok(Some(existing)) => {
                self.binding = SessionBinding::Bound {
                    session_id: existing.id.clone(),
                };
                return Ok(BeginOutcome::AlreadyActive(existing));
            }
            Ok(None) => {}
            // Query failed; the create below will tell us more.
            Err(_) => {}
        }

        match self.store.create_session(&request) {
            Ok(session) => {
                self.binding = SessionBinding::Bound {
                    session_id: session.id.clone(),
                };
                self.notify_started(&session);
                Ok(BeginOutcome::Started(session))
            }
            Err(StoreError::Conflict) => match self.store.active_session() {
                Ok(Some(existing)) => {
                    self.binding = SessionBinding::Bound {
                        session_id: existing.id.clone(),
                    };
                    Ok(BeginOutcome::AlreadyActive(existing))
                }
                Ok(None) => {
                    // Conflict but no visible active session: the other
                    // writer finished in between. Degrade; the caller may
                    // re-issue.
                    self.binding = SessionBinding::Degraded;
                    Ok(BeginOutcome::Degraded(StoreError::Conflict))
                }
                Err(e) => {
                    self.binding = SessionBinding::Degraded;
                    Ok(BeginOutcome::Degraded(e))
                }
            },
            Err(StoreError::Validation(message)) => {
                Err(CoreError::Store(StoreError::Validation(message)))
            }
            Err(e) => {
                self.binding = SessionBinding::Degraded;
                Ok(BeginOutcome::Degraded(e))
            }
        }
    }

    /// Record a completed focus phase against whatever the clock is bound
    /// to. A phase that ran degraded (or never began) yields `Unrecorded`
    /// and releases the binding, so the next focus phase is free to open a
    /// fresh session once the store is reachable again.
    pub fn complete_bound_phase(&mut self, report: &PhaseReport) -> Result<CompleteOutcome> {
        match self.binding.session_id().map(str::to_owned) {
            Some(session_id) => self.complete_focus_session(&session_id, report),
            None => {
                self.binding = SessionBinding::Unbound;
                Ok(CompleteOutcome::Unrecorded)
            }
        }
    }

    /// Record a completed focus phase against its bound session.
    ///
    /// Idempotent from the caller's perspective: repeating the call for the
    /// same id -- locally or after a reconnect raced us -- yields
    /// `AlreadyRecorded`, never a second attribution.
    pub fn complete_focus_session(
        &mut self,
        session_id: &str,
        report: &PhaseReport,
    ) -> Result<CompleteOutcome> {
        if let Some((id, cached)) = &self.last_completion {
            if id == session_id {
                return Ok(CompleteOutcome::AlreadyRecorded(Some(cached.clone())));
            }
        }

        // Persist the final accounting first so the server computes rewards
        // from what actually happened. A session the server already closed
        // rejects the update; fall through and let the completion call
        // report AlreadyCompleted. Transient failures propagate for retry.
        match self.store.update_session(session_id, &report.as_update()) {
            Ok(_) => {}
            Err(e) if e.is_transient() => return Err(CoreError::Store(e)),
            Err(StoreError::AlreadyCompleted) | Err(StoreError::Api { .. }) => {}
            Err(e) => return Err(CoreError::Store(e)),
        }

        match self.store.complete_session(session_id) {
            Ok(completion) => {
                self.last_completion = Some((session_id.to_string(), completion.clone()));
                self.binding = SessionBinding::Unbound;
                self.notify_completed(&completion);
                Ok(CompleteOutcome::Recorded(completion))
            }
            Err(StoreError::AlreadyCompleted) => {
                self.binding = SessionBinding::Unbound;
                Ok(CompleteOutcome::AlreadyRecorded(None))
            }
            Err(e) => Err(CoreError::Store(e)),
        }
    }

    /// Poll for a session that is active server-side. Used on mount and on
    /// a fixed interval to detect a session with no bound local timer.
    pub fn query_active_session(&self) -> Result<Option<FocusSession>> {
        Ok(self.store.active_session()?)
    }

    /// Re-attach the local timer to a session discovered via
    /// `query_active_session`, instead of starting a conflicting one.
    pub fn reattach(&mut self, session: &FocusSession) {
        self.binding = SessionBinding::Bound {
            session_id: session.id.clone(),
        };
    }

    /// Mark the clock as running without server backing.
    pub fn mark_degraded(&mut self) {
        self.binding = SessionBinding::Degraded;
    }

    /// Drop the binding without touching the server. Used when the bound
    /// session turns out to have ended elsewhere.
    pub fn release_binding(&mut self) {
        self.binding = SessionBinding::Unbound;
    }

    /// Abandon a session without completing it. No reward is attributed.
    pub fn abandon_session(&mut self, session_id: &str) -> Result<()> {
        self.store.delete_session(session_id)?;
        if self.binding.session_id() == Some(session_id) {
            self.binding = SessionBinding::Unbound;
        }
        Ok(())
    }

    /// Push an interim accounting update for the bound session.
    pub fn push_update(&self, report: &PhaseReport) -> Result<Option<FocusSession>> {
        match self.binding.session_id() {
            Some(id) => Ok(Some(self.store.update_session(id, &report.as_update())?)),
            None => Ok(None),
        }
    }

    pub fn fetch_settings(&self) -> Result<FocusSettings> {
        Ok(self.store.fetch_settings()?)
    }

    pub fn update_settings(&self, settings: &FocusSettings) -> Result<FocusSettings> {
        settings.validate()?;
        Ok(self.store.update_settings(settings)?)
    }

    fn notify_started(&self, session: &FocusSession) {
        for notifier in &self.notifiers {
            let _ = notifier.session_started(session);
        }
    }

    fn notify_completed(&self, completion: &CompletionResponse) {
        for notifier in &self.notifiers {
            let _ = notifier.session_completed(completion);
        }
    }
}
