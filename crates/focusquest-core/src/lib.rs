//! # FocusQuest Core Library
//!
//! Core engine for the FocusQuest focus/Pomodoro subsystem: the phase clock,
//! its reconciliation with the server-held active-session record, and the
//! reward computation a completed session feeds.
//!
//! ## Architecture
//!
//! - **Phase Clock**: a pure countdown state machine over
//!   `{focus, break, longBreak} x {idle, running, paused}`; the caller
//!   invokes `tick()` once per second
//! - **Session Lifecycle**: a manager bridging clock events to the remote
//!   session store through an injected [`SessionStore`], enforcing the
//!   client's side of the one-active-session-per-user invariant
//! - **Rewards**: a deterministic, side-effect-free productivity/XP
//!   computation with a configurable policy
//! - **Settings**: server-owned per-user phase lengths, cadence and
//!   auto-start rules
//!
//! Nothing in this crate is fatal to the process: the clock only emits
//! events, and every lifecycle failure is either an outcome the shell can
//! present or an error it can retry.

pub mod config;
pub mod error;
pub mod events;
pub mod notify;
pub mod rewards;
pub mod session;
pub mod settings;
pub mod timer;

pub use config::{data_dir, ApiConfig, ClientConfig};
pub use error::{ConfigError, CoreError, Result, ValidationError};
pub use events::Event;
pub use notify::{Notifier, NullNotifier};
pub use rewards::{compute_rewards, RewardPolicy, Rewards};
pub use session::{
    BeginOutcome, CompleteOutcome, CompletionResponse, CreateSessionRequest, FocusSession,
    HttpSessionStore, PhaseReport, SessionBinding, SessionManager, SessionStore, SessionType,
    SessionUpdate, StoreError,
};
pub use settings::FocusSettings;
pub use timer::{ClockStatus, Phase, PhaseClock};
