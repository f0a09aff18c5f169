use std::error::Error;

use clap::Subcommand;

use focusquest_core::{
    BeginOutcome, ClientConfig, CompleteOutcome, CreateSessionRequest, FocusSession, PhaseReport,
    SessionBinding,
};

use super::common;
use crate::state::TimerState;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Show the active session, if any
    Active,
    /// Open a session without touching the local timer
    Begin {
        /// Focus length in minutes (defaults to configured settings)
        #[arg(long)]
        duration: Option<u32>,
        /// Task to link the session to
        #[arg(long)]
        task_id: Option<String>,
    },
    /// Complete the active session using its server-side accounting
    Complete,
    /// Abandon the active session without completing it
    Abandon,
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn Error>> {
    let config = ClientConfig::load()?;
    let mut state = TimerState::load_or_fresh(config.settings.clone());
    let mut manager = common::manager(&config, state.binding.clone())?;

    match action {
        SessionAction::Active => match manager.query_active_session()? {
            Some(session) => println!("{}", serde_json::to_string_pretty(&session)?),
            None => println!("no active session"),
        },
        SessionAction::Begin { duration, task_id } => {
            let settings = common::effective_settings(&config, &manager);
            let mut request = CreateSessionRequest::pomodoro(&settings);
            if let Some(duration) = duration {
                request.duration = duration;
            }
            request.task_id = task_id;
            match manager.begin_focus_session(request)? {
                BeginOutcome::Started(session) => {
                    println!("{}", serde_json::to_string_pretty(&session)?);
                }
                BeginOutcome::AlreadyActive(session) => {
                    eprintln!("an active session already exists:");
                    println!("{}", serde_json::to_string_pretty(&session)?);
                }
                BeginOutcome::Degraded(e) => {
                    eprintln!("could not open a session: {e}");
                }
            }
        }
        SessionAction::Complete => {
            let session = require_active(&manager.query_active_session()?)?;
            let report = report_from_record(&session);
            match manager.complete_focus_session(&session.id, &report)? {
                CompleteOutcome::Recorded(completion) => {
                    println!(
                        "completed: productivity {}, +{} XP",
                        completion.session.productivity.unwrap_or(0),
                        completion.xp_earned
                    );
                }
                CompleteOutcome::AlreadyRecorded(_) => println!("already completed"),
                CompleteOutcome::Unrecorded => eprintln!("no session was recorded"),
            }
        }
        SessionAction::Abandon => {
            let session = require_active(&manager.query_active_session()?)?;
            manager.abandon_session(&session.id)?;
            println!("abandoned session {}", session.id);
        }
    }

    state.binding = manager.binding().clone();
    // A manual completion or abandon also invalidates a parked countdown
    // still pointed at that session.
    if state.binding == SessionBinding::Unbound && state.clock.is_running() {
        state.clock.reset();
    }
    state.save()
}

fn require_active(session: &Option<FocusSession>) -> Result<FocusSession, Box<dyn Error>> {
    session
        .clone()
        .ok_or_else(|| "no active session".to_string().into())
}

/// For a manual completion the local countdown may be long gone; rebuild the
/// accounting from what the server already knows.
fn report_from_record(session: &FocusSession) -> PhaseReport {
    PhaseReport {
        total_secs: session.planned_duration.saturating_mul(60),
        paused_secs: session.paused_time.saturating_mul(60),
        interruptions: session.interruptions,
    }
}
