use std::error::Error;
use std::io::Write;

use clap::Subcommand;

use focusquest_core::{
    BeginOutcome, ClientConfig, CompleteOutcome, CreateSessionRequest, Event, FocusSession,
    HttpSessionStore, PhaseClock, PhaseReport, SessionBinding, SessionManager,
};

use super::common::{self, format_mmss};
use crate::state::TimerState;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the current phase (opens a server session for a new focus phase)
    Start {
        /// Task to link the session to
        #[arg(long)]
        task_id: Option<String>,
    },
    /// Pause the countdown
    Pause,
    /// Resume a paused countdown
    Resume,
    /// Record an interruption without pausing
    Interrupt,
    /// Skip the rest of the current phase
    Skip,
    /// Reset the current phase to idle
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Run the countdown in the foreground, ticking once per second
    Run,
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn Error>> {
    let config = ClientConfig::load()?;
    let mut state = TimerState::load_or_fresh(config.settings.clone());
    let mut manager = common::manager(&config, state.binding.clone())?;

    match action {
        TimerAction::Start { task_id } => {
            // Pick up server-side settings changes before a fresh phase.
            if !state.clock.is_paused() {
                state
                    .clock
                    .set_settings(common::effective_settings(&config, &manager));
            }
            start(&mut state, &mut manager, task_id)?;
        }
        TimerAction::Pause => {
            if state.clock.pause().is_none() {
                eprintln!("nothing to pause");
            }
        }
        TimerAction::Resume => {
            if state.clock.resume().is_none() {
                eprintln!("nothing to resume");
            }
        }
        TimerAction::Interrupt => match state.clock.record_interruption() {
            Some(_) => println!("interruptions: {}", state.clock.interruptions()),
            None => eprintln!("interruptions only count during a running focus phase"),
        },
        TimerAction::Skip => {
            if let Some(event) = state.clock.skip() {
                handle_completion(&event, &mut state, &mut manager)?;
            } else {
                eprintln!("nothing to skip");
            }
        }
        TimerAction::Reset => {
            state.clock.reset();
        }
        TimerAction::Status => {
            println!("{}", serde_json::to_string_pretty(&state.clock.snapshot())?);
        }
        TimerAction::Run => run_loop(&mut state, &mut manager)?,
    }

    state.binding = manager.binding().clone();
    state.save()
}

fn start(
    state: &mut TimerState,
    manager: &mut SessionManager<HttpSessionStore>,
    task_id: Option<String>,
) -> Result<(), Box<dyn Error>> {
    if opens_new_session(&state.clock, manager.binding()) {
        let mut request = CreateSessionRequest::pomodoro(state.clock.settings());
        if let Some(task_id) = task_id {
            request = request.with_task(task_id);
        }
        match manager.begin_focus_session(request)? {
            BeginOutcome::Started(_) => {}
            BeginOutcome::AlreadyActive(session) => {
                eprintln!(
                    "an active session already exists (id {}, started {}); resuming tracking",
                    session.id, session.start_time
                );
            }
            BeginOutcome::Degraded(e) => {
                eprintln!("warning: session not recorded ({e}); countdown runs without rewards");
            }
        }
    }

    if state.clock.start().is_none() {
        eprintln!("timer is already running or finished");
    }
    Ok(())
}

/// A brand-new focus phase gets a server session; resuming from pause or
/// starting a break does not. A leftover degraded binding does not block a
/// retry: it belongs to a phase that already failed to open one.
fn opens_new_session(clock: &PhaseClock, binding: &SessionBinding) -> bool {
    clock.phase().is_focus() && !clock.is_paused() && binding.session_id().is_none()
}

fn run_loop(
    state: &mut TimerState,
    manager: &mut SessionManager<HttpSessionStore>,
) -> Result<(), Box<dyn Error>> {
    if !state.clock.is_running() {
        eprintln!("timer is not running; use `timer start` first");
        return Ok(());
    }
    let mut ticks: u64 = 0;
    loop {
        std::thread::sleep(std::time::Duration::from_secs(1));
        ticks += 1;
        if let Some(event) = state.clock.tick() {
            if matches!(event, Event::PhaseCompleted { .. }) {
                println!();
                handle_completion(&event, state, manager)?;
                state.save()?;
            }
        }
        if !state.clock.is_running() {
            break;
        }
        if ticks % ACTIVE_POLL_SECS == 0 {
            poll_active(state, manager)?;
            if !state.clock.is_running() {
                break;
            }
        }
        print!(
            "\r{} {}  ",
            state.clock.phase(),
            format_mmss(state.clock.time_left_secs())
        );
        std::io::stdout().flush()?;
    }
    Ok(())
}

/// How often the foreground loop re-checks the active-session singleton.
const ACTIVE_POLL_SECS: u64 = 30;

enum ActivePoll {
    InSync,
    EndedElsewhere,
    Reattach(FocusSession),
}

fn reconcile_active(binding: &SessionBinding, active: Option<FocusSession>) -> ActivePoll {
    match (binding.session_id(), active) {
        (Some(bound), Some(active)) if active.id == bound => ActivePoll::InSync,
        // Completed, abandoned, or replaced from another client.
        (Some(_), _) => ActivePoll::EndedElsewhere,
        (None, Some(active)) => ActivePoll::Reattach(active),
        (None, None) => ActivePoll::InSync,
    }
}

fn poll_active(
    state: &mut TimerState,
    manager: &mut SessionManager<HttpSessionStore>,
) -> Result<(), Box<dyn Error>> {
    let active = match manager.query_active_session() {
        Ok(active) => active,
        // A flaky poll must not kill the countdown.
        Err(_) => return Ok(()),
    };
    match reconcile_active(manager.binding(), active) {
        ActivePoll::InSync => {}
        ActivePoll::EndedElsewhere => {
            println!();
            eprintln!("the tracked session ended elsewhere; stopping this countdown");
            manager.release_binding();
            state.binding = manager.binding().clone();
            state.clock.reset();
            state.save()?;
        }
        ActivePoll::Reattach(session) => {
            println!();
            eprintln!("resuming tracking of active session {}", session.id);
            manager.reattach(&session);
            state.binding = manager.binding().clone();
            state.save()?;
        }
    }
    Ok(())
}

fn handle_completion(
    event: &Event,
    state: &mut TimerState,
    manager: &mut SessionManager<HttpSessionStore>,
) -> Result<(), Box<dyn Error>> {
    let Event::PhaseCompleted { phase, .. } = event else {
        return Ok(());
    };
    if !phase.is_focus() {
        println!("{phase} finished");
        return Ok(());
    }

    let report = PhaseReport::from_event(event).expect("completion event carries a report");
    match manager.complete_bound_phase(&report)? {
        CompleteOutcome::Recorded(completion) => {
            println!(
                "focus complete: productivity {}, +{} XP",
                completion.session.productivity.unwrap_or(0),
                completion.xp_earned
            );
        }
        CompleteOutcome::AlreadyRecorded(_) => {
            println!("focus complete (already recorded)");
        }
        CompleteOutcome::Unrecorded => {
            eprintln!("warning: this session ran without server backing; no reward attributed");
        }
    }
    state.binding = manager.binding().clone();
    Ok(())
}
