//! Phase clock implementation.
//!
//! The phase clock is a pure countdown state machine over
//! `{focus, break, longBreak} x {idle, running, paused}`. It owns no thread
//! and performs no I/O -- the caller drives it by invoking `tick()` once per
//! second while it is running.
//!
//! ## State transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running -> ... -> Idle (phase complete)
//! ```
//!
//! Commands return `Option<Event>`; `None` means the command was not valid
//! from the current state and was silently ignored. Lifecycle problems never
//! surface here -- the clock only emits events, and skip shares the natural
//! countdown-to-zero completion path.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::phase::Phase;
use crate::events::Event;
use crate::settings::FocusSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockStatus {
    Idle,
    Running,
    Paused,
}

/// Core phase clock.
///
/// `is_running` and `is_paused` are mutually exclusive by construction.
/// Serializable so a shell can park it between invocations; the serialized
/// form is ephemeral client state, never the authoritative session record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseClock {
    settings: FocusSettings,
    phase: Phase,
    status: ClockStatus,
    /// Remaining seconds in the current phase.
    time_left_secs: u32,
    /// Full length of the current phase. Fixed until the phase changes.
    total_secs: u32,
    /// Focus phases completed since this clock was created.
    session_count: u32,
    /// Interruptions recorded during the current focus phase.
    interruptions: u32,
    /// Epoch ms at which the current pause began (only while Paused).
    #[serde(default)]
    paused_since_epoch_ms: Option<u64>,
    /// Wall-clock ms spent paused during the current phase.
    #[serde(default)]
    paused_ms: u64,
}

impl PhaseClock {
    /// Create a clock in `focus, idle` with the configured focus length.
    pub fn new(settings: FocusSettings) -> Self {
        let total_secs = settings.phase_duration_secs(Phase::Focus);
        Self {
            settings,
            phase: Phase::Focus,
            status: ClockStatus::Idle,
            time_left_secs: total_secs,
            total_secs,
            session_count: 0,
            interruptions: 0,
            paused_since_epoch_ms: None,
            paused_ms: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn status(&self) -> ClockStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == ClockStatus::Running
    }

    pub fn is_paused(&self) -> bool {
        self.status == ClockStatus::Paused
    }

    pub fn time_left_secs(&self) -> u32 {
        self.time_left_secs
    }

    pub fn total_secs(&self) -> u32 {
        self.total_secs
    }

    pub fn session_count(&self) -> u32 {
        self.session_count
    }

    pub fn interruptions(&self) -> u32 {
        self.interruptions
    }

    /// Whole seconds spent paused during the current phase.
    pub fn paused_secs(&self) -> u32 {
        (self.paused_ms / 1000) as u32
    }

    pub fn settings(&self) -> &FocusSettings {
        &self.settings
    }

    /// 0.0 .. 1.0 progress within the current phase, clamped.
    pub fn progress(&self) -> f64 {
        if self.total_secs == 0 {
            return 0.0;
        }
        let done = (self.total_secs - self.time_left_secs.min(self.total_secs)) as f64;
        (done / self.total_secs as f64).clamp(0.0, 1.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            status: self.status,
            time_left_secs: self.time_left_secs,
            total_secs: self.total_secs,
            session_count: self.session_count,
            interruptions: self.interruptions,
            progress: self.progress(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start from idle, or resume from paused. No-op while running or when
    /// the phase has already run out.
    pub fn start(&mut self) -> Option<Event> {
        self.start_at(now_ms())
    }

    /// `start` with an explicit wall clock, for tests.
    pub fn start_at(&mut self, now_epoch_ms: u64) -> Option<Event> {
        if self.time_left_secs == 0 {
            return None;
        }
        match self.status {
            ClockStatus::Idle => {
                self.status = ClockStatus::Running;
                Some(Event::PhaseStarted {
                    phase: self.phase,
                    duration_secs: self.total_secs,
                    at: Utc::now(),
                })
            }
            ClockStatus::Paused => {
                self.close_pause_interval(now_epoch_ms);
                self.status = ClockStatus::Running;
                Some(Event::PhaseResumed {
                    time_left_secs: self.time_left_secs,
                    at: Utc::now(),
                })
            }
            ClockStatus::Running => None,
        }
    }

    /// Freeze the countdown. Valid only while running.
    pub fn pause(&mut self) -> Option<Event> {
        self.pause_at(now_ms())
    }

    /// `pause` with an explicit wall clock, for tests.
    pub fn pause_at(&mut self, now_epoch_ms: u64) -> Option<Event> {
        match self.status {
            ClockStatus::Running => {
                self.status = ClockStatus::Paused;
                self.paused_since_epoch_ms = Some(now_epoch_ms);
                Some(Event::PhasePaused {
                    time_left_secs: self.time_left_secs,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// Alias for `start()` from paused.
    pub fn resume(&mut self) -> Option<Event> {
        self.start()
    }

    /// `resume` with an explicit wall clock, for tests.
    pub fn resume_at(&mut self, now_epoch_ms: u64) -> Option<Event> {
        self.start_at(now_epoch_ms)
    }

    /// Return to idle with the duration recomputed for the current phase,
    /// clearing the paused-time accumulator for the upcoming run.
    pub fn reset(&mut self) -> Option<Event> {
        self.status = ClockStatus::Idle;
        self.total_secs = self.settings.phase_duration_secs(self.phase);
        self.time_left_secs = self.total_secs;
        self.paused_since_epoch_ms = None;
        self.paused_ms = 0;
        Some(Event::TimerReset {
            phase: self.phase,
            duration_secs: self.total_secs,
            at: Utc::now(),
        })
    }

    /// Count an interruption. Valid only during a non-idle focus phase;
    /// outside that this is a guarded no-op, not an error. The countdown is
    /// unaffected.
    pub fn record_interruption(&mut self) -> Option<Event> {
        if !self.phase.is_focus() || self.status == ClockStatus::Idle {
            return None;
        }
        self.interruptions += 1;
        Some(Event::InterruptionRecorded {
            interruptions: self.interruptions,
            at: Utc::now(),
        })
    }

    /// Force the countdown to zero and complete the current phase through
    /// the same path as natural expiry. No-op from idle -- nothing has
    /// started, so nothing completes.
    pub fn skip(&mut self) -> Option<Event> {
        self.skip_at(now_ms())
    }

    /// `skip` with an explicit wall clock, for tests.
    pub fn skip_at(&mut self, now_epoch_ms: u64) -> Option<Event> {
        if self.status == ClockStatus::Idle {
            return None;
        }
        self.close_pause_interval(now_epoch_ms);
        self.time_left_secs = 0;
        Some(self.finish_phase())
    }

    /// Advance the countdown by one second. The caller invokes this once per
    /// second while the clock is running; in any other state it is a no-op.
    ///
    /// Returns `Some(Event::PhaseCompleted)` when the phase runs out.
    pub fn tick(&mut self) -> Option<Event> {
        if self.status != ClockStatus::Running {
            return None;
        }
        self.time_left_secs = self.time_left_secs.saturating_sub(1);
        if self.time_left_secs == 0 {
            return Some(self.finish_phase());
        }
        None
    }

    /// Replace the settings, e.g. after a server-side update. An idle clock
    /// picks up the new phase length immediately; a live countdown keeps its
    /// remaining time.
    pub fn set_settings(&mut self, settings: FocusSettings) {
        self.settings = settings;
        if self.status == ClockStatus::Idle {
            self.total_secs = self.settings.phase_duration_secs(self.phase);
            self.time_left_secs = self.total_secs;
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// The single completion path shared by tick-to-zero and skip.
    fn finish_phase(&mut self) -> Event {
        let completed = Event::PhaseCompleted {
            phase: self.phase,
            total_secs: self.total_secs,
            paused_secs: self.paused_secs(),
            interruptions: self.interruptions,
            at: Utc::now(),
        };

        let (next, auto_start) = if self.phase.is_focus() {
            self.session_count += 1;
            (
                Phase::after_focus(self.session_count, self.settings.cadence),
                self.settings.auto_start_breaks,
            )
        } else {
            // Returning to focus: the focus-phase interruption counter
            // belongs to the new phase.
            self.interruptions = 0;
            (Phase::Focus, self.settings.auto_start_pomodoros)
        };

        self.phase = next;
        self.total_secs = self.settings.phase_duration_secs(next);
        self.time_left_secs = self.total_secs;
        self.paused_since_epoch_ms = None;
        self.paused_ms = 0;
        self.status = if auto_start {
            ClockStatus::Running
        } else {
            ClockStatus::Idle
        };

        completed
    }

    fn close_pause_interval(&mut self, now_epoch_ms: u64) {
        if let Some(since) = self.paused_since_epoch_ms.take() {
            self.paused_ms += now_epoch_ms.saturating_sub(since);
        }
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
