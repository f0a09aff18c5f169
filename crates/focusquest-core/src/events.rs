use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{ClockStatus, Phase};

/// Every observable state change of the phase clock produces an Event.
/// The shell polls for events; the notification capability consumes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    PhaseStarted {
        phase: Phase,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    PhasePaused {
        time_left_secs: u32,
        at: DateTime<Utc>,
    },
    PhaseResumed {
        time_left_secs: u32,
        at: DateTime<Utc>,
    },
    /// A phase ran to zero, either naturally or via skip. Skip and natural
    /// expiry share this one completion path, so the payload shape is
    /// identical for both.
    PhaseCompleted {
        phase: Phase,
        total_secs: u32,
        paused_secs: u32,
        interruptions: u32,
        at: DateTime<Utc>,
    },
    InterruptionRecorded {
        interruptions: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        phase: Phase,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        status: ClockStatus,
        time_left_secs: u32,
        total_secs: u32,
        session_count: u32,
        interruptions: u32,
        progress: f64,
        at: DateTime<Utc>,
    },
}
