use serde::{Deserialize, Serialize};

/// One segment of the Pomodoro cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Focus,
    Break,
    LongBreak,
}

impl Phase {
    pub fn is_focus(self) -> bool {
        self == Phase::Focus
    }

    pub fn is_break(self) -> bool {
        matches!(self, Phase::Break | Phase::LongBreak)
    }

    /// Phase that follows a completed focus phase.
    ///
    /// `session_count` is the number of focus phases completed so far,
    /// including the one that just finished. Every `cadence`-th completion
    /// earns a long break.
    pub fn after_focus(session_count: u32, cadence: u32) -> Phase {
        if cadence > 0 && session_count % cadence == 0 {
            Phase::LongBreak
        } else {
            Phase::Break
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Focus => write!(f, "focus"),
            Phase::Break => write!(f, "break"),
            Phase::LongBreak => write!(f, "long break"),
        }
    }
}
