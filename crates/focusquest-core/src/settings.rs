//! Per-user focus settings.
//!
//! Server-owned, read-mostly. The engine consumes these for phase lengths,
//! long-break cadence, auto-start rules, and the XP multiplier; mutation
//! flows through `SessionStore::update_settings` only. Every field carries a
//! serde default so a partial server payload (or an empty offline fallback
//! block in the client TOML) still deserializes.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::timer::Phase;

/// Per-user focus configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSettings {
    /// Focus phase length in minutes.
    #[serde(default = "default_focus_minutes")]
    pub focus_minutes: u32,
    /// Short break length in minutes.
    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: u32,
    /// Long break length in minutes.
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u32,
    /// Completed focus phases between long breaks.
    #[serde(default = "default_cadence")]
    pub cadence: u32,
    /// Start the break automatically when a focus phase completes.
    #[serde(default)]
    pub auto_start_breaks: bool,
    /// Start the next focus phase automatically when a break completes.
    #[serde(default)]
    pub auto_start_pomodoros: bool,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    /// Reward multiplier applied to earned XP.
    #[serde(default = "default_xp_multiplier")]
    pub xp_multiplier: f64,
}

fn default_focus_minutes() -> u32 {
    25
}
fn default_short_break_minutes() -> u32 {
    5
}
fn default_long_break_minutes() -> u32 {
    15
}
fn default_cadence() -> u32 {
    4
}
fn default_true() -> bool {
    true
}
fn default_xp_multiplier() -> f64 {
    1.0
}

impl Default for FocusSettings {
    fn default() -> Self {
        Self {
            focus_minutes: default_focus_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            cadence: default_cadence(),
            auto_start_breaks: false,
            auto_start_pomodoros: false,
            sound_enabled: true,
            notifications_enabled: true,
            xp_multiplier: default_xp_multiplier(),
        }
    }
}

impl FocusSettings {
    /// Configured length of `phase` in minutes.
    pub fn phase_minutes(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Focus => self.focus_minutes,
            Phase::Break => self.short_break_minutes,
            Phase::LongBreak => self.long_break_minutes,
        }
    }

    /// Configured length of `phase` in seconds.
    ///
    /// Saturating, so absurd configured values cannot overflow.
    pub fn phase_duration_secs(&self, phase: Phase) -> u32 {
        self.phase_minutes(phase).saturating_mul(60)
    }

    /// Reject settings that would produce a degenerate timer.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("focusMinutes", self.focus_minutes),
            ("shortBreakMinutes", self.short_break_minutes),
            ("longBreakMinutes", self.long_break_minutes),
            ("cadence", self.cadence),
        ] {
            if value == 0 {
                return Err(ValidationError::NonPositiveDuration {
                    field,
                    value: value as i64,
                });
            }
        }
        if !self.xp_multiplier.is_finite() || self.xp_multiplier < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "xpMultiplier",
                message: format!("{} (must be a finite non-negative number)", self.xp_multiplier),
            });
        }
        Ok(())
    }
}
