//! Ephemeral timer state parked between CLI invocations.
//!
//! The phase clock and its session binding round-trip through a JSON file in
//! the data directory. Losing this file loses only the local countdown; the
//! server session stays discoverable through the active-session query.

use std::error::Error;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use focusquest_core::{data_dir, FocusSettings, PhaseClock, SessionBinding};

const STATE_FILE: &str = "timer_state.json";

#[derive(Debug, Serialize, Deserialize)]
pub struct TimerState {
    pub clock: PhaseClock,
    pub binding: SessionBinding,
}

impl TimerState {
    pub fn fresh(settings: FocusSettings) -> Self {
        Self {
            clock: PhaseClock::new(settings),
            binding: SessionBinding::Unbound,
        }
    }

    fn path() -> Result<PathBuf, Box<dyn Error>> {
        Ok(data_dir()?.join(STATE_FILE))
    }

    /// Load the parked state, or start fresh with the given settings when
    /// there is none (or it no longer parses).
    pub fn load_or_fresh(settings: FocusSettings) -> Self {
        match Self::path() {
            Ok(path) => Self::load_from(&path).unwrap_or_else(|| Self::fresh(settings)),
            Err(_) => Self::fresh(settings),
        }
    }

    /// None when the file is missing or no longer parses; the countdown
    /// restarts fresh instead of failing the whole command.
    fn load_from(path: &Path) -> Option<Self> {
        let raw = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&raw).ok()
    }

    pub fn save(&self) -> Result<(), Box<dyn Error>> {
        self.save_to(&Self::path()?)
    }

    fn save_to(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        std::fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }
}
