//! Productivity and XP computation for completed focus sessions.
//!
//! `compute_rewards` is deterministic and side-effect free. In the deployed
//! system the server invokes it at completion time -- the client never gets
//! to assert its own score -- but shipping it here keeps the curve a single
//! testable unit and lets the shell preview expected rewards.
//!
//! Monotonicity contract, holding everything else fixed:
//! - more interruptions never raise productivity;
//! - a larger shortfall of `actual_duration` against `planned_duration`
//!   never raises productivity;
//! - the XP factor is non-decreasing in productivity.
//!
//! The exact constants are policy, not contract: they live in
//! [`RewardPolicy`] with serde defaults and can be tuned without touching
//! this module's logic.

use serde::{Deserialize, Serialize};

use crate::session::FocusSession;
use crate::settings::FocusSettings;

/// Tunable reward curve constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardPolicy {
    /// Productivity cost of the first interruption.
    #[serde(default = "default_interruption_penalty")]
    pub interruption_penalty: f64,
    /// Geometric decay applied to each further interruption, so the k-th
    /// interruption costs `penalty * decay^(k-1)`.
    #[serde(default = "default_interruption_decay")]
    pub interruption_decay: f64,
    /// Productivity cost of finishing with zero actual duration; scales
    /// linearly with the shortfall fraction.
    #[serde(default = "default_shortfall_weight")]
    pub shortfall_weight: f64,
    /// Productivity never drops below this.
    #[serde(default)]
    pub productivity_floor: f64,
    /// XP earned per focused minute before multipliers.
    #[serde(default = "default_base_xp_per_minute")]
    pub base_xp_per_minute: f64,
    /// XP factor at productivity 0; rises linearly to 1.0 at productivity
    /// 100, so a poor session still earns something.
    #[serde(default = "default_min_productivity_factor")]
    pub min_productivity_factor: f64,
}

fn default_interruption_penalty() -> f64 {
    8.0
}
fn default_interruption_decay() -> f64 {
    0.8
}
fn default_shortfall_weight() -> f64 {
    60.0
}
fn default_base_xp_per_minute() -> f64 {
    2.0
}
fn default_min_productivity_factor() -> f64 {
    0.5
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            interruption_penalty: default_interruption_penalty(),
            interruption_decay: default_interruption_decay(),
            shortfall_weight: default_shortfall_weight(),
            productivity_floor: 0.0,
            base_xp_per_minute: default_base_xp_per_minute(),
            min_productivity_factor: default_min_productivity_factor(),
        }
    }
}

/// Outcome of the reward computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rewards {
    /// 0-100 session quality score.
    pub productivity: u8,
    /// Non-negative XP amount.
    pub xp: u32,
}

/// Map a completed session to its productivity score and XP amount.
///
/// `actual_duration` falls back to the planned duration when the server has
/// not filled it in yet (a session completed with no pauses).
pub fn compute_rewards(
    session: &FocusSession,
    settings: &FocusSettings,
    policy: &RewardPolicy,
) -> Rewards {
    let planned = session.planned_duration.max(1) as f64;
    let actual = session
        .actual_duration
        .unwrap_or(session.planned_duration)
        .min(session.planned_duration) as f64;

    let productivity = productivity_score(
        actual / planned,
        session.interruptions,
        policy,
    );

    let factor = productivity_factor(productivity, policy);
    let xp = (policy.base_xp_per_minute * actual * settings.xp_multiplier * factor)
        .round()
        .max(0.0) as u32;

    Rewards {
        productivity: productivity.round().clamp(0.0, 100.0) as u8,
        xp,
    }
}

/// Baseline 100, minus a diminishing per-interruption penalty, minus a
/// linear shortfall penalty, clamped to `[floor, 100]`.
fn productivity_score(completion_ratio: f64, interruptions: u32, policy: &RewardPolicy) -> f64 {
    let interruption_cost = geometric_sum(
        policy.interruption_penalty,
        policy.interruption_decay,
        interruptions,
    );
    let shortfall = (1.0 - completion_ratio.clamp(0.0, 1.0)) * policy.shortfall_weight;
    (100.0 - interruption_cost - shortfall).clamp(policy.productivity_floor.min(100.0), 100.0)
}

/// Non-decreasing map from productivity to the XP multiplier range
/// `[min_factor, 1.0]`.
fn productivity_factor(productivity: f64, policy: &RewardPolicy) -> f64 {
    let min = policy.min_productivity_factor.clamp(0.0, 1.0);
    min + (1.0 - min) * (productivity.clamp(0.0, 100.0) / 100.0)
}

/// Sum of the first `n` terms of `base * decay^k`.
fn geometric_sum(base: f64, decay: f64, n: u32) -> f64 {
    if n == 0 {
        return 0.0;
    }
    if (decay - 1.0).abs() < f64::EPSILON {
        return base * n as f64;
    }
    base * (1.0 - decay.powi(n as i32)) / (1.0 - decay)
}
