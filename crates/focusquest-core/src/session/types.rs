//! Wire types for the focus-session contract.
//!
//! Field names follow the server's camelCase JSON. The exact envelope around
//! these payloads belongs to the transport; these are the shapes the
//! lifecycle manager reasons about.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::events::Event;
use crate::settings::FocusSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionType {
    Pomodoro,
    Custom,
}

/// Server-owned focus session record. At most one per user is active
/// (`completed == false` and no `endTime`) at any moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    /// Planned focus length in minutes.
    pub planned_duration: u32,
    /// Planned break length in minutes, when the client sent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_duration: Option<u32>,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Minutes actually focused, filled in by the server at completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_duration: Option<u32>,
    #[serde(default)]
    pub interruptions: u32,
    /// Minutes spent paused across pause/resume cycles.
    #[serde(default)]
    pub paused_time: u32,
    #[serde(default)]
    pub completed: bool,
    /// 0-100, computed at completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub productivity: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xp_earned: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl FocusSession {
    /// Whether this record is the user's active-session singleton.
    pub fn is_active(&self) -> bool {
        !self.completed && self.end_time.is_none()
    }
}

/// Payload for opening a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(rename = "type")]
    pub session_type: SessionType,
    /// Focus length in minutes.
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl CreateSessionRequest {
    /// Standard pomodoro request from the user's settings.
    pub fn pomodoro(settings: &FocusSettings) -> Self {
        Self {
            session_type: SessionType::Pomodoro,
            duration: settings.focus_minutes,
            break_duration: Some(settings.short_break_minutes),
            task_id: None,
        }
    }

    pub fn with_task(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    /// Rejected before anything is sent or any local state changes.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.duration == 0 {
            return Err(ValidationError::NonPositiveDuration {
                field: "duration",
                value: self.duration as i64,
            });
        }
        if let Some(0) = self.break_duration {
            return Err(ValidationError::NonPositiveDuration {
                field: "breakDuration",
                value: 0,
            });
        }
        Ok(())
    }
}

/// Partial update for an in-flight session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interruptions: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Server response to a completion call: the finalized session plus the
/// reward payload, and any achievements the completion unlocked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub session: FocusSession,
    pub xp_earned: u32,
    #[serde(default)]
    pub new_achievements: Vec<String>,
}

/// What the local timer knows about its server-side counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SessionBinding {
    /// No focus phase has begun.
    Unbound,
    /// The running focus phase is backed by this server session.
    Bound { session_id: String },
    /// The countdown is running locally but the server never opened a
    /// session; completion cannot award rewards.
    Degraded,
}

impl SessionBinding {
    pub fn session_id(&self) -> Option<&str> {
        match self {
            SessionBinding::Bound { session_id } => Some(session_id),
            _ => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, SessionBinding::Degraded)
    }
}

/// Accounting carried by a focus phase-complete event, in the units the
/// session contract wants (minutes, truncated).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseReport {
    pub total_secs: u32,
    pub paused_secs: u32,
    pub interruptions: u32,
}

impl PhaseReport {
    /// Extract the report from a `PhaseCompleted` event; `None` for any
    /// other event variant.
    pub fn from_event(event: &Event) -> Option<Self> {
        match event {
            Event::PhaseCompleted {
                total_secs,
                paused_secs,
                interruptions,
                ..
            } => Some(Self {
                total_secs: *total_secs,
                paused_secs: *paused_secs,
                interruptions: *interruptions,
            }),
            _ => None,
        }
    }

    /// Minutes actually focused: phase length minus paused time, floored
    /// at zero. Interruptions affect productivity, not duration.
    pub fn actual_minutes(&self) -> u32 {
        self.total_secs.saturating_sub(self.paused_secs) / 60
    }

    pub fn paused_minutes(&self) -> u32 {
        self.paused_secs / 60
    }

    /// The interim update persisted just before completion.
    pub fn as_update(&self) -> SessionUpdate {
        SessionUpdate {
            actual_duration: Some(self.actual_minutes()),
            interruptions: Some(self.interruptions),
            paused_time: Some(self.paused_minutes()),
            ..SessionUpdate::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_validation() {
        let settings = FocusSettings::default();
        assert!(CreateSessionRequest::pomodoro(&settings).validate().is_ok());

        let bad = CreateSessionRequest {
            session_type: SessionType::Custom,
            duration: 0,
            break_duration: None,
            task_id: None,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn session_wire_shape() {
        let json = serde_json::json!({
            "id": "abc",
            "userId": "u1",
            "type": "pomodoro",
            "plannedDuration": 25,
            "startTime": "2026-08-29T09:00:00Z",
            "interruptions": 2,
            "pausedTime": 1,
            "completed": false
        });
        let session: FocusSession = serde_json::from_value(json).unwrap();
        assert_eq!(session.session_type, SessionType::Pomodoro);
        assert!(session.is_active());
        assert_eq!(session.interruptions, 2);
        assert!(session.actual_duration.is_none());
    }

    #[test]
    fn update_serializes_only_set_fields() {
        let update = SessionUpdate {
            interruptions: Some(3),
            ..SessionUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "interruptions": 3 }));
    }

    #[test]
    fn phase_report_minute_accounting() {
        let report = PhaseReport {
            total_secs: 25 * 60,
            paused_secs: 150,
            interruptions: 1,
        };
        // 1500s - 150s = 1350s -> 22 whole minutes
        assert_eq!(report.actual_minutes(), 22);
        assert_eq!(report.paused_minutes(), 2);
        let update = report.as_update();
        assert_eq!(update.actual_duration, Some(22));
        assert_eq!(update.completed, None);
    }

    #[test]
    fn phase_report_ignores_non_completion_events() {
        let event = Event::TimerReset {
            phase: crate::timer::Phase::Focus,
            duration_secs: 1500,
            at: chrono::Utc::now(),
        };
        assert!(PhaseReport::from_event(&event).is_none());
    }
}
