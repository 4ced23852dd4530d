use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ValidationError;

/// Session id carried by trials recorded before their session is saved.
/// Rewritten to the real id when the owning session is finalized.
pub const PENDING_SESSION_ID: &str = "pending";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrialResponse {
    Correct,
    Incorrect,
    Approximation,
    NoResponse,
}

impl TrialResponse {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrialResponse::Correct => "correct",
            TrialResponse::Incorrect => "incorrect",
            TrialResponse::Approximation => "approximation",
            TrialResponse::NoResponse => "no_response",
        }
    }
}

/// Degree of prompting given before a trial, ordered from fully independent
/// to full physical assistance. The derived `Ord` follows declaration order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CueLevel {
    Independent,
    VerbalCue,
    VisualCue,
    Model,
    PartialPhysical,
    FullPhysical,
}

impl CueLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CueLevel::Independent => "independent",
            CueLevel::VerbalCue => "verbal_cue",
            CueLevel::VisualCue => "visual_cue",
            CueLevel::Model => "model",
            CueLevel::PartialPhysical => "partial_physical",
            CueLevel::FullPhysical => "full_physical",
        }
    }
}

/// One recorded stimulus/response event, attributed to a goal. Immutable once
/// recorded except for whole-record removal ("undo last").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trial {
    pub id: String,
    pub session_id: String,
    pub goal_id: String,
    pub prompt: String,
    pub response: TrialResponse,
    pub cue_level: CueLevel,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Trial {
    /// Record a trial against a goal, before the owning session exists.
    pub fn pending(
        goal_id: impl Into<String>,
        prompt: impl Into<String>,
        response: TrialResponse,
        cue_level: CueLevel,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: PENDING_SESSION_ID.to_string(),
            goal_id: goal_id.into(),
            prompt: prompt.into(),
            response,
            cue_level,
            notes,
            timestamp: Utc::now(),
        }
    }
}

/// One therapy encounter for a client, covering one or more goals.
///
/// Append-only for reporting purposes: a session may be deleted wholesale but
/// not partially amended after it is saved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub client_id: String,
    pub date: DateTime<Utc>,
    pub duration_minutes: u32,
    pub notes: Option<String>,
    pub goals: Vec<String>,
    pub trials: Vec<Trial>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        client_id: impl Into<String>,
        date: DateTime<Utc>,
        duration_minutes: u32,
        mut goals: Vec<String>,
    ) -> Result<Self, ValidationError> {
        if duration_minutes == 0 {
            return Err(ValidationError::InvalidDuration(duration_minutes));
        }

        // The goals field is a set; drop duplicates while keeping order.
        let mut seen = std::collections::HashSet::new();
        goals.retain(|g| seen.insert(g.clone()));

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            client_id: client_id.into(),
            date,
            duration_minutes,
            notes: None,
            goals,
            trials: Vec::new(),
            created_at: Utc::now(),
        })
    }

    pub fn has_goal(&self, goal_id: &str) -> bool {
        self.goals.iter().any(|g| g == goal_id)
    }

    pub fn trials_for_goal<'a>(&'a self, goal_id: &'a str) -> impl Iterator<Item = &'a Trial> {
        self.trials.iter().filter(move |t| t.goal_id == goal_id)
    }
}
