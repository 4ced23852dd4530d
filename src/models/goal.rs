use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ValidationError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoalCategory {
    Articulation,
    Language,
    Fluency,
    Voice,
    Pragmatics,
    Phonology,
    Other,
}

impl GoalCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalCategory::Articulation => "articulation",
            GoalCategory::Language => "language",
            GoalCategory::Fluency => "fluency",
            GoalCategory::Voice => "voice",
            GoalCategory::Pragmatics => "pragmatics",
            GoalCategory::Phonology => "phonology",
            GoalCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Active,
    Achieved,
    Discontinued,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "active",
            GoalStatus::Achieved => "achieved",
            GoalStatus::Discontinued => "discontinued",
        }
    }
}

/// A measurable therapy objective owned by exactly one client.
///
/// `current_accuracy` is maintained by session recording (see `stats`); the
/// legal status transitions are active → achieved, active → discontinued, and
/// achieved/discontinued → active.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub client_id: String,
    pub name: String,
    pub description: String,
    pub category: GoalCategory,
    pub target_accuracy: u8,
    pub current_accuracy: u8,
    pub status: GoalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(
        client_id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        category: GoalCategory,
        target_accuracy: u8,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyGoalName);
        }
        if !(1..=100).contains(&target_accuracy) {
            return Err(ValidationError::InvalidTargetAccuracy(target_accuracy));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            client_id: client_id.into(),
            name,
            description: description.into(),
            category,
            target_accuracy,
            current_accuracy: 0,
            status: GoalStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Mark an active goal as achieved. Returns whether the status changed.
    pub fn achieve(&mut self) -> bool {
        if self.status == GoalStatus::Active {
            self.status = GoalStatus::Achieved;
            true
        } else {
            false
        }
    }

    /// Mark an active goal as discontinued. Returns whether the status changed.
    pub fn discontinue(&mut self) -> bool {
        if self.status == GoalStatus::Active {
            self.status = GoalStatus::Discontinued;
            true
        } else {
            false
        }
    }

    /// Bring an achieved or discontinued goal back into active work.
    pub fn reactivate(&mut self) -> bool {
        if self.status != GoalStatus::Active {
            self.status = GoalStatus::Active;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal() -> Goal {
        Goal::new("client-1", "Produce /r/ in words", "", GoalCategory::Articulation, 80).unwrap()
    }

    #[test]
    fn rejects_out_of_range_target() {
        let err = Goal::new("c", "g", "", GoalCategory::Language, 0).unwrap_err();
        assert_eq!(err, ValidationError::InvalidTargetAccuracy(0));
        assert!(Goal::new("c", "g", "", GoalCategory::Language, 101).is_err());
        assert!(Goal::new("c", "g", "", GoalCategory::Language, 100).is_ok());
    }

    #[test]
    fn status_transitions() {
        let mut g = goal();
        assert!(g.achieve());
        assert_eq!(g.status, GoalStatus::Achieved);
        // achieved goals cannot be discontinued, only reactivated
        assert!(!g.discontinue());
        assert!(g.reactivate());
        assert!(g.discontinue());
        assert_eq!(g.status, GoalStatus::Discontinued);
        assert!(g.reactivate());
        assert_eq!(g.status, GoalStatus::Active);
    }
}
