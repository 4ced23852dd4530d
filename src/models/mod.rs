mod client;
mod goal;
mod session;
mod settings;

pub use client::Client;
pub use goal::{Goal, GoalCategory, GoalStatus};
pub use session::{CueLevel, Session, Trial, TrialResponse, PENDING_SESSION_ID};
pub use settings::{AppSettings, Theme};

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("client first name must not be empty")]
    EmptyFirstName,

    #[error("goal name must not be empty")]
    EmptyGoalName,

    #[error("invalid target accuracy {0}: must be between 1 and 100")]
    InvalidTargetAccuracy(u8),

    #[error("invalid session duration {0}: must be at least 1 minute")]
    InvalidDuration(u32),

    #[error("goal {0} is not part of this session")]
    GoalNotInSession(String),
}
