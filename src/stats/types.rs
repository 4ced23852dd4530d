use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary statistics over a sequence of trials. The four response counts
/// always sum to `total_trials`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_trials: usize,
    pub correct_trials: usize,
    pub incorrect_trials: usize,
    pub approximation_trials: usize,
    pub no_response_trials: usize,
    /// Percentage of correct trials, rounded to the nearest integer; 0 when
    /// there are no trials.
    pub accuracy: u8,
}

/// One point of a goal's accuracy-over-time series: the stats of a single
/// session's trials for that goal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPoint {
    pub session_id: String,
    pub date: DateTime<Utc>,
    pub accuracy: u8,
    pub total_trials: usize,
}
