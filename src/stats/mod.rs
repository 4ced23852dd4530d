//! Pure derivations over recorded trials: per-response counts, accuracy
//! percentages, and the goal-accuracy update applied when a session is saved.
//!
//! Nothing here knows about session or goal boundaries; callers supply the
//! pre-filtered trial sequence (one goal within a session, or all trials of a
//! date-filtered set of sessions).

mod types;

pub use types::{ProgressPoint, SessionStats};

use chrono::{DateTime, Utc};

use crate::models::{Goal, GoalStatus, Session, Trial, TrialResponse};

/// Count trials by response and derive the accuracy percentage. Output is
/// independent of input order.
pub fn compute_stats<'a, I>(trials: I) -> SessionStats
where
    I: IntoIterator<Item = &'a Trial>,
{
    let mut stats = SessionStats::default();
    for trial in trials {
        stats.total_trials += 1;
        match trial.response {
            TrialResponse::Correct => stats.correct_trials += 1,
            TrialResponse::Incorrect => stats.incorrect_trials += 1,
            TrialResponse::Approximation => stats.approximation_trials += 1,
            TrialResponse::NoResponse => stats.no_response_trials += 1,
        }
    }
    stats.accuracy = percentage(stats.correct_trials, stats.total_trials);
    stats
}

/// `round(100 × part / total)`, 0 when total is 0. Rounds half away from
/// zero, which for these non-negative inputs is round-half-up.
fn percentage(part: usize, total: usize) -> u8 {
    if total == 0 {
        0
    } else {
        (100.0 * part as f64 / total as f64).round() as u8
    }
}

/// Two-point running average between a goal's stored accuracy and one
/// session's accuracy: `round((previous + session) / 2)`.
///
/// This deliberately does not weight by trial count; it reproduces the
/// historical update formula, and recorded data depends on it staying stable.
pub fn blended_accuracy(previous: u8, session: u8) -> u8 {
    ((previous as f64 + session as f64) / 2.0).round() as u8
}

/// Fold one session's accuracy for this goal into its stored accuracy, and
/// transition an active goal to achieved when the blended value reaches the
/// target. Returns whether the goal was achieved by this update.
pub fn apply_session_to_goal(goal: &mut Goal, session_accuracy: u8) -> bool {
    goal.current_accuracy = blended_accuracy(goal.current_accuracy, session_accuracy);
    if goal.status == GoalStatus::Active && goal.current_accuracy >= goal.target_accuracy {
        goal.achieve()
    } else {
        false
    }
}

/// Stats over one goal's trials within a single session.
pub fn stats_for_goal(session: &Session, goal_id: &str) -> SessionStats {
    compute_stats(session.trials_for_goal(goal_id))
}

/// Stats over every trial of the given sessions, regardless of goal.
pub fn stats_for_sessions<'a, I>(sessions: I) -> SessionStats
where
    I: IntoIterator<Item = &'a Session>,
{
    compute_stats(sessions.into_iter().flat_map(|s| s.trials.iter()))
}

/// Sessions whose date falls within `[from, to]`, for time-windowed reports.
pub fn sessions_in_range<'a>(
    sessions: &'a [Session],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Vec<&'a Session> {
    sessions
        .iter()
        .filter(|s| s.date >= from && s.date <= to)
        .collect()
}

/// Accuracy-over-time series for one goal: one point per session that
/// recorded at least one trial for it, oldest first.
pub fn goal_progress(sessions: &[Session], goal_id: &str) -> Vec<ProgressPoint> {
    let mut points: Vec<ProgressPoint> = sessions
        .iter()
        .filter_map(|session| {
            let stats = stats_for_goal(session, goal_id);
            if stats.total_trials == 0 {
                return None;
            }
            Some(ProgressPoint {
                session_id: session.id.clone(),
                date: session.date,
                accuracy: stats.accuracy,
                total_trials: stats.total_trials,
            })
        })
        .collect();
    points.sort_by(|a, b| a.date.cmp(&b.date));
    points
}
