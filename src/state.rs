//! The state facade consumed by presentation layers: an explicit context
//! object holding the record store plus an in-memory mirror of all four
//! collections. Mutations hit the store first and update the mirror only on
//! success, so a failed write leaves callers on the previous valid state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::warn;
use tokio::sync::Mutex;

use crate::db::helpers::upsert;
use crate::db::{Database, StoreError};
use crate::models::{
    AppSettings, Client, CueLevel, Goal, GoalStatus, Session, Trial, TrialResponse,
    ValidationError,
};
use crate::stats::{self, ProgressPoint, SessionStats};

#[derive(Default)]
struct Snapshot {
    clients: Vec<Client>,
    goals: Vec<Goal>,
    sessions: Vec<Session>,
    settings: AppSettings,
}

/// Shared handle over the store and its in-memory mirror. Clones share the
/// same mirror; hand one to each screen instead of reaching for a global.
pub struct AppContext {
    db: Database,
    snapshot: Arc<Mutex<Snapshot>>,
}

impl Clone for AppContext {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            snapshot: Arc::clone(&self.snapshot),
        }
    }
}

impl AppContext {
    /// Reconcile cascade residue, then load all four collections into memory.
    pub async fn load(db: Database) -> Result<Self, StoreError> {
        let (goals_dropped, sessions_dropped) = db.prune_orphans().await?;
        if goals_dropped > 0 || sessions_dropped > 0 {
            warn!(
                "Dropped {goals_dropped} orphaned goal(s) and {sessions_dropped} orphaned session(s) left by an interrupted delete"
            );
        }

        let context = Self {
            db,
            snapshot: Arc::new(Mutex::new(Snapshot::default())),
        };
        context.refresh().await?;
        Ok(context)
    }

    /// Discard the in-memory mirror and reload every collection from the
    /// store.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        let clients = self.db.get_clients().await?;
        let goals = self.db.get_goals().await?;
        let sessions = self.db.get_sessions().await?;
        let settings = self.db.get_settings().await?;

        let mut snapshot = self.snapshot.lock().await;
        *snapshot = Snapshot {
            clients,
            goals,
            sessions,
            settings,
        };
        Ok(())
    }

    // --- read side ---------------------------------------------------------

    pub async fn clients(&self) -> Vec<Client> {
        self.snapshot.lock().await.clients.clone()
    }

    pub async fn client(&self, client_id: &str) -> Option<Client> {
        let snapshot = self.snapshot.lock().await;
        snapshot.clients.iter().find(|c| c.id == client_id).cloned()
    }

    pub async fn goal(&self, goal_id: &str) -> Option<Goal> {
        let snapshot = self.snapshot.lock().await;
        snapshot.goals.iter().find(|g| g.id == goal_id).cloned()
    }

    pub async fn goals_for_client(&self, client_id: &str) -> Vec<Goal> {
        let snapshot = self.snapshot.lock().await;
        snapshot
            .goals
            .iter()
            .filter(|g| g.client_id == client_id)
            .cloned()
            .collect()
    }

    pub async fn active_goals_for_client(&self, client_id: &str) -> Vec<Goal> {
        let snapshot = self.snapshot.lock().await;
        snapshot
            .goals
            .iter()
            .filter(|g| g.client_id == client_id && g.status == GoalStatus::Active)
            .cloned()
            .collect()
    }

    pub async fn session(&self, session_id: &str) -> Option<Session> {
        let snapshot = self.snapshot.lock().await;
        snapshot.sessions.iter().find(|s| s.id == session_id).cloned()
    }

    /// Sessions for a client, newest first.
    pub async fn sessions_for_client(&self, client_id: &str) -> Vec<Session> {
        let snapshot = self.snapshot.lock().await;
        let mut sessions: Vec<Session> = snapshot
            .sessions
            .iter()
            .filter(|s| s.client_id == client_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.date.cmp(&a.date));
        sessions
    }

    /// Sessions whose goal set contains the goal, newest first.
    pub async fn sessions_for_goal(&self, goal_id: &str) -> Vec<Session> {
        let snapshot = self.snapshot.lock().await;
        let mut sessions: Vec<Session> = snapshot
            .sessions
            .iter()
            .filter(|s| s.has_goal(goal_id))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.date.cmp(&a.date));
        sessions
    }

    pub async fn settings(&self) -> AppSettings {
        self.snapshot.lock().await.settings.clone()
    }

    /// Stats over every trial of a client's sessions.
    pub async fn client_stats(&self, client_id: &str) -> SessionStats {
        let snapshot = self.snapshot.lock().await;
        stats::stats_for_sessions(snapshot.sessions.iter().filter(|s| s.client_id == client_id))
    }

    /// Stats over every trial recorded in the date window, regardless of goal.
    pub async fn stats_in_range(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> SessionStats {
        let snapshot = self.snapshot.lock().await;
        stats::stats_for_sessions(stats::sessions_in_range(&snapshot.sessions, from, to))
    }

    /// Accuracy-over-time series for one goal, oldest session first.
    pub async fn goal_progress(&self, goal_id: &str) -> Vec<ProgressPoint> {
        let snapshot = self.snapshot.lock().await;
        stats::goal_progress(&snapshot.sessions, goal_id)
    }

    // --- write side --------------------------------------------------------

    pub async fn add_client(&self, client: Client) -> Result<Client, StoreError> {
        self.save_client_inner(client).await
    }

    pub async fn update_client(&self, client: Client) -> Result<Client, StoreError> {
        self.save_client_inner(client).await
    }

    async fn save_client_inner(&self, client: Client) -> Result<Client, StoreError> {
        let saved = self.db.save_client(&client).await?;
        let mut snapshot = self.snapshot.lock().await;
        upsert(&mut snapshot.clients, saved.clone(), |a, b| a.id == b.id);
        Ok(saved)
    }

    /// Delete a client together with all of its goals and sessions.
    pub async fn delete_client(&self, client_id: &str) -> Result<(), StoreError> {
        self.db.delete_client(client_id).await?;
        let mut snapshot = self.snapshot.lock().await;
        snapshot.clients.retain(|c| c.id != client_id);
        snapshot.goals.retain(|g| g.client_id != client_id);
        snapshot.sessions.retain(|s| s.client_id != client_id);
        Ok(())
    }

    pub async fn add_goal(&self, goal: Goal) -> Result<Goal, StoreError> {
        self.save_goal_inner(goal).await
    }

    pub async fn update_goal(&self, goal: Goal) -> Result<Goal, StoreError> {
        self.save_goal_inner(goal).await
    }

    async fn save_goal_inner(&self, goal: Goal) -> Result<Goal, StoreError> {
        let saved = self.db.save_goal(&goal).await?;
        let mut snapshot = self.snapshot.lock().await;
        upsert(&mut snapshot.goals, saved.clone(), |a, b| a.id == b.id);
        Ok(saved)
    }

    /// Delete a goal. Sessions keep their historical trials for it; displays
    /// resolve the missing goal to a placeholder.
    pub async fn delete_goal(&self, goal_id: &str) -> Result<(), StoreError> {
        self.db.delete_goal(goal_id).await?;
        let mut snapshot = self.snapshot.lock().await;
        snapshot.goals.retain(|g| g.id != goal_id);
        Ok(())
    }

    /// Start recording a session for a client, pre-sized with the configured
    /// default duration.
    pub async fn begin_session(
        &self,
        client_id: impl Into<String>,
        goal_ids: Vec<String>,
    ) -> SessionRecorder {
        let duration = self.snapshot.lock().await.settings.default_session_duration;
        SessionRecorder::new(client_id, goal_ids, duration)
    }

    /// Persist a finished session, then fold its per-goal accuracy into each
    /// goal that recorded at least one trial. The update runs once per goal
    /// per session, after the session itself is durably saved. Returns the
    /// updated goals.
    pub async fn record_session(&self, session: Session) -> Result<Vec<Goal>, StoreError> {
        self.db.save_session(&session).await?;

        let mut updated = Vec::new();
        for goal_id in &session.goals {
            let session_stats = stats::stats_for_goal(&session, goal_id);
            if session_stats.total_trials == 0 {
                continue;
            }
            // The goal may have been deleted since the session was planned.
            let Some(mut goal) = self.db.get_goal(goal_id).await? else {
                continue;
            };
            stats::apply_session_to_goal(&mut goal, session_stats.accuracy);
            updated.push(self.db.save_goal(&goal).await?);
        }

        let mut snapshot = self.snapshot.lock().await;
        upsert(&mut snapshot.sessions, session, |a, b| a.id == b.id);
        for goal in &updated {
            upsert(&mut snapshot.goals, goal.clone(), |a, b| a.id == b.id);
        }
        Ok(updated)
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<(), StoreError> {
        self.db.delete_session(session_id).await?;
        let mut snapshot = self.snapshot.lock().await;
        snapshot.sessions.retain(|s| s.id != session_id);
        Ok(())
    }

    pub async fn update_settings(&self, settings: AppSettings) -> Result<AppSettings, StoreError> {
        let saved = self.db.save_settings(&settings).await?;
        self.snapshot.lock().await.settings = saved.clone();
        Ok(saved)
    }

    pub async fn reset_settings(&self) -> Result<AppSettings, StoreError> {
        let defaults = self.db.reset_settings().await?;
        self.snapshot.lock().await.settings = defaults.clone();
        Ok(defaults)
    }

    /// Serialize the whole store into one backup document.
    pub async fn export_backup(&self) -> Result<String, StoreError> {
        self.db.export_all().await
    }

    /// Import a backup document and re-mirror the store.
    pub async fn import_backup(&self, raw: &str) -> Result<(), StoreError> {
        self.db.import_all(raw).await?;
        self.refresh().await
    }

    /// Remove every persisted record and reset the mirror.
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        self.db.clear_all().await?;
        *self.snapshot.lock().await = Snapshot::default();
        Ok(())
    }
}

/// Accumulates trials for an in-progress session. Trials carry the pending
/// placeholder id until [`SessionRecorder::finish`] mints the real session id
/// and rewrites it into every trial.
pub struct SessionRecorder {
    client_id: String,
    goal_ids: Vec<String>,
    duration_minutes: u32,
    notes: Option<String>,
    date: DateTime<Utc>,
    trials: Vec<Trial>,
}

impl SessionRecorder {
    pub fn new(client_id: impl Into<String>, goal_ids: Vec<String>, duration_minutes: u32) -> Self {
        Self {
            client_id: client_id.into(),
            goal_ids,
            duration_minutes,
            notes: None,
            date: Utc::now(),
            trials: Vec::new(),
        }
    }

    pub fn set_duration(&mut self, minutes: u32) {
        self.duration_minutes = minutes;
    }

    pub fn set_notes(&mut self, notes: Option<String>) {
        self.notes = notes;
    }

    /// Record one trial against a goal of this session. A blank prompt gets
    /// an auto-numbered label.
    pub fn add_trial(
        &mut self,
        goal_id: &str,
        prompt: Option<String>,
        response: TrialResponse,
        cue_level: CueLevel,
        notes: Option<String>,
    ) -> Result<(), ValidationError> {
        if !self.goal_ids.iter().any(|g| g == goal_id) {
            return Err(ValidationError::GoalNotInSession(goal_id.to_string()));
        }

        let prompt = match prompt {
            Some(p) if !p.trim().is_empty() => p,
            _ => format!("Trial {}", self.trials.len() + 1),
        };
        self.trials
            .push(Trial::pending(goal_id, prompt, response, cue_level, notes));
        Ok(())
    }

    /// Remove and return the most recently recorded trial.
    pub fn undo_last_trial(&mut self) -> Option<Trial> {
        self.trials.pop()
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn trial_count(&self) -> usize {
        self.trials.len()
    }

    /// Build the final session: mint the real id and rewrite it into every
    /// recorded trial.
    pub fn finish(self) -> Result<Session, ValidationError> {
        let mut session = Session::new(
            self.client_id,
            self.date,
            self.duration_minutes,
            self.goal_ids,
        )?;
        session.notes = self.notes;
        session.trials = self.trials;
        let session_id = session.id.clone();
        for trial in &mut session.trials {
            trial.session_id = session_id.clone();
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PENDING_SESSION_ID;

    #[test]
    fn blank_prompts_get_numbered_labels() {
        let mut recorder = SessionRecorder::new("client-1", vec!["goal-1".into()], 30);
        recorder
            .add_trial("goal-1", None, TrialResponse::Correct, CueLevel::Independent, None)
            .unwrap();
        recorder
            .add_trial(
                "goal-1",
                Some("  ".into()),
                TrialResponse::Incorrect,
                CueLevel::VerbalCue,
                None,
            )
            .unwrap();
        recorder
            .add_trial(
                "goal-1",
                Some("say 'rabbit'".into()),
                TrialResponse::Correct,
                CueLevel::Independent,
                None,
            )
            .unwrap();

        let prompts: Vec<&str> = recorder.trials().iter().map(|t| t.prompt.as_str()).collect();
        assert_eq!(prompts, vec!["Trial 1", "Trial 2", "say 'rabbit'"]);
    }

    #[test]
    fn rejects_trials_for_goals_outside_the_session() {
        let mut recorder = SessionRecorder::new("client-1", vec!["goal-1".into()], 30);
        let err = recorder
            .add_trial("goal-9", None, TrialResponse::Correct, CueLevel::Independent, None)
            .unwrap_err();
        assert_eq!(err, ValidationError::GoalNotInSession("goal-9".into()));
    }

    #[test]
    fn undo_removes_only_the_last_trial() {
        let mut recorder = SessionRecorder::new("client-1", vec!["goal-1".into()], 30);
        for _ in 0..3 {
            recorder
                .add_trial("goal-1", None, TrialResponse::Correct, CueLevel::Independent, None)
                .unwrap();
        }
        let undone = recorder.undo_last_trial().unwrap();
        assert_eq!(undone.prompt, "Trial 3");
        assert_eq!(recorder.trial_count(), 2);
    }

    #[test]
    fn finish_rewrites_pending_session_ids() {
        let mut recorder = SessionRecorder::new("client-1", vec!["goal-1".into()], 45);
        recorder
            .add_trial("goal-1", None, TrialResponse::Correct, CueLevel::Independent, None)
            .unwrap();
        assert_eq!(recorder.trials()[0].session_id, PENDING_SESSION_ID);

        let session = recorder.finish().unwrap();
        assert_eq!(session.duration_minutes, 45);
        assert!(session.trials.iter().all(|t| t.session_id == session.id));
    }
}
