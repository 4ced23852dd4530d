use chrono::Utc;

use crate::db::{
    connection::{keys, Database},
    error::StoreError,
    helpers::{read_collection, upsert, write_collection},
};
use crate::models::{Goal, GoalStatus};

impl Database {
    pub async fn get_goals(&self) -> Result<Vec<Goal>, StoreError> {
        self.execute(|kv| Ok(read_collection(kv, keys::GOALS))).await
    }

    pub async fn get_goal(&self, goal_id: &str) -> Result<Option<Goal>, StoreError> {
        let goal_id = goal_id.to_string();
        self.execute(move |kv| {
            let goals: Vec<Goal> = read_collection(kv, keys::GOALS);
            Ok(goals.into_iter().find(|g| g.id == goal_id))
        })
        .await
    }

    /// Goals belonging to a client, in insertion order.
    pub async fn get_goals_for_client(&self, client_id: &str) -> Result<Vec<Goal>, StoreError> {
        let client_id = client_id.to_string();
        self.execute(move |kv| {
            let goals: Vec<Goal> = read_collection(kv, keys::GOALS);
            Ok(goals.into_iter().filter(|g| g.client_id == client_id).collect())
        })
        .await
    }

    pub async fn get_active_goals_for_client(
        &self,
        client_id: &str,
    ) -> Result<Vec<Goal>, StoreError> {
        let client_id = client_id.to_string();
        self.execute(move |kv| {
            let goals: Vec<Goal> = read_collection(kv, keys::GOALS);
            Ok(goals
                .into_iter()
                .filter(|g| g.client_id == client_id && g.status == GoalStatus::Active)
                .collect())
        })
        .await
    }

    /// Upsert a goal by id and stamp `updated_at`. Returns the record as
    /// persisted so callers can mirror it.
    pub async fn save_goal(&self, goal: &Goal) -> Result<Goal, StoreError> {
        let mut record = goal.clone();
        self.execute(move |kv| {
            record.updated_at = Utc::now();
            let mut goals: Vec<Goal> = read_collection(kv, keys::GOALS);
            upsert(&mut goals, record.clone(), |a, b| a.id == b.id);
            write_collection(kv, keys::GOALS, &goals)?;
            Ok(record)
        })
        .await
    }

    /// Remove a goal. Historical trials referencing it are kept; readers
    /// render a placeholder for the missing goal.
    pub async fn delete_goal(&self, goal_id: &str) -> Result<(), StoreError> {
        let goal_id = goal_id.to_string();
        self.execute(move |kv| {
            let mut goals: Vec<Goal> = read_collection(kv, keys::GOALS);
            goals.retain(|g| g.id != goal_id);
            write_collection(kv, keys::GOALS, &goals)
        })
        .await
    }
}
