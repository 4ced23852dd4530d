use crate::db::{
    connection::{keys, Database},
    error::StoreError,
    helpers::{read_collection, upsert, write_collection},
};
use crate::models::Session;

fn newest_first(sessions: &mut [Session]) {
    sessions.sort_by(|a, b| b.date.cmp(&a.date));
}

impl Database {
    pub async fn get_sessions(&self) -> Result<Vec<Session>, StoreError> {
        self.execute(|kv| Ok(read_collection(kv, keys::SESSIONS))).await
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Option<Session>, StoreError> {
        let session_id = session_id.to_string();
        self.execute(move |kv| {
            let sessions: Vec<Session> = read_collection(kv, keys::SESSIONS);
            Ok(sessions.into_iter().find(|s| s.id == session_id))
        })
        .await
    }

    /// Sessions for a client, newest first.
    pub async fn get_sessions_for_client(
        &self,
        client_id: &str,
    ) -> Result<Vec<Session>, StoreError> {
        let client_id = client_id.to_string();
        self.execute(move |kv| {
            let sessions: Vec<Session> = read_collection(kv, keys::SESSIONS);
            let mut matching: Vec<Session> = sessions
                .into_iter()
                .filter(|s| s.client_id == client_id)
                .collect();
            newest_first(&mut matching);
            Ok(matching)
        })
        .await
    }

    /// Sessions whose goal set contains `goal_id`, newest first.
    pub async fn get_sessions_for_goal(&self, goal_id: &str) -> Result<Vec<Session>, StoreError> {
        let goal_id = goal_id.to_string();
        self.execute(move |kv| {
            let sessions: Vec<Session> = read_collection(kv, keys::SESSIONS);
            let mut matching: Vec<Session> = sessions
                .into_iter()
                .filter(|s| s.has_goal(&goal_id))
                .collect();
            newest_first(&mut matching);
            Ok(matching)
        })
        .await
    }

    /// Upsert a session by id. Sessions carry no `updated_at`; they are
    /// append-only data and only ever replaced wholesale.
    pub async fn save_session(&self, session: &Session) -> Result<(), StoreError> {
        let record = session.clone();
        self.execute(move |kv| {
            let mut sessions: Vec<Session> = read_collection(kv, keys::SESSIONS);
            upsert(&mut sessions, record, |a, b| a.id == b.id);
            write_collection(kv, keys::SESSIONS, &sessions)
        })
        .await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<(), StoreError> {
        let session_id = session_id.to_string();
        self.execute(move |kv| {
            let mut sessions: Vec<Session> = read_collection(kv, keys::SESSIONS);
            sessions.retain(|s| s.id != session_id);
            write_collection(kv, keys::SESSIONS, &sessions)
        })
        .await
    }
}
