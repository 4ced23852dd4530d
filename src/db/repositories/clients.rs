use chrono::Utc;

use crate::db::{
    connection::{keys, Database},
    error::StoreError,
    helpers::{read_collection, upsert, write_collection},
};
use crate::models::{Client, Goal, Session};

impl Database {
    pub async fn get_clients(&self) -> Result<Vec<Client>, StoreError> {
        self.execute(|kv| Ok(read_collection(kv, keys::CLIENTS))).await
    }

    pub async fn get_client(&self, client_id: &str) -> Result<Option<Client>, StoreError> {
        let client_id = client_id.to_string();
        self.execute(move |kv| {
            let clients: Vec<Client> = read_collection(kv, keys::CLIENTS);
            Ok(clients.into_iter().find(|c| c.id == client_id))
        })
        .await
    }

    /// Upsert a client by id and stamp `updated_at`. Returns the record as
    /// persisted so callers can mirror it.
    pub async fn save_client(&self, client: &Client) -> Result<Client, StoreError> {
        let mut record = client.clone();
        self.execute(move |kv| {
            record.updated_at = Utc::now();
            let mut clients: Vec<Client> = read_collection(kv, keys::CLIENTS);
            upsert(&mut clients, record.clone(), |a, b| a.id == b.id);
            write_collection(kv, keys::CLIENTS, &clients)?;
            Ok(record)
        })
        .await
    }

    /// Remove a client and cascade to the goals and sessions that reference
    /// it. The three collections are written one after another; a crash in
    /// between can leave orphans, which the load-time reconciliation pass
    /// drops (see [`Database::prune_orphans`]).
    pub async fn delete_client(&self, client_id: &str) -> Result<(), StoreError> {
        let client_id = client_id.to_string();
        self.execute(move |kv| {
            let mut clients: Vec<Client> = read_collection(kv, keys::CLIENTS);
            clients.retain(|c| c.id != client_id);
            write_collection(kv, keys::CLIENTS, &clients)?;

            let mut goals: Vec<Goal> = read_collection(kv, keys::GOALS);
            goals.retain(|g| g.client_id != client_id);
            write_collection(kv, keys::GOALS, &goals)?;

            let mut sessions: Vec<Session> = read_collection(kv, keys::SESSIONS);
            sessions.retain(|s| s.client_id != client_id);
            write_collection(kv, keys::SESSIONS, &sessions)
        })
        .await
    }

    /// Drop goals and sessions whose client id no longer resolves, the
    /// residue of a cascade delete interrupted between collection writes.
    /// Returns the number of goals and sessions removed.
    pub async fn prune_orphans(&self) -> Result<(usize, usize), StoreError> {
        self.execute(|kv| {
            let clients: Vec<Client> = read_collection(kv, keys::CLIENTS);
            let client_ids: std::collections::HashSet<String> =
                clients.into_iter().map(|c| c.id).collect();

            let mut goals: Vec<Goal> = read_collection(kv, keys::GOALS);
            let goals_before = goals.len();
            goals.retain(|g| client_ids.contains(&g.client_id));
            let goals_dropped = goals_before - goals.len();
            if goals_dropped > 0 {
                write_collection(kv, keys::GOALS, &goals)?;
            }

            let mut sessions: Vec<Session> = read_collection(kv, keys::SESSIONS);
            let sessions_before = sessions.len();
            sessions.retain(|s| client_ids.contains(&s.client_id));
            let sessions_dropped = sessions_before - sessions.len();
            if sessions_dropped > 0 {
                write_collection(kv, keys::SESSIONS, &sessions)?;
            }

            Ok((goals_dropped, sessions_dropped))
        })
        .await
    }
}
