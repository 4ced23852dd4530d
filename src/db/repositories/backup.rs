use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{
    connection::{keys, Database},
    error::StoreError,
    helpers::{read_collection, write_collection},
    repositories::settings::{read_settings, write_settings},
};
use crate::models::{AppSettings, Client, Goal, Session};

/// The backup wire format: one JSON object bundling all four collections.
/// Collections absent from an imported document are skipped, so every field
/// is optional on the way in; export always fills all of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    #[serde(default)]
    pub export_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub clients: Option<Vec<Client>>,
    #[serde(default)]
    pub goals: Option<Vec<Goal>>,
    #[serde(default)]
    pub sessions: Option<Vec<Session>>,
    #[serde(default)]
    pub settings: Option<AppSettings>,
}

impl Database {
    /// Bundle all four collections plus an export timestamp into one JSON
    /// document.
    pub async fn export_all(&self) -> Result<String, StoreError> {
        self.execute(|kv| {
            let document = BackupDocument {
                export_date: Some(Utc::now()),
                clients: Some(read_collection(kv, keys::CLIENTS)),
                goals: Some(read_collection(kv, keys::GOALS)),
                sessions: Some(read_collection(kv, keys::SESSIONS)),
                settings: Some(read_settings(kv)),
            };
            serde_json::to_string_pretty(&document)
                .map_err(|err| StoreError::Write(err.to_string()))
        })
        .await
    }

    /// Overwrite each collection present in the document wholesale: last
    /// write wins per collection, never a per-record merge. Unparseable input
    /// fails without touching the store; missing keys are skipped.
    pub async fn import_all(&self, raw: &str) -> Result<(), StoreError> {
        let raw = raw.to_string();
        self.execute(move |kv| {
            let document: BackupDocument =
                serde_json::from_str(&raw).map_err(|err| StoreError::ImportFormat(err.to_string()))?;

            if let Some(clients) = document.clients {
                write_collection(kv, keys::CLIENTS, &clients)?;
            }
            if let Some(goals) = document.goals {
                write_collection(kv, keys::GOALS, &goals)?;
            }
            if let Some(sessions) = document.sessions {
                write_collection(kv, keys::SESSIONS, &sessions)?;
            }
            if let Some(settings) = document.settings {
                write_settings(kv, &settings.clamped())?;
            }

            Ok(())
        })
        .await
    }

    /// Remove all four collection documents unconditionally.
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        self.execute(|kv| {
            for key in keys::ALL {
                kv.remove(key)?;
            }
            Ok(())
        })
        .await
    }
}
