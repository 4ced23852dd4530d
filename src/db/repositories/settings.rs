use log::warn;

use crate::db::{
    connection::{keys, Database},
    error::StoreError,
    kv::KeyValueStore,
};
use crate::models::AppSettings;

/// Deserialize the settings document, falling back to the hard-coded default
/// when nothing has been persisted or the persisted bytes are unreadable.
pub(crate) fn read_settings(kv: &dyn KeyValueStore) -> AppSettings {
    let raw = match kv.get(keys::SETTINGS) {
        Ok(Some(raw)) => raw,
        Ok(None) => return AppSettings::default(),
        Err(err) => {
            warn!("Failed to read settings, using defaults: {err}");
            return AppSettings::default();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|err| {
        warn!("Discarding unparseable settings document: {err}");
        AppSettings::default()
    })
}

pub(crate) fn write_settings(
    kv: &mut dyn KeyValueStore,
    settings: &AppSettings,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(settings).map_err(|err| StoreError::Write(err.to_string()))?;
    kv.put(keys::SETTINGS, &raw)
}

impl Database {
    pub async fn get_settings(&self) -> Result<AppSettings, StoreError> {
        self.execute(|kv| Ok(read_settings(kv))).await
    }

    /// Overwrite the single settings document. Numeric fields are clamped
    /// into their supported ranges; the persisted record is returned so
    /// callers can mirror it.
    pub async fn save_settings(&self, settings: &AppSettings) -> Result<AppSettings, StoreError> {
        let record = settings.clone().clamped();
        self.execute(move |kv| {
            write_settings(kv, &record)?;
            Ok(record)
        })
        .await
    }

    pub async fn reset_settings(&self) -> Result<AppSettings, StoreError> {
        self.execute(|kv| {
            let defaults = AppSettings::default();
            write_settings(kv, &defaults)?;
            Ok(defaults)
        })
        .await
    }
}
