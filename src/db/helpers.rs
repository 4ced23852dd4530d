use log::warn;
use serde::{de::DeserializeOwned, Serialize};

use crate::db::error::StoreError;
use crate::db::kv::KeyValueStore;

/// Deserialize a whole collection document. Missing or unreadable documents
/// are served as an empty collection rather than surfaced to callers.
pub(crate) fn read_collection<T: DeserializeOwned>(kv: &dyn KeyValueStore, key: &str) -> Vec<T> {
    let raw = match kv.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!("Failed to read {key} collection, treating as empty: {err}");
            return Vec::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(err) => {
            warn!("Discarding unparseable {key} collection: {err}");
            Vec::new()
        }
    }
}

/// Serialize and persist a whole collection document under its key.
pub(crate) fn write_collection<T: Serialize>(
    kv: &mut dyn KeyValueStore,
    key: &str,
    items: &[T],
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(items).map_err(|err| StoreError::Write(err.to_string()))?;
    kv.put(key, &raw)
}

/// Id-keyed upsert: replace a matching record in place, append otherwise.
pub(crate) fn upsert<T>(items: &mut Vec<T>, entity: T, same_id: impl Fn(&T, &T) -> bool) {
    match items.iter().position(|existing| same_id(existing, &entity)) {
        Some(index) => items[index] = entity,
        None => items.push(entity),
    }
}
