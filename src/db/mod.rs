mod connection;
mod error;
pub(crate) mod helpers;
mod kv;
mod repositories;

pub use connection::Database;
pub use error::StoreError;
pub use kv::{KeyValueStore, MemoryKv, SqliteKv};
pub use repositories::backup::BackupDocument;
