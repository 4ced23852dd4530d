//! Data core for a speech-language pathology tracking app: clients, therapy
//! goals, session/trial recording, derived progress statistics, and
//! whole-store backup.
//!
//! Presentation layers sit on top of [`AppContext`], which mirrors the four
//! persisted collections in memory and serializes every mutation through the
//! record store's worker thread. The storage substrate is a key-value medium
//! holding one JSON document per collection; [`db::SqliteKv`] is the shipped
//! implementation and [`db::MemoryKv`] backs tests and previews.

pub mod db;
pub mod models;
pub mod state;
pub mod stats;
pub mod utils;

pub use db::{Database, StoreError};
pub use state::{AppContext, SessionRecorder};
