use thiserror::Error;

/// Failures surfaced by the record store.
///
/// Read failures never reach callers of the collection getters: a missing or
/// unparseable document is served as an empty collection. The variant exists
/// for the key-value medium to report through.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read persisted data: {0}")]
    Read(String),

    #[error("failed to write persisted data: {0}")]
    Write(String),

    #[error("backup document is not valid JSON: {0}")]
    ImportFormat(String),

    #[error("store worker terminated unexpectedly")]
    WorkerGone,
}
