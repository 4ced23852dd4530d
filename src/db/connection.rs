use std::{
    path::PathBuf,
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{Context, Result};
use log::{error, info};
use tokio::sync::oneshot;

use crate::db::error::StoreError;
use crate::db::kv::{KeyValueStore, SqliteKv};

/// Fixed keys addressing the four collection documents.
pub(crate) mod keys {
    pub const CLIENTS: &str = "clients";
    pub const GOALS: &str = "goals";
    pub const SESSIONS: &str = "sessions";
    pub const SETTINGS: &str = "settings";

    pub const ALL: [&str; 4] = [CLIENTS, GOALS, SESSIONS, SETTINGS];
}

type StoreTask = Box<dyn FnOnce(&mut dyn KeyValueStore) + Send + 'static>;

enum StoreCommand {
    Execute(StoreTask),
    Shutdown,
}

struct DatabaseInner {
    sender: mpsc::Sender<StoreCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(StoreCommand::Shutdown) {
                error!("Failed to send shutdown to store thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join store thread: {join_err:?}");
            }
        }
    }
}

/// Handle to the record store. All operations run on a dedicated worker
/// thread that owns the key-value medium, so every read-modify-write cycle is
/// serialized even when multiple clones of this handle are held.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    /// Open (or create) the SQLite-backed store at `db_path`.
    pub fn open(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create store directory {}", parent.display())
            })?;
        }

        let (command_tx, command_rx) = mpsc::channel::<StoreCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path_for_thread = db_path.clone();

        let worker = thread::Builder::new()
            .name("slptrack-store".into())
            .spawn(move || {
                let mut medium = match SqliteKv::open(&path_for_thread) {
                    Ok(medium) => medium,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };

                if ready_tx.send(Ok(())).is_err() {
                    error!("Store initialization receiver dropped before ready signal");
                    return;
                }

                run_loop(&mut medium, &command_rx);
            })
            .with_context(|| "failed to spawn store worker thread")?;

        ready_rx
            .recv()
            .context("store worker exited before signaling readiness")??;

        info!("Record store opened at {}", db_path.display());

        Ok(Self::from_parts(command_tx, worker))
    }

    /// Run the store over an already-constructed medium. Used with
    /// [`MemoryKv`](crate::db::MemoryKv) in tests and previews.
    pub fn with_medium<K>(medium: K) -> Result<Self>
    where
        K: KeyValueStore + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel::<StoreCommand>();
        let mut medium: Box<dyn KeyValueStore> = Box::new(medium);

        let worker = thread::Builder::new()
            .name("slptrack-store".into())
            .spawn(move || run_loop(medium.as_mut(), &command_rx))
            .with_context(|| "failed to spawn store worker thread")?;

        Ok(Self::from_parts(command_tx, worker))
    }

    fn from_parts(sender: mpsc::Sender<StoreCommand>, worker: JoinHandle<()>) -> Self {
        Self {
            inner: Arc::new(DatabaseInner {
                sender,
                worker: Mutex::new(Some(worker)),
            }),
        }
    }

    /// Run `task` on the store worker and await its result. Once enqueued a
    /// task runs to completion or failure; there is no cancellation.
    pub(crate) async fn execute<F, T>(&self, task: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut dyn KeyValueStore) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.inner.sender.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = StoreCommand::Execute(Box::new(move |medium| {
            let result = task(medium);
            if reply_tx.send(result).is_err() {
                error!("Store caller dropped before receiving result");
            }
        }));

        sender.send(command).map_err(|_| StoreError::WorkerGone)?;

        reply_rx.await.map_err(|_| StoreError::WorkerGone)?
    }
}

fn run_loop(medium: &mut dyn KeyValueStore, command_rx: &mpsc::Receiver<StoreCommand>) {
    while let Ok(command) = command_rx.recv() {
        match command {
            StoreCommand::Execute(task) => {
                task(medium);
            }
            StoreCommand::Shutdown => break,
        }
    }

    info!("Store thread shutting down");
}
