use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::io::lock::{LockError, StoreLock};
use crate::io::snapshot_io::{SnapshotError, write_snapshot};
use crate::model::task::Task;

/// Why the last write of a publisher did not land
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error(transparent)]
    Write(#[from] SnapshotError),
    #[error("publisher worker panicked")]
    WorkerPanicked,
}

/// Outbound half of the sync loop.
///
/// Fire-and-forget: nothing comes back from `publish`. Whether the write
/// landed is only visible through the next snapshot, or through `finish`
/// for callers that have no next snapshot to wait for.
pub trait Publisher {
    fn publish(&mut self, tasks: &[Task]);

    /// Wait for queued writes and report how the last one went. Nothing
    /// is written after this returns.
    fn finish(&mut self) -> Result<(), PublishError> {
        Ok(())
    }
}

/// Writes published lists to a board's entity file on a worker thread
pub struct FilePublisher {
    tx: Option<Sender<Vec<Task>>>,
    worker: Option<JoinHandle<Result<(), PublishError>>>,
}

impl FilePublisher {
    /// Start a worker writing to `path`, locking `store_dir` around each write
    pub fn spawn(store_dir: PathBuf, path: PathBuf) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("tickboard-publish".into())
            .spawn(move || run_worker(&store_dir, &path, rx))?;
        Ok(FilePublisher {
            tx: Some(tx),
            worker: Some(worker),
        })
    }
}

impl Publisher for FilePublisher {
    fn publish(&mut self, tasks: &[Task]) {
        if let Some(tx) = &self.tx
            && tx.send(tasks.to_vec()).is_err()
        {
            tracing::warn!("publisher worker is gone, dropping update");
        }
    }

    fn finish(&mut self) -> Result<(), PublishError> {
        // Closing the channel lets the worker drain and exit
        self.tx.take();
        match self.worker.take() {
            Some(worker) => worker.join().map_err(|_| PublishError::WorkerPanicked)?,
            None => Ok(()),
        }
    }
}

impl Drop for FilePublisher {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            tracing::warn!(error = %e, "last publish did not land");
        }
    }
}

/// Write queued lists until the channel closes. Returns the outcome of the
/// last write; failures are logged as they happen and never retried.
fn run_worker(store_dir: &Path, path: &Path, rx: Receiver<Vec<Task>>) -> Result<(), PublishError> {
    let mut last = Ok(());
    while let Ok(mut tasks) = rx.recv() {
        // Only the newest queued list matters
        while let Ok(newer) = rx.try_recv() {
            tasks = newer;
        }

        last = write_locked(store_dir, path, &tasks);
        match &last {
            Ok(()) => tracing::debug!(path = %path.display(), tasks = tasks.len(), "published"),
            Err(e) => tracing::warn!(error = %e, "publish failed"),
        }
    }
    last
}

fn write_locked(store_dir: &Path, path: &Path, tasks: &[Task]) -> Result<(), PublishError> {
    let _lock = StoreLock::acquire_default(store_dir)?;
    write_snapshot(path, tasks)?;
    Ok(())
}

/// Records every published list. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct MemoryPublisher {
    log: Rc<RefCell<Vec<Vec<Task>>>>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<Vec<Task>> {
        self.log.borrow().clone()
    }

    pub fn last(&self) -> Option<Vec<Task>> {
        self.log.borrow().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.log.borrow().len()
    }
}

impl Publisher for MemoryPublisher {
    fn publish(&mut self, tasks: &[Task]) {
        self.log.borrow_mut().push(tasks.to_vec());
    }
}
