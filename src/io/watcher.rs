use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::model::board::BoardKey;

/// Events sent from the store watcher to the TUI event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Entity files for these boards were created, modified or removed.
    Changed(Vec<BoardKey>),
}

/// Watches a store directory for entity file changes.
pub struct StoreWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<StoreEvent>,
}

/// Map a changed path to the board it belongs to. Dot-files (the lock,
/// UI state, log) and anything that is not `*.json` are ignored.
pub fn board_key_for(store_dir: &Path, path: &Path) -> Option<BoardKey> {
    if path.parent() != Some(store_dir) {
        return None;
    }
    let name = path.file_name()?.to_str()?;
    if name.starts_with('.') {
        return None;
    }
    let stem = name.strip_suffix(".json")?;
    if stem.is_empty() {
        return None;
    }
    Some(BoardKey::from_stem(stem))
}

impl StoreWatcher {
    /// Start watching `store_dir` (not recursive).
    /// `poll()` should be called each tick.
    pub fn start(store_dir: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let dir: PathBuf = store_dir
            .canonicalize()
            .unwrap_or_else(|_| store_dir.to_path_buf());
        let dir_owned = dir.clone();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(e) => {
                        tracing::warn!(error = %e, "store watcher error");
                        return;
                    }
                };

                match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
                    _ => return,
                }

                let mut keys: Vec<BoardKey> = Vec::new();
                for path in &event.paths {
                    if let Some(key) = board_key_for(&dir_owned, path)
                        && !keys.contains(&key)
                    {
                        keys.push(key);
                    }
                }

                if !keys.is_empty() {
                    let _ = tx.send(StoreEvent::Changed(keys));
                }
            },
            Config::default(),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::debug!(dir = %dir.display(), "watching store");
        Ok(StoreWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Non-blocking poll. Returns the distinct boards touched since the
    /// last call (may be empty).
    pub fn poll(&self) -> Vec<BoardKey> {
        let mut keys: Vec<BoardKey> = Vec::new();
        while let Ok(StoreEvent::Changed(changed)) = self.rx.try_recv() {
            for key in changed {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        keys
    }
}
