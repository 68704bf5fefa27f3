use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::io::snapshot_io::atomic_write;
use crate::model::board::{BoardKey, Section};

/// Name of the UI state file inside the store directory
pub const STATE_FILE: &str = ".state.json";

/// Per-board UI state, persisted between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    /// Expanded flag per category; a missing key means expanded
    #[serde(default)]
    pub groups: BTreeMap<String, bool>,
    /// Completed section open
    #[serde(default = "default_true")]
    pub completed: bool,
    /// In Progress section open
    #[serde(default = "default_true")]
    pub inprogress: bool,
    /// Filter text as typed
    #[serde(default)]
    pub filter: String,
    /// Uncommitted new-task name
    #[serde(default)]
    pub draft_name: String,
    /// Uncommitted new-task category
    #[serde(default)]
    pub draft_category: String,
}

impl Default for UiState {
    fn default() -> Self {
        UiState {
            groups: BTreeMap::new(),
            completed: true,
            inprogress: true,
            filter: String::new(),
            draft_name: String::new(),
            draft_category: String::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

impl UiState {
    pub fn group_expanded(&self, category: &str) -> bool {
        self.groups.get(category).copied().unwrap_or(true)
    }

    pub fn toggle_group(&mut self, category: &str) {
        let expanded = self.group_expanded(category);
        self.groups.insert(category.to_string(), !expanded);
    }

    pub fn section_open(&self, section: Section) -> bool {
        match section {
            Section::InProgress => self.inprogress,
            Section::Completed => self.completed,
        }
    }

    pub fn toggle_section(&mut self, section: Section) {
        match section {
            Section::InProgress => self.inprogress = !self.inprogress,
            Section::Completed => self.completed = !self.completed,
        }
    }
}

/// Error type for UI state persistence
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize UI state: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Keyed storage for per-board UI state
pub trait UiStore {
    /// Best effort: anything unreadable comes back as the default state
    fn load(&self, key: &BoardKey) -> UiState;
    fn save(&mut self, key: &BoardKey, state: &UiState) -> Result<(), StateError>;
}

/// On-disk layout of the state file
#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    boards: BTreeMap<String, serde_json::Value>,
}

/// UI state kept in `.state.json`, one entry per board key
#[derive(Debug, Clone)]
pub struct FileUiStore {
    path: PathBuf,
}

impl FileUiStore {
    pub fn new(store_dir: &Path) -> Self {
        FileUiStore {
            path: store_dir.join(STATE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> StateFile {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }
}

impl UiStore for FileUiStore {
    fn load(&self, key: &BoardKey) -> UiState {
        self.read_file()
            .boards
            .remove(key.as_str())
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    fn save(&mut self, key: &BoardKey, state: &UiState) -> Result<(), StateError> {
        let mut file = self.read_file();
        file.boards
            .insert(key.as_str().to_string(), serde_json::to_value(state)?);
        let content = serde_json::to_string_pretty(&file)?;
        atomic_write(&self.path, content.as_bytes()).map_err(|e| StateError::WriteError {
            path: self.path.clone(),
            source: e,
        })
    }
}

/// In-memory UI state. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryUiStore {
    states: Rc<RefCell<HashMap<BoardKey, UiState>>>,
}

impl MemoryUiStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UiStore for MemoryUiStore {
    fn load(&self, key: &BoardKey) -> UiState {
        self.states.borrow().get(key).cloned().unwrap_or_default()
    }

    fn save(&mut self, key: &BoardKey, state: &UiState) -> Result<(), StateError> {
        self.states.borrow_mut().insert(key.clone(), state.clone());
        Ok(())
    }
}
