//! One checklist board: the reconciliation core plus its command handlers.
//!
//! A `Board` never owns the source of truth. It displays whatever the
//! reconciler decides (the latest host snapshot, or a local edit the host has
//! not echoed back yet), and pushes whole lists out through a `Publisher`.

pub mod debounce;
pub mod reconcile;

use std::time::Instant;

use crate::io::publisher::{PublishError, Publisher};
use crate::io::state::{UiState, UiStore};
use crate::model::board::{BoardKey, Section};
use crate::model::config::{BoardConfig, SyncConfig};
use crate::model::task::{RawTask, Snapshot, Task};
use crate::ops::normalize::{IdMinter, normalize};
use crate::ops::task_ops::{self, TaskError};
use crate::ops::view::{BoardView, ViewOptions, derive_view};

pub use debounce::Debouncer;
pub use reconcile::{Fingerprint, Reconciled, Reconciler, SyncState};

/// Error type for board configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("board #{index} has no name; every board needs a `name`")]
    MissingBoardName { index: usize },
    #[error("board \"{board}\": ticks must be at least 1")]
    InvalidTickCount { board: String },
    #[error("board \"{board}\": columns must be at least 1")]
    InvalidColumns { board: String },
}

/// Error type for board commands
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("board \"{0}\" has no entity in the store; changes are disabled")]
    Unavailable(BoardKey),
    #[error("board \"{0}\" lists its tasks in the config and is read-only")]
    ReadOnly(BoardKey),
    #[error(transparent)]
    Task(#[from] TaskError),
}

/// Whether a snapshot changed what should be on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    Redraw,
    Skip,
}

/// Validated per-board settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSettings {
    pub name: String,
    pub title: String,
    pub ticks: usize,
    pub columns: usize,
    pub categories: bool,
    pub search_categories: bool,
    /// Inline task list from the config, in place of the store
    pub inline: Option<Vec<RawTask>>,
}

impl BoardSettings {
    /// Check a `[[boards]]` entry. `index` is only used in messages.
    pub fn from_config(config: &BoardConfig, index: usize) -> Result<Self, ConfigError> {
        let name = config
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(ConfigError::MissingBoardName { index: index + 1 })?
            .to_string();
        if config.ticks == 0 {
            return Err(ConfigError::InvalidTickCount { board: name });
        }
        if config.columns == 0 {
            return Err(ConfigError::InvalidColumns { board: name });
        }
        Ok(BoardSettings {
            title: config.title.clone().unwrap_or_else(|| name.clone()),
            name,
            ticks: config.ticks,
            columns: config.columns,
            categories: config.categories,
            search_categories: config.search_categories,
            inline: config.tasks.clone(),
        })
    }

    pub fn is_read_only(&self) -> bool {
        self.inline.is_some()
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            match_category: self.search_categories,
        }
    }
}

/// Entity presence as last reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// No snapshot delivered yet
    Unknown,
    Present,
    Missing,
}

pub struct Board {
    settings: BoardSettings,
    key: BoardKey,
    ids: IdMinter,
    reconciler: Reconciler,
    presence: Presence,
    ui: UiState,
    store: Box<dyn UiStore>,
    publisher: Box<dyn Publisher>,
    filter_debounce: Debouncer,
    /// Filter text the view is currently derived with
    applied_filter: String,
    /// Derived view, dropped whenever its inputs change
    view: Option<BoardView>,
}

impl Board {
    /// Build a board and restore its UI state
    pub fn new(
        config: &BoardConfig,
        index: usize,
        sync: &SyncConfig,
        store: Box<dyn UiStore>,
        publisher: Box<dyn Publisher>,
    ) -> Result<Self, ConfigError> {
        let settings = BoardSettings::from_config(config, index)?;
        Ok(Self::with_settings(settings, sync, store, publisher))
    }

    pub fn with_settings(
        settings: BoardSettings,
        sync: &SyncConfig,
        store: Box<dyn UiStore>,
        publisher: Box<dyn Publisher>,
    ) -> Self {
        let key = BoardKey::from_name(&settings.name);
        let ui = store.load(&key);
        tracing::debug!(board = %key, "board activated");
        Board {
            applied_filter: ui.filter.clone(),
            settings,
            key,
            ids: IdMinter::default(),
            reconciler: Reconciler::new(sync.confirm_timeout()),
            presence: Presence::Unknown,
            ui,
            store,
            publisher,
            filter_debounce: Debouncer::new(sync.filter_debounce()),
            view: None,
        }
    }

    /// Swap the id source (tests pin the clock)
    pub fn set_id_minter(&mut self, ids: IdMinter) {
        self.ids = ids;
    }

    pub fn key(&self) -> &BoardKey {
        &self.key
    }

    pub fn settings(&self) -> &BoardSettings {
        &self.settings
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn presence(&self) -> Presence {
        self.presence
    }

    pub fn is_available(&self) -> bool {
        self.presence == Presence::Present
    }

    pub fn is_pending(&self) -> bool {
        self.reconciler.is_pending()
    }

    /// The list currently on screen
    pub fn tasks(&self) -> &[Task] {
        self.reconciler.displayed()
    }

    pub fn applied_filter(&self) -> &str {
        &self.applied_filter
    }

    // -----------------------------------------------------------------------
    // Inbound
    // -----------------------------------------------------------------------

    /// Take a host snapshot. `None` means the entity does not exist.
    pub fn receive(&mut self, snapshot: Option<Snapshot>, now: Instant) -> Refresh {
        let Some(snapshot) = snapshot else {
            if self.presence == Presence::Missing {
                return Refresh::Skip;
            }
            tracing::warn!(board = %self.key, "board entity not found");
            self.presence = Presence::Missing;
            self.reconciler.reset();
            self.view = None;
            return Refresh::Redraw;
        };

        let appeared = self.presence != Presence::Present;
        self.presence = Presence::Present;

        let tasks = normalize(&snapshot.tasks, self.settings.ticks, &mut self.ids);
        let count = tasks.len();
        let outcome = self.reconciler.receive(tasks, now);
        match outcome {
            Reconciled::Superseded => tracing::warn!(
                board = %self.key,
                "pending edit was not confirmed in time; showing host state"
            ),
            _ => tracing::debug!(
                board = %self.key,
                outcome = outcome.as_str(),
                tasks = count,
                "snapshot reconciled"
            ),
        }

        if outcome.needs_render() || appeared {
            self.view = None;
            Refresh::Redraw
        } else {
            Refresh::Skip
        }
    }

    // -----------------------------------------------------------------------
    // Task commands
    // -----------------------------------------------------------------------

    /// Flip one tick. `Ok(false)` when the task no longer exists.
    pub fn toggle_tick(&mut self, id: &str, index: usize, now: Instant) -> Result<bool, BoardError> {
        self.require_entity()?;
        let mut tasks = self.tasks().to_vec();
        if !task_ops::toggle_tick(&mut tasks, id, index)? {
            return Ok(false);
        }
        self.commit(tasks, now);
        Ok(true)
    }

    /// Add a task from a name and optional category; returns the new id.
    ///
    /// Empty names and case-insensitive duplicates are rejected with the
    /// list left untouched.
    pub fn add_task(
        &mut self,
        name: &str,
        category: Option<&str>,
        now: Instant,
    ) -> Result<String, BoardError> {
        self.require_entity()?;
        let mut tasks = self.tasks().to_vec();
        let name = task_ops::validate_new_name(&tasks, name)?;
        let category = if self.settings.categories {
            category
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
        } else {
            None
        };

        let id = self.ids.fresh(&name);
        tasks.push(Task::new(id.clone(), name, category, self.settings.ticks));
        self.commit(tasks, now);

        if !self.ui.draft_name.is_empty() || !self.ui.draft_category.is_empty() {
            self.ui.draft_name.clear();
            self.ui.draft_category.clear();
            self.persist_ui();
        }
        Ok(id)
    }

    /// Remove a task. `Ok(false)` when no task has this id.
    pub fn delete_task(&mut self, id: &str, now: Instant) -> Result<bool, BoardError> {
        self.require_entity()?;
        let mut tasks = self.tasks().to_vec();
        if !task_ops::delete_task(&mut tasks, id) {
            return Ok(false);
        }
        self.commit(tasks, now);
        Ok(true)
    }

    /// Wait until every published list has been written and report the
    /// outcome of the last write. For one-shot callers that exit right after
    /// a command and so never see the next snapshot.
    pub fn finish(&mut self) -> Result<(), PublishError> {
        self.publisher.finish()
    }

    fn require_entity(&self) -> Result<(), BoardError> {
        if self.settings.is_read_only() {
            Err(BoardError::ReadOnly(self.key.clone()))
        } else if self.is_available() {
            Ok(())
        } else {
            Err(BoardError::Unavailable(self.key.clone()))
        }
    }

    /// Show the new list, then hand it to the publisher
    fn commit(&mut self, tasks: Vec<Task>, now: Instant) {
        let fingerprint = self.reconciler.apply_local(tasks, now);
        self.view = None;
        tracing::info!(board = %self.key, %fingerprint, "publishing local edit");
        self.publisher.publish(self.reconciler.displayed());
    }

    // -----------------------------------------------------------------------
    // UI state commands
    // -----------------------------------------------------------------------

    pub fn toggle_group(&mut self, category: &str) {
        self.ui.toggle_group(category);
        self.persist_ui();
    }

    pub fn toggle_section(&mut self, section: Section) {
        self.ui.toggle_section(section);
        self.persist_ui();
    }

    /// Record filter text; the view picks it up when the debounce fires
    pub fn set_filter(&mut self, text: &str, now: Instant) {
        if self.ui.filter == text {
            return;
        }
        self.ui.filter = text.to_string();
        self.persist_ui();
        self.filter_debounce.schedule(now);
    }

    /// Apply the typed filter right away
    pub fn commit_filter(&mut self) -> Refresh {
        self.filter_debounce.cancel();
        self.apply_filter()
    }

    /// Advance timers. Returns `Redraw` when the debounced filter landed.
    pub fn poll(&mut self, now: Instant) -> Refresh {
        if self.filter_debounce.fire_due(now) {
            self.apply_filter()
        } else {
            Refresh::Skip
        }
    }

    /// Time until `poll` has work to do
    pub fn next_deadline(&self, now: Instant) -> Option<std::time::Duration> {
        self.filter_debounce.time_until(now)
    }

    fn apply_filter(&mut self) -> Refresh {
        if self.applied_filter == self.ui.filter {
            return Refresh::Skip;
        }
        self.applied_filter = self.ui.filter.clone();
        self.view = None;
        Refresh::Redraw
    }

    pub fn set_draft(&mut self, name: &str, category: &str) {
        if self.ui.draft_name == name && self.ui.draft_category == category {
            return;
        }
        self.ui.draft_name = name.to_string();
        self.ui.draft_category = category.to_string();
        self.persist_ui();
    }

    fn persist_ui(&mut self) {
        if let Err(e) = self.store.save(&self.key, &self.ui) {
            tracing::warn!(board = %self.key, error = %e, "could not save UI state");
        }
    }

    // -----------------------------------------------------------------------
    // View
    // -----------------------------------------------------------------------

    /// The derived view of the displayed list
    pub fn view(&mut self) -> &BoardView {
        if self.view.is_none() {
            self.view = Some(derive_view(
                self.reconciler.displayed(),
                &self.applied_filter,
                self.settings.view_options(),
            ));
        }
        self.view.get_or_insert_with(BoardView::default)
    }
}
