use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use crate::model::task::Task;

/// Order-sensitive structural summary of a task list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub fn of(tasks: &[Task]) -> Self {
        let mut hasher = DefaultHasher::new();
        tasks.hash(&mut hasher);
        Fingerprint(hasher.finish())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// A list this component produced and published, not yet echoed back
#[derive(Debug, Clone)]
pub struct PendingEdit {
    pub tasks: Vec<Task>,
    pub fingerprint: Fingerprint,
    pub issued_at: Instant,
}

#[derive(Debug, Clone)]
pub enum SyncState {
    Idle,
    Pending(PendingEdit),
}

/// What an incoming snapshot did to the displayed list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// The snapshot is now displayed
    Applied,
    /// Same content as already displayed
    Unchanged,
    /// The host caught up with the pending edit
    Confirmed,
    /// The snapshot predates the pending edit; the edit stays displayed
    Held,
    /// The pending edit outlived the confirm timeout and the snapshot replaced it
    Superseded,
}

impl Reconciled {
    /// Whether the displayed list changed
    pub fn needs_render(self) -> bool {
        matches!(self, Reconciled::Applied | Reconciled::Superseded)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Reconciled::Applied => "applied",
            Reconciled::Unchanged => "unchanged",
            Reconciled::Confirmed => "confirmed",
            Reconciled::Held => "held",
            Reconciled::Superseded => "superseded",
        }
    }
}

/// Decides which list is displayed while local edits are in flight.
///
/// Only one pending slot exists: a second local edit replaces the first, and
/// only the newest fingerprint counts as confirmation.
#[derive(Debug)]
pub struct Reconciler {
    state: SyncState,
    /// Latest list delivered by the host
    external: Vec<Task>,
    /// Fingerprint of whatever was last put on screen, by either path
    rendered: Option<Fingerprint>,
    confirm_timeout: Duration,
}

impl Reconciler {
    pub fn new(confirm_timeout: Duration) -> Self {
        Reconciler {
            state: SyncState::Idle,
            external: Vec::new(),
            rendered: None,
            confirm_timeout,
        }
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, SyncState::Pending(_))
    }

    pub fn rendered(&self) -> Option<Fingerprint> {
        self.rendered
    }

    /// The list to show right now
    pub fn displayed(&self) -> &[Task] {
        match &self.state {
            SyncState::Pending(edit) => &edit.tasks,
            SyncState::Idle => &self.external,
        }
    }

    /// Record a list produced by a local command. It is displayed at once.
    pub fn apply_local(&mut self, tasks: Vec<Task>, now: Instant) -> Fingerprint {
        let fingerprint = Fingerprint::of(&tasks);
        self.rendered = Some(fingerprint);
        self.state = SyncState::Pending(PendingEdit {
            tasks,
            fingerprint,
            issued_at: now,
        });
        fingerprint
    }

    /// Take a normalized snapshot from the host
    pub fn receive(&mut self, tasks: Vec<Task>, now: Instant) -> Reconciled {
        let fingerprint = Fingerprint::of(&tasks);
        self.external = tasks;

        let outcome = match &self.state {
            SyncState::Pending(edit) if edit.fingerprint == fingerprint => Reconciled::Confirmed,
            SyncState::Pending(edit)
                if now.saturating_duration_since(edit.issued_at) < self.confirm_timeout =>
            {
                return Reconciled::Held;
            }
            SyncState::Pending(_) => Reconciled::Superseded,
            SyncState::Idle if self.rendered == Some(fingerprint) => Reconciled::Unchanged,
            SyncState::Idle => Reconciled::Applied,
        };

        self.state = SyncState::Idle;
        self.rendered = Some(fingerprint);
        outcome
    }

    /// Forget all state, e.g. when the entity disappears
    pub fn reset(&mut self) {
        self.state = SyncState::Idle;
        self.external.clear();
        self.rendered = None;
    }
}
