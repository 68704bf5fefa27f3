use serde::{Deserialize, Serialize};

/// Bucket name for tasks without a category
pub const UNGROUPED: &str = "Ungrouped";

/// A checklist item in its canonical shape
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    /// Stable identifier, unique within a board
    pub id: String,
    /// Display name (never empty)
    pub name: String,
    /// Free-text grouping key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// One flag per tick, always exactly the board's tick count long
    pub ticks: Vec<bool>,
}

impl Task {
    /// Create a task with every tick cleared
    pub fn new(id: String, name: String, category: Option<String>, tick_count: usize) -> Self {
        Task {
            id,
            name,
            category,
            ticks: vec![false; tick_count],
        }
    }

    /// A task is complete when every tick is set
    pub fn is_complete(&self) -> bool {
        self.ticks.iter().all(|t| *t)
    }

    /// Category bucket this task is listed under while incomplete
    pub fn group(&self) -> &str {
        self.category.as_deref().unwrap_or(UNGROUPED)
    }

    /// Number of ticks set
    pub fn done_count(&self) -> usize {
        self.ticks.iter().filter(|t| **t).count()
    }
}

/// A task record as delivered by the host, before normalization.
///
/// Every field is optional; the dashboard variants also used `type` for the
/// category and `checks` for the tick flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTask {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "type")]
    pub category: Option<String>,
    #[serde(default, alias = "checks")]
    pub ticks: Vec<bool>,
}

impl From<&Task> for RawTask {
    fn from(task: &Task) -> Self {
        RawTask {
            id: Some(task.id.clone()),
            name: Some(task.name.clone()),
            category: task.category.clone(),
            ticks: task.ticks.clone(),
        }
    }
}

/// One delivery of a board's entity state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub tasks: Vec<RawTask>,
}

impl Snapshot {
    pub fn new(tasks: Vec<RawTask>) -> Self {
        Snapshot { tasks }
    }

    /// Build a snapshot that carries an already-canonical list
    pub fn from_tasks(tasks: &[Task]) -> Self {
        Snapshot {
            tasks: tasks.iter().map(RawTask::from).collect(),
        }
    }
}
