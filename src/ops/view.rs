use indexmap::IndexMap;

use crate::model::task::Task;

/// Knobs that change which tasks a filter matches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewOptions {
    /// Also match the filter against the category
    pub match_category: bool,
}

/// The derived, render-ready arrangement of a board's tasks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardView {
    /// Incomplete tasks by category, in first-appearance order of the sorted list
    pub groups: IndexMap<String, Vec<Task>>,
    /// Complete tasks, not sub-grouped
    pub completed: Vec<Task>,
}

impl BoardView {
    pub fn in_progress_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn len(&self) -> usize {
        self.in_progress_count() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every task in display order: groups first, then completed
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.groups.values().flatten().chain(self.completed.iter())
    }
}

/// Case-insensitive substring match on the name, and on the category when enabled
pub fn matches_filter(task: &Task, needle_lower: &str, options: ViewOptions) -> bool {
    if needle_lower.is_empty() {
        return true;
    }
    if task.name.to_lowercase().contains(needle_lower) {
        return true;
    }
    options.match_category
        && task
            .category
            .as_deref()
            .is_some_and(|c| c.to_lowercase().contains(needle_lower))
}

/// Base-strength collation key: accents and case are ignored, so "Éclair"
/// sorts with "eclair" rather than after every ASCII name.
pub fn collation_key(name: &str) -> String {
    deunicode::deunicode(name).to_lowercase()
}


/// Filter, split, group and sort a task list.
///
/// Pure: the same input always yields the same view.
pub fn derive_view(tasks: &[Task], filter: &str, options: ViewOptions) -> BoardView {
    let needle = filter.to_lowercase();

    let mut visible: Vec<&Task> = tasks
        .iter()
        .filter(|t| matches_filter(t, &needle, options))
        .collect();
    // Stable: equal keys keep their input order
    visible.sort_by_cached_key(|t| collation_key(&t.name));

    let mut view = BoardView::default();
    for task in visible {
        if task.is_complete() {
            view.completed.push(task.clone());
        } else {
            view.groups
                .entry(task.group().to_string())
                .or_default()
                .push(task.clone());
        }
    }
    view
}
