use crate::model::task::Task;

/// Error type for task list edits
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task name cannot be empty")]
    EmptyName,
    #[error("a task named \"{0}\" already exists")]
    DuplicateName(String),
    #[error("tick {index} is out of range (task has {ticks})")]
    TickOutOfRange { index: usize, ticks: usize },
}

/// Find a task by id
pub fn find_task<'a>(tasks: &'a [Task], id: &str) -> Option<&'a Task> {
    tasks.iter().find(|t| t.id == id)
}

/// Whether a name is already taken, ignoring case
pub fn name_taken(tasks: &[Task], name: &str) -> bool {
    let lower = name.to_lowercase();
    tasks.iter().any(|t| t.name.to_lowercase() == lower)
}

/// Check a candidate name and return it trimmed
pub fn validate_new_name(tasks: &[Task], name: &str) -> Result<String, TaskError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TaskError::EmptyName);
    }
    if name_taken(tasks, name) {
        return Err(TaskError::DuplicateName(name.to_string()));
    }
    Ok(name.to_string())
}

/// Flip one tick. Returns `Ok(false)` when the task is gone.
pub fn toggle_tick(tasks: &mut [Task], id: &str, index: usize) -> Result<bool, TaskError> {
    let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
        return Ok(false);
    };
    let ticks = task.ticks.len();
    let flag = task
        .ticks
        .get_mut(index)
        .ok_or(TaskError::TickOutOfRange { index, ticks })?;
    *flag = !*flag;
    Ok(true)
}

/// Remove a task. Returns `false` when no task has this id.
pub fn delete_task(tasks: &mut Vec<Task>, id: &str) -> bool {
    let before = tasks.len();
    tasks.retain(|t| t.id != id);
    tasks.len() != before
}
