use serde::Serialize;

use crate::board::{Board, Presence};
use crate::model::task::Task;
use crate::ops::view::BoardView;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub ticks: Vec<bool>,
    pub complete: bool,
}

#[derive(Serialize)]
pub struct GroupJson {
    pub category: String,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct BoardViewJson {
    pub board: String,
    pub key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub filter: String,
    pub in_progress: Vec<GroupJson>,
    pub completed: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct BoardInfoJson {
    pub name: String,
    pub key: String,
    pub title: String,
    pub ticks: usize,
    pub present: bool,
    pub read_only: bool,
    pub in_progress: usize,
    pub completed: usize,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        id: task.id.clone(),
        name: task.name.clone(),
        category: task.category.clone(),
        ticks: task.ticks.clone(),
        complete: task.is_complete(),
    }
}

pub fn view_to_json(board: &str, key: &str, filter: &str, view: &BoardView) -> BoardViewJson {
    BoardViewJson {
        board: board.to_string(),
        key: key.to_string(),
        filter: filter.to_string(),
        in_progress: view
            .groups
            .iter()
            .map(|(category, tasks)| GroupJson {
                category: category.clone(),
                tasks: tasks.iter().map(task_to_json).collect(),
            })
            .collect(),
        completed: view.completed.iter().map(task_to_json).collect(),
    }
}

pub fn board_info(board: &mut Board) -> BoardInfoJson {
    let present = board.presence() == Presence::Present;
    let name = board.settings().name.clone();
    let title = board.settings().title.clone();
    let ticks = board.settings().ticks;
    let read_only = board.settings().is_read_only();
    let key = board.key().to_string();
    let view = board.view();
    BoardInfoJson {
        name,
        key,
        title,
        ticks,
        present,
        read_only,
        in_progress: view.in_progress_count(),
        completed: view.completed.len(),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// Tick boxes for a task, e.g. `[x][ ][ ]`
pub fn format_ticks(ticks: &[bool]) -> String {
    ticks
        .iter()
        .map(|&done| if done { "[x]" } else { "[ ]" })
        .collect()
}

fn format_task_line(task: &Task, indent: &str) -> String {
    format!(
        "{}{} {}  ({})",
        indent,
        format_ticks(&task.ticks),
        task.name,
        task.id
    )
}

/// Plain text rendering of a derived view
pub fn format_view(title: &str, view: &BoardView) -> String {
    let mut lines = vec![title.to_string()];
    if view.is_empty() {
        lines.push("  No tasks".to_string());
        return lines.join("\n");
    }

    lines.push(format!("In Progress ({})", view.in_progress_count()));
    for (category, tasks) in &view.groups {
        lines.push(format!("  {}", category));
        for task in tasks {
            lines.push(format_task_line(task, "    "));
        }
    }

    if !view.completed.is_empty() {
        lines.push(format!("Completed ({})", view.completed.len()));
        for task in &view.completed {
            lines.push(format_task_line(task, "  "));
        }
    }
    lines.join("\n")
}

pub fn format_board_info(info: &BoardInfoJson) -> String {
    if info.present {
        let line = format!(
            "{}  {}  {} in progress, {} completed",
            info.key, info.title, info.in_progress, info.completed
        );
        if info.read_only { line + "  (read-only)" } else { line }
    } else {
        format!("{}  {}  (no store file)", info.key, info.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::view::{ViewOptions, derive_view};

    fn task(id: &str, name: &str, category: Option<&str>, ticks: &[bool]) -> Task {
        Task {
            id: id.into(),
            name: name.into(),
            category: category.map(str::to_string),
            ticks: ticks.to_vec(),
        }
    }

    #[test]
    fn text_view() {
        let tasks = vec![
            task("milk_1", "Milk", Some("Dairy"), &[false, true]),
            task("bread_2", "Bread", None, &[false, false]),
            task("eggs_3", "Eggs", Some("Dairy"), &[true, true]),
        ];
        let view = derive_view(&tasks, "", ViewOptions::default());
        insta::assert_snapshot!(format_view("Groceries", &view), @r"
        Groceries
        In Progress (2)
          Ungrouped
            [ ][ ] Bread  (bread_2)
          Dairy
            [ ][x] Milk  (milk_1)
        Completed (1)
          [x][x] Eggs  (eggs_3)
        ");
    }

    #[test]
    fn empty_view() {
        let view = derive_view(&[], "", ViewOptions::default());
        assert_eq!(format_view("Chores", &view), "Chores\n  No tasks");
    }

    #[test]
    fn json_view_shape() {
        let tasks = vec![task("a_1", "A", None, &[true])];
        let view = derive_view(&tasks, "", ViewOptions::default());
        let json = serde_json::to_value(view_to_json("Home", "home", "", &view)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "board": "Home",
                "key": "home",
                "in_progress": [],
                "completed": [
                    {"id": "a_1", "name": "A", "ticks": [true], "complete": true}
                ]
            })
        );
    }
}
