use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::model::task::RawTask;

/// Configuration from tickboard.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub boards: Vec<BoardConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding one `<key>.json` entity file per board,
    /// relative to the config file
    #[serde(default = "default_store_dir")]
    pub dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            dir: default_store_dir(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SyncConfig {
    /// How long a local edit may wait for the host to echo it back before a
    /// different snapshot is allowed to replace it
    #[serde(default = "default_confirm_timeout_ms")]
    pub confirm_timeout_ms: u64,
    /// Trailing-edge delay before filter text is applied to the view
    #[serde(default = "default_filter_debounce_ms")]
    pub filter_debounce_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            confirm_timeout_ms: default_confirm_timeout_ms(),
            filter_debounce_ms: default_filter_debounce_ms(),
        }
    }
}

impl SyncConfig {
    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_millis(self.confirm_timeout_ms)
    }

    pub fn filter_debounce(&self) -> Duration {
        Duration::from_millis(self.filter_debounce_ms)
    }
}

/// One `[[boards]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Required; a board without a name refuses to build
    #[serde(default)]
    pub name: Option<String>,
    /// Header text (defaults to the name)
    #[serde(default)]
    pub title: Option<String>,
    /// Ticks per task
    #[serde(default = "default_ticks")]
    pub ticks: usize,
    /// Columns for the grouped in-progress layout
    #[serde(default = "default_columns")]
    pub columns: usize,
    /// Whether new tasks may carry a category
    #[serde(default)]
    pub categories: bool,
    /// Whether the keyword filter also matches the category
    #[serde(default)]
    pub search_categories: bool,
    /// Fixed task list written in the config. A board with one never reads
    /// or writes the store and refuses task edits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<RawTask>>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            name: None,
            title: None,
            ticks: default_ticks(),
            columns: default_columns(),
            categories: false,
            search_categories: false,
            tasks: None,
        }
    }
}

impl BoardConfig {
    /// Convenience for tests and `tb init`
    pub fn named(name: &str) -> Self {
        BoardConfig {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    /// Label for tabs and error messages, even when the name is missing
    pub fn label(&self, index: usize) -> String {
        self.title
            .clone()
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| format!("board #{}", index + 1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiConfig {
    /// Hex color overrides keyed by theme slot (e.g. `highlight = "#FB4196"`)
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

fn default_store_dir() -> String {
    "boards".to_string()
}

fn default_confirm_timeout_ms() -> u64 {
    5000
}

fn default_filter_debounce_ms() -> u64 {
    250
}

fn default_ticks() -> usize {
    1
}

fn default_columns() -> usize {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_on_minimal_board() {
        let config: AppConfig = toml::from_str("[[boards]]\nname = \"Home\"\n").unwrap();
        assert_eq!(config.store.dir, "boards");
        assert_eq!(config.sync.confirm_timeout_ms, 5000);
        assert_eq!(config.sync.filter_debounce_ms, 250);
        let board = &config.boards[0];
        assert_eq!(board.name.as_deref(), Some("Home"));
        assert_eq!(board.ticks, 1);
        assert_eq!(board.columns, 1);
        assert!(!board.categories);
        assert!(!board.search_categories);
    }

    #[test]
    fn missing_name_still_parses() {
        let config: AppConfig = toml::from_str("[[boards]]\nticks = 5\n").unwrap();
        assert!(config.boards[0].name.is_none());
        assert_eq!(config.boards[0].label(0), "board #1");
    }

    #[test]
    fn inline_tasks_parse_with_aliases() {
        let config: AppConfig = toml::from_str(
            r#"
[[boards]]
name = "Routine"
ticks = 2
tasks = [
    { id = "stretch", name = "Stretch", checks = [true] },
    { name = "Read", type = "Evening" },
]
"#,
        )
        .unwrap();
        let tasks = config.boards[0].tasks.as_ref().unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].ticks, vec![true]);
        assert_eq!(tasks[1].category.as_deref(), Some("Evening"));
        assert!(tasks[1].id.is_none());
    }

    #[test]
    fn label_prefers_title() {
        let board = BoardConfig {
            title: Some("Shopping".into()),
            ..BoardConfig::named("Groceries")
        };
        assert_eq!(board.label(0), "Shopping");
    }
}
