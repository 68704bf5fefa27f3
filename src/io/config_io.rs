use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::board::BoardKey;
use crate::model::config::AppConfig;

/// Config file name looked up from the working directory upwards
pub const CONFIG_FILE: &str = "tickboard.toml";

/// Error type for config file I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("no tickboard.toml found in this directory or any parent (try `tb init`)")]
    NotFound,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse tickboard.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not edit tickboard.toml: {0}")]
    EditError(#[from] toml_edit::TomlError),
    #[error("two boards share the storage key \"{0}\"")]
    DuplicateBoard(BoardKey),
}

/// A parsed config plus where it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub path: PathBuf,
    pub config: AppConfig,
    /// Store directory, resolved against the config file's directory
    pub store_dir: PathBuf,
}

/// Walk up from `start` looking for tickboard.toml
pub fn discover_config(start: &Path) -> Result<PathBuf, ConfigFileError> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(ConfigFileError::NotFound);
        }
    }
}

/// Read and parse a config file
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigFileError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigFileError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: AppConfig = toml::from_str(&text)?;
    check_unique_keys(&config)?;

    let base = path.parent().unwrap_or(Path::new("."));
    let store_dir = base.join(&config.store.dir);
    Ok(LoadedConfig {
        path: path.to_path_buf(),
        config,
        store_dir,
    })
}

/// Load the explicit config file, or discover one from the working directory
pub fn resolve_config(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigFileError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let cwd = std::env::current_dir().map_err(|e| ConfigFileError::ReadError {
                path: PathBuf::from("."),
                source: e,
            })?;
            discover_config(&cwd)?
        }
    };
    load_config(&path)
}

/// Boards with names that differ only in case or punctuation would share
/// an entity file and UI state
fn check_unique_keys(config: &AppConfig) -> Result<(), ConfigFileError> {
    let mut seen = HashSet::new();
    for board in &config.boards {
        if let Some(name) = board.name.as_deref() {
            let key = BoardKey::from_name(name);
            if !seen.insert(key.clone()) {
                return Err(ConfigFileError::DuplicateBoard(key));
            }
        }
    }
    Ok(())
}

/// Read the config as an editable document (formatting preserved).
/// A missing file yields an empty document.
pub fn read_config_doc(path: &Path) -> Result<toml_edit::DocumentMut, ConfigFileError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(ConfigFileError::ReadError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    Ok(text.parse()?)
}

/// Write the config document back to disk
pub fn write_config_doc(path: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigFileError> {
    fs::write(path, doc.to_string()).map_err(|e| ConfigFileError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Whether the document already has a board with this name's key
pub fn has_board(doc: &toml_edit::DocumentMut, name: &str) -> bool {
    let key = BoardKey::from_name(name);
    doc.get("boards")
        .and_then(|b| b.as_array_of_tables())
        .is_some_and(|boards| {
            boards.iter().any(|table| {
                table
                    .get("name")
                    .and_then(|v| v.as_str())
                    .is_some_and(|n| BoardKey::from_name(n) == key)
            })
        })
}

/// Append a `[[boards]]` entry
pub fn add_board_to_config(
    doc: &mut toml_edit::DocumentMut,
    name: &str,
    ticks: usize,
    categories: bool,
) {
    if !doc.contains_key("boards") {
        doc["boards"] = toml_edit::Item::ArrayOfTables(toml_edit::ArrayOfTables::new());
    }

    if let Some(boards) = doc["boards"].as_array_of_tables_mut() {
        let mut table = toml_edit::Table::new();
        table["name"] = toml_edit::value(name);
        table["ticks"] = toml_edit::value(ticks as i64);
        if categories {
            table["categories"] = toml_edit::value(true);
        }
        boards.push(table);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_config() -> &'static str {
        r#"# my boards
[store]
dir = "state"

[[boards]]
name = "Groceries"
ticks = 1
categories = true

[[boards]]
name = "Habits"
ticks = 7
columns = 2
"#
    }

    #[test]
    fn load_resolves_store_dir_next_to_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, sample_config()).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.store_dir, tmp.path().join("state"));
        assert_eq!(loaded.config.boards.len(), 2);
        assert_eq!(loaded.config.boards[1].ticks, 7);
        assert_eq!(loaded.config.boards[1].columns, 2);
    }

    #[test]
    fn discover_walks_up() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), sample_config()).unwrap();
        let nested = tmp.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(
            discover_config(&nested).unwrap(),
            tmp.path().join(CONFIG_FILE)
        );
    }

    #[test]
    fn duplicate_keys_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "[[boards]]\nname = \"Home\"\n\n[[boards]]\nname = \"HOME\"\n",
        )
        .unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigFileError::DuplicateBoard(_))
        ));
    }

    #[test]
    fn parse_error_is_reported() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "[[boards]\nname=").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigFileError::ParseError(_))
        ));
    }

    #[test]
    fn add_board_preserves_existing_text() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        assert!(has_board(&doc, "groceries"));
        assert!(!has_board(&doc, "Chores"));

        add_board_to_config(&mut doc, "Chores", 3, true);
        let result = doc.to_string();
        assert!(result.contains("# my boards"));
        assert!(result.contains("dir = \"state\""));

        let config: AppConfig = toml::from_str(&result).unwrap();
        assert_eq!(config.boards.len(), 3);
        assert_eq!(config.boards[2].name.as_deref(), Some("Chores"));
        assert_eq!(config.boards[2].ticks, 3);
        assert!(config.boards[2].categories);
    }

    #[test]
    fn read_missing_doc_is_empty() {
        let tmp = TempDir::new().unwrap();
        let doc = read_config_doc(&tmp.path().join(CONFIG_FILE)).unwrap();
        assert!(doc.to_string().is_empty());
    }
}
