use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::model::board::BoardKey;
use crate::model::task::{RawTask, Snapshot, Task};

/// Error type for entity file operations
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("board file already exists: {0}")]
    AlreadyExists(PathBuf),
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not serialize tasks: {0}")]
    SerializeError(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct SnapshotFileRef<'a> {
    tasks: &'a [Task],
}

/// Path of a board's entity file inside the store directory
pub fn board_path(store_dir: &Path, key: &BoardKey) -> PathBuf {
    store_dir.join(format!("{}.json", key))
}

/// Current snapshot for a board: its inline list when it has one, otherwise
/// whatever the entity file holds.
pub fn board_snapshot(
    store_dir: &Path,
    key: &BoardKey,
    inline: Option<&[RawTask]>,
) -> Option<Snapshot> {
    match inline {
        Some(tasks) => Some(Snapshot::new(tasks.to_vec())),
        None => read_snapshot(&board_path(store_dir, key)),
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Decode an entity payload.
///
/// Records are decoded one at a time; undecodable ones are skipped. A payload
/// that is not an object with a `tasks` array yields an empty snapshot.
pub fn parse_snapshot(content: &str) -> Snapshot {
    let value: serde_json::Value = match serde_json::from_str(content) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "malformed snapshot payload, treating as empty");
            return Snapshot::default();
        }
    };

    let Some(records) = value.get("tasks").and_then(|t| t.as_array()) else {
        tracing::warn!("snapshot payload has no tasks array, treating as empty");
        return Snapshot::default();
    };

    let tasks = records
        .iter()
        .filter_map(|record| match serde_json::from_value::<RawTask>(record.clone()) {
            Ok(raw) => Some(raw),
            Err(e) => {
                tracing::debug!(error = %e, "skipping undecodable task record");
                None
            }
        })
        .collect();

    Snapshot::new(tasks)
}

/// Read a board's entity file. `None` means the entity does not exist.
pub fn read_snapshot(path: &Path) -> Option<Snapshot> {
    match fs::read_to_string(path) {
        Ok(content) => Some(parse_snapshot(&content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read board file");
            Some(Snapshot::default())
        }
    }
}

/// Replace a board's entity file with the given list
pub fn write_snapshot(path: &Path, tasks: &[Task]) -> Result<(), SnapshotError> {
    let content = serde_json::to_string_pretty(&SnapshotFileRef { tasks })?;
    atomic_write(path, content.as_bytes()).map_err(|e| SnapshotError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Create an empty entity file for a new board
pub fn create_board_file(store_dir: &Path, key: &BoardKey) -> Result<PathBuf, SnapshotError> {
    fs::create_dir_all(store_dir).map_err(|e| SnapshotError::WriteError {
        path: store_dir.to_path_buf(),
        source: e,
    })?;
    let path = board_path(store_dir, key);
    if path.exists() {
        return Err(SnapshotError::AlreadyExists(path));
    }
    write_snapshot(&path, &[])?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn inline_list_wins_over_the_store_file() {
        let dir = TempDir::new().unwrap();
        let key = BoardKey::from_name("Routine");
        write_snapshot(&board_path(dir.path(), &key), &[]).unwrap();

        let inline = vec![RawTask {
            name: Some("Stretch".into()),
            ..RawTask::default()
        }];
        let snapshot = board_snapshot(dir.path(), &key, Some(&inline)).unwrap();
        assert_eq!(snapshot.tasks, inline);
        assert_eq!(board_snapshot(dir.path(), &key, None), Some(Snapshot::default()));
        assert!(board_snapshot(dir.path(), &BoardKey::from_name("Other"), None).is_none());
    }

    #[test]
    fn missing_file_is_missing_entity() {
        let dir = TempDir::new().unwrap();
        assert!(read_snapshot(&dir.path().join("nope.json")).is_none());
    }

    #[test]
    fn malformed_payload_is_empty_snapshot() {
        assert_eq!(parse_snapshot("{{{"), Snapshot::default());
        assert_eq!(parse_snapshot(r#"{"tasks": 3}"#), Snapshot::default());
        assert_eq!(parse_snapshot("[]"), Snapshot::default());
    }

    #[test]
    fn bad_records_are_skipped() {
        let snapshot = parse_snapshot(
            r#"{"tasks":[{"name":"Milk","checks":[true]},{"name":"Bad","ticks":"yes"},7]}"#,
        );
        assert_eq!(snapshot.tasks.len(), 1);
        assert_eq!(snapshot.tasks[0].name.as_deref(), Some("Milk"));
    }

    #[test]
    fn write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = board_path(dir.path(), &BoardKey::from_name("Home"));
        let tasks = vec![Task::new("a_1".into(), "A".into(), Some("X".into()), 2)];
        write_snapshot(&path, &tasks).unwrap();

        let snapshot = read_snapshot(&path).unwrap();
        assert_eq!(snapshot, Snapshot::from_tasks(&tasks));
    }

    #[test]
    fn create_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let key = BoardKey::from_name("Home");
        let path = create_board_file(dir.path(), &key).unwrap();
        assert_eq!(path, dir.path().join("home.json"));
        assert_eq!(read_snapshot(&path), Some(Snapshot::default()));
        assert!(matches!(
            create_board_file(dir.path(), &key),
            Err(SnapshotError::AlreadyExists(_))
        ));
    }
}
