use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::StoreError;
use crate::kanban_board::KanbanBoard;

/// Fixed key of the single storage slot; also the default board file stem.
pub const STORAGE_KEY: &str = "trello_clone_data_final_v2";

/// Reads and writes the whole board as one JSON blob.
#[derive(Debug, Clone)]
pub struct BoardStore {
    path: PathBuf,
}

impl BoardStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the board. Missing or malformed data yields an empty board.
    pub fn load(&self) -> KanbanBoard {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no board file, starting empty");
                return KanbanBoard::new();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not read board file, starting empty");
                return KanbanBoard::new();
            }
        };

        let mut board: KanbanBoard = match serde_json::from_str(&data) {
            Ok(board) => board,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "malformed board file, starting empty");
                return KanbanBoard::new();
            }
        };

        let dropped = board.dedup_ids();
        if !dropped.is_empty() {
            tracing::warn!(?dropped, "dropped tasks with repeated ids");
        }
        tracing::debug!(tasks = board.len(), "board loaded");
        board
    }

    /// Overwrites the board file with the full collection.
    pub fn save(&self, board: &KanbanBoard) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(board)?;
        self.atomic_write(content.as_bytes())
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        tracing::debug!(tasks = board.len(), path = %self.path.display(), "board saved");
        Ok(())
    }

    fn atomic_write(&self, content: &[u8]) -> std::io::Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Column, Priority, Task};
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> BoardStore {
        BoardStore::new(dir.path().join(format!("{STORAGE_KEY}.json")))
    }

    fn task(id: &str) -> Task {
        Task {
            id: id.into(),
            title: "Write report".into(),
            description: "quarterly".into(),
            due: "2024-01-01".into(),
            priority: Priority::High,
        }
    }

    #[test]
    fn missing_file_loads_empty_board() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store(&dir).load(), KanbanBoard::new());
    }

    #[test]
    fn malformed_file_loads_empty_board() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        for junk in ["not json {{{", "[]", "null", r#"{"columns": 3}"#, r#"{"columns":{"todo":[{"id":1}]}}"#] {
            fs::write(store.path(), junk).unwrap();
            let board = store.load();
            assert!(board.is_empty(), "expected empty board for {junk}");
        }
    }

    #[test]
    fn null_columns_load_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::write(
            store.path(),
            r#"{"columns":{"todo":[{"id":"a","title":"t"}],"inprogress":null,"done":[]}}"#,
        )
        .unwrap();
        let board = store.load();
        assert_eq!(board.len(), 1);
        assert_eq!(board.column_of("a"), Some(Column::Todo));
        assert!(board.tasks(Column::InProgress).is_empty());

        fs::write(store.path(), r#"{"columns":null}"#).unwrap();
        assert_eq!(store.load(), KanbanBoard::new());
    }

    #[test]
    fn missing_columns_are_created() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::write(
            store.path(),
            r#"{"columns":{"done":[{"id":"x","title":"shipped"}]}}"#,
        )
        .unwrap();
        let board = store.load();
        assert!(board.tasks(Column::Todo).is_empty());
        assert!(board.tasks(Column::InProgress).is_empty());
        assert_eq!(board.column_of("x"), Some(Column::Done));
    }

    #[test]
    fn save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut board = KanbanBoard::new();
        board.add_task(Column::Todo, task("a"));
        board.add_task(Column::InProgress, task("b"));
        store.save(&board).unwrap();
        assert_eq!(store.load(), board);
    }

    #[test]
    fn persisted_layout_has_all_columns() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save(&KanbanBoard::new()).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        for id in ["todo", "inprogress", "done"] {
            assert_eq!(raw["columns"][id], serde_json::json!([]));
        }
    }

    #[test]
    fn save_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let store = BoardStore::new(dir.path().join("nested/board.json"));
        store.save(&KanbanBoard::new()).unwrap();
        assert!(store.path().exists());
    }
}
