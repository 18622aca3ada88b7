//! Local snapshot and export/import handling.
//!
//! The snapshot is the textual board format `{ "stages": [...], "columns":
//! {...} }` - the same shape used for export/import. There is no version
//! field; format changes are not detected.

use chrono::Local;
use std::path::Path;

use crate::error::BoardError;
use crate::models::Board;

pub struct Snapshot;

impl Snapshot {
    /// Read the cached board snapshot. A missing file is not an error;
    /// an unreadable or malformed one is (callers decide whether to ignore).
    pub fn load(path: &Path) -> Result<Option<Board>, BoardError> {
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path)?;
        let mut board: Board = serde_json::from_str(&text)?;
        board.normalize();
        Ok(Some(board))
    }

    /// Write the board snapshot, creating parent directories as needed.
    pub fn save(path: &Path, board: &Board) -> Result<(), BoardError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(board)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Parse an imported payload. Both `stages` and `columns` keys must be
    /// present; anything else is rejected as malformed user input, not a
    /// persistence failure.
    pub fn import(text: &str) -> Result<Board, BoardError> {
        let mut board: Board = serde_json::from_str(text).map_err(|e| {
            BoardError::validation(format!("Malformed board payload: {}", e))
        })?;
        board.normalize();
        Ok(board)
    }

    /// Serialize the board in the export format
    pub fn export_string(board: &Board) -> Result<String, BoardError> {
        Ok(serde_json::to_string_pretty(board)?)
    }

    /// Default export filename, encoding the current date
    pub fn export_filename() -> String {
        format!("dealflow-board-{}.json", Local::now().format("%Y-%m-%d"))
    }
}
