use rusqlite::Connection;
use std::path::{Path, PathBuf};

use crate::db::migrations::MigrationManager;
use crate::error::BoardError;

/// Remote-store connection manager.
///
/// The remote database is addressed by a filesystem path resolved from the
/// `DEALFLOW_REMOTE` environment variable or the `remote.location=` key in
/// `~/.dealflow/rc`. When neither is present the remote is *unconfigured*:
/// loads fall back to the demo board and writes become no-ops.
pub struct DbConnection;

impl DbConnection {
    fn home_dir() -> PathBuf {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".dealflow")
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        Self::home_dir().join("rc")
    }

    /// Path of the locally cached board snapshot
    pub fn snapshot_path() -> PathBuf {
        Self::home_dir().join("board.json")
    }

    /// Read a key from the rc file (simple `key=value` lines)
    fn config_value(key: &str) -> Option<String> {
        let config_path = Self::config_path();
        let prefix = format!("{}=", key);
        let config = std::fs::read_to_string(&config_path).ok()?;
        for line in config.lines() {
            let line = line.trim();
            if let Some(value) = line.strip_prefix(&prefix) {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
        None
    }

    /// Resolve the remote database location, if any is configured.
    /// `DEALFLOW_REMOTE` wins over the rc file. Relative rc paths are
    /// resolved against the config file's directory.
    pub fn resolve_remote() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("DEALFLOW_REMOTE") {
            let path = path.trim();
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        let value = Self::config_value("remote.location")?;
        let path = PathBuf::from(value);
        if path.is_relative() {
            Some(Self::home_dir().join(path))
        } else {
            Some(path)
        }
    }

    /// The board identifier this session works against (rc `board.id=`,
    /// default 1). A single board per store; no multi-tenant isolation.
    pub fn board_id() -> i64 {
        Self::config_value("board.id")
            .and_then(|v| v.parse().ok())
            .unwrap_or(1)
    }

    /// Open the remote database, creating it and parent directories if
    /// needed, and bring the schema up to date.
    pub fn open(db_path: &Path) -> Result<Connection, BoardError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    BoardError::persistence(format!(
                        "Failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let conn = Connection::open(db_path).map_err(|e| {
            BoardError::persistence(format!("Failed to open database {}: {}", db_path.display(), e))
        })?;

        // Background write threads may contend on the same file
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        MigrationManager::initialize(&conn)
            .map_err(|e| BoardError::persistence(format!("Failed to initialize schema: {}", e)))?;

        Ok(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Connection, BoardError> {
        let conn = Connection::open_in_memory()?;
        MigrationManager::initialize(&conn)
            .map_err(|e| BoardError::persistence(format!("Failed to initialize schema: {}", e)))?;
        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_directory_and_schema() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("remote.db");
        let conn = DbConnection::open(&db_path).unwrap();
        assert!(db_path.exists());
        assert_eq!(MigrationManager::get_version(&conn).unwrap(), 1);
    }

    #[test]
    fn test_open_in_memory() {
        let conn = DbConnection::open_in_memory().unwrap();
        assert_eq!(MigrationManager::get_version(&conn).unwrap(), 1);
    }

    #[test]
    fn test_config_paths_live_under_dealflow_dir() {
        // HOME is always set in the test environment
        let rc = DbConnection::config_path();
        assert!(rc.to_string_lossy().contains(".dealflow"));
        assert!(DbConnection::snapshot_path()
            .to_string_lossy()
            .ends_with("board.json"));
    }
}
