use rusqlite::{Connection, Result};
use std::collections::HashMap;

/// Current database schema version
const CURRENT_VERSION: u32 = 1;

/// Migration system for managing remote-store schema versions
pub struct MigrationManager;

impl MigrationManager {
    /// Initialize the database with the current schema
    /// This creates the schema_version table and applies all migrations
    pub fn initialize(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )",
            [],
        )?;

        let current_version: u32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        for version in (current_version + 1)..=CURRENT_VERSION {
            Self::apply_migration(conn, version)?;
        }

        Ok(())
    }

    /// Apply a specific migration by version number
    fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
        let migrations = get_migrations();
        if let Some(migration) = migrations.get(&version) {
            let tx = conn.unchecked_transaction()?;
            migration(&tx)?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [version],
            )?;
            tx.commit()?;
            Ok(())
        } else {
            Err(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_MISUSE),
                Some(format!("No migration found for version {}", version)),
            ))
        }
    }

    /// Get the current schema version
    pub fn get_version(conn: &Connection) -> Result<u32> {
        conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
    }
}

/// Get all migrations indexed by version
fn get_migrations() -> HashMap<u32, fn(&rusqlite::Transaction) -> Result<(), rusqlite::Error>> {
    let mut migrations: HashMap<u32, fn(&rusqlite::Transaction) -> Result<(), rusqlite::Error>> =
        HashMap::new();
    migrations.insert(1, migration_v1);
    migrations
}

/// Migration v1: stages and cards tables, keyed by board id
fn migration_v1(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    tx.execute(
        "CREATE TABLE stages (
            id TEXT PRIMARY KEY,
            board_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            prob REAL NULL,
            wip INTEGER NULL,
            sort INTEGER NOT NULL
        )",
        [],
    )?;

    tx.execute(
        "CREATE TABLE cards (
            id TEXT PRIMARY KEY,
            board_id INTEGER NOT NULL,
            stage_id TEXT NOT NULL,
            country TEXT NOT NULL,
            value REAL NULL,
            owner TEXT NULL,
            org TEXT NULL,
            priority TEXT NULL,
            next_action TEXT NULL,
            due TEXT NULL,
            links TEXT NULL,
            notes TEXT NULL,
            flags TEXT NOT NULL DEFAULT '{}'
        )",
        [],
    )?;
    // Cards are fetched per board and grouped by stage in memory; no foreign
    // key to stages so orphaned rows are tolerated (and dropped on load).

    tx.execute(
        "CREATE INDEX idx_stages_board_sort ON stages(board_id, sort)",
        [],
    )?;
    tx.execute("CREATE INDEX idx_cards_board ON cards(board_id)", [])?;

    Ok(())
}
