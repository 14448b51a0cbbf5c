use std::path::Path;

use rusqlite::{params, Connection};
use tracing::info;

use super::Storage;
use crate::error::{LogbookError, Result};

/// SQLite-backed key-value table.
/// All operations are synchronous (rusqlite is blocking).
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open or create the database at `db_path` and ensure the `kv` table exists.
    pub fn open(db_path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                LogbookError::Storage(format!("Failed to create data dir: {}", e))
            })?;
        }

        let conn = Connection::open(db_path).map_err(|e| {
            LogbookError::Storage(format!("Failed to open store at {:?}: {}", db_path, e))
        })?;
        Self::init(conn, &format!("{:?}", db_path))
    }

    /// In-memory database, mostly for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, ":memory:")
    }

    fn init(conn: Connection, label: &str) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )
        .map_err(|e| LogbookError::Storage(format!("Failed to create kv table: {}", e)))?;

        info!("Opened SQLite store at {}", label);
        Ok(Self { conn })
    }
}

impl Storage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let result = self.conn.query_row(
            "SELECT value FROM kv WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            // Never written
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(LogbookError::Storage(format!("Lookup of '{}' failed: {}", key, e))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        // Upsert; updated_at tracks the last write
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv (key, value, updated_at)
                 VALUES (?1, ?2, datetime('now'))",
                params![key, value],
            )
            .map_err(|e| LogbookError::Storage(format!("Failed to write '{}': {}", key, e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_put_and_get() {
        let store = SqliteStorage::open_in_memory().unwrap();
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("b").unwrap(), None);
    }

    #[test]
    fn test_overwrite() {
        let store = SqliteStorage::open_in_memory().unwrap();
        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_persists_across_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site.db");
        {
            let store = SqliteStorage::open(&path).unwrap();
            store.set("headline", "kept").unwrap();
        }
        let store = SqliteStorage::open(&path).unwrap();
        assert_eq!(store.get("headline").unwrap().as_deref(), Some("kept"));
    }
}
