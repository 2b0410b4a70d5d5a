//! SQLite persistence mirror for clipboard history
//!
//! Only `{id, text}` pairs are durable; the inverted index is rebuilt from
//! these rows at startup and never persisted.

use std::collections::HashSet;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tokio::sync::Mutex;

const SCHEMA_VERSION: u32 = 1;

/// Persistence errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Underlying SQLite error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error creating the database directory
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unknown on-disk schema version
    #[error("unsupported schema version {0}")]
    UnsupportedSchema(u32),
}

/// SQLite-backed store of `{id, text}` rows
pub struct HistoryDatabase {
    conn: Mutex<Connection>,
}

impl HistoryDatabase {
    /// Open (or create) the database at `path`
    pub async fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL so a reader (e.g. the picker) can coexist with the watcher
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        let db = Self {
            conn: Mutex::new(conn),
        };

        db.initialize().await?;
        Ok(db)
    }

    /// In-memory database, used by tests
    pub fn in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_conn(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    async fn initialize(&self) -> Result<(), DatabaseError> {
        let conn = self.conn.lock().await;
        Self::initialize_conn(&conn)
    }

    fn initialize_conn(conn: &Connection) -> Result<(), DatabaseError> {
        let version = Self::schema_version(conn)?;

        if version == 0 {
            Self::create_schema(conn)?;
        } else if version > SCHEMA_VERSION {
            return Err(DatabaseError::UnsupportedSchema(version));
        }

        Ok(())
    }

    fn schema_version(conn: &Connection) -> Result<u32, DatabaseError> {
        let table_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !table_exists {
            return Ok(0);
        }

        let version: Option<u32> = conn
            .query_row(
                "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        Ok(version.unwrap_or(0))
    }

    fn create_schema(conn: &Connection) -> Result<(), DatabaseError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at INTEGER DEFAULT (strftime('%s', 'now'))
            );

            CREATE TABLE IF NOT EXISTS entries (
                id INTEGER PRIMARY KEY,
                text TEXT NOT NULL UNIQUE
            );
            ",
        )?;

        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }

    /// Load every persisted row, id-ascending
    pub async fn load_all(&self) -> Result<Vec<(u64, String)>, DatabaseError> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare("SELECT id, text FROM entries ORDER BY id ASC")?;
        let rows = stmt
            .query_map([], |row| {
                let id: i64 = row.get(0)?;
                let text: String = row.get(1)?;
                Ok((id as u64, text))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Persist one entry under its assigned id
    pub async fn insert(&self, id: u64, text: &str) -> Result<(), DatabaseError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO entries (id, text) VALUES (?, ?)",
            params![id as i64, text],
        )?;
        Ok(())
    }

    /// Delete the row with this id, if present
    pub async fn delete(&self, id: u64) -> Result<(), DatabaseError> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM entries WHERE id = ?", params![id as i64])?;
        Ok(())
    }

    /// Delete every row in `ids`
    pub async fn delete_many(&self, ids: &HashSet<u64>) -> Result<(), DatabaseError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("DELETE FROM entries WHERE id = ?")?;
        for id in ids {
            stmt.execute(params![*id as i64])?;
        }
        Ok(())
    }

    /// Drop every row
    pub async fn clear(&self) -> Result<(), DatabaseError> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM entries", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup_test_db() -> (HistoryDatabase, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = HistoryDatabase::open(&db_path).await.unwrap();
        (db, temp_dir)
    }

    #[tokio::test]
    async fn test_insert_and_load_roundtrip() {
        let (db, _temp_dir) = setup_test_db().await;

        db.insert(1, "first").await.unwrap();
        db.insert(2, "second").await.unwrap();

        let rows = db.load_all().await.unwrap();
        assert_eq!(
            rows,
            vec![(1, "first".to_string()), (2, "second".to_string())]
        );
    }

    #[tokio::test]
    async fn test_text_is_unique() {
        let (db, _temp_dir) = setup_test_db().await;

        db.insert(1, "dup").await.unwrap();
        assert!(db.insert(2, "dup").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let (db, _temp_dir) = setup_test_db().await;

        db.insert(1, "a").await.unwrap();
        db.insert(2, "b").await.unwrap();
        db.insert(3, "c").await.unwrap();

        db.delete(2).await.unwrap();
        db.delete_many(&HashSet::from([1, 99])).await.unwrap();
        assert_eq!(db.load_all().await.unwrap(), vec![(3, "c".to_string())]);

        db.clear().await.unwrap();
        assert!(db.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reopen_preserves_rows() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("persist.db");

        {
            let db = HistoryDatabase::open(&db_path).await.unwrap();
            db.insert(5, "survives restart").await.unwrap();
        }

        let db = HistoryDatabase::open(&db_path).await.unwrap();
        let rows = db.load_all().await.unwrap();
        assert_eq!(rows, vec![(5, "survives restart".to_string())]);
    }
}
