//! SQLite-backed record store.
//!
//! One row per `(viewer, item)` pair; the record itself is a JSON TEXT
//! column so the durable encoding matches [`MemoryStore`](super::MemoryStore).
//! Merge runs read-modify-write inside a single transaction, which is what
//! makes per-key last-write-wins hold across controller instances sharing
//! the same database.

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection};

use super::RecordStore;
use crate::config::data_dir;
use crate::error::StoreError;
use crate::record::{EngagementRecord, RecordPatch};
use crate::viewer::StoreKey;

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the store at `<data dir>/playmark.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable or the
    /// database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let dir = data_dir().map_err(|e| StoreError::DataDir(e.to_string()))?;
        Self::open_at(dir.join("playmark.db"))
    }

    /// Open the store at an explicit path.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (ephemeral hosts and tests).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS engagement (
                viewer      TEXT NOT NULL,
                item        TEXT NOT NULL,
                record      TEXT NOT NULL,
                updated_at  TEXT NOT NULL,
                PRIMARY KEY (viewer, item)
            );",
        )?;
        Ok(())
    }

    fn read_encoded(conn: &Connection, key: &StoreKey) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt =
            conn.prepare("SELECT record FROM engagement WHERE viewer = ?1 AND item = ?2")?;
        let result = stmt.query_row(params![key.viewer.as_str(), key.item.as_str()], |row| {
            row.get::<_, String>(0)
        });
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn decode(key: &StoreKey, encoded: &str) -> Result<EngagementRecord, StoreError> {
        serde_json::from_str(encoded).map_err(|_| StoreError::Corrupted { key: key.clone() })
    }
}

impl RecordStore for SqliteStore {
    fn read(&self, key: &StoreKey) -> Result<Option<EngagementRecord>, StoreError> {
        match Self::read_encoded(&self.conn, key)? {
            None => Ok(None),
            Some(encoded) => Self::decode(key, &encoded).map(Some),
        }
    }

    fn merge(
        &mut self,
        key: &StoreKey,
        patch: RecordPatch,
    ) -> Result<EngagementRecord, StoreError> {
        let tx = self.conn.transaction()?;

        let mut record = match Self::read_encoded(&tx, key)? {
            None => EngagementRecord::default(),
            Some(encoded) => Self::decode(key, &encoded)?,
        };
        record.apply(&patch);

        let encoded = serde_json::to_string(&record)?;
        tx.execute(
            "INSERT OR REPLACE INTO engagement (viewer, item, record, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                key.viewer.as_str(),
                key.item.as_str(),
                encoded,
                Utc::now().to_rfc3339(),
            ],
        )?;
        tx.commit()?;
        Ok(record)
    }

    fn delete(&mut self, key: &StoreKey) -> Result<(), StoreError> {
        self.conn.execute(
            "DELETE FROM engagement WHERE viewer = ?1 AND item = ?2",
            params![key.viewer.as_str(), key.item.as_str()],
        )?;
        Ok(())
    }
}
