//! SQLite-backed `Storage`.
//!
//! One file per node holding a single `records` table. Rows are never removed;
//! soft delete sets `deleted_at`. The key index is not unique: uniqueness is
//! advisory and handled by the node protocol.
//!
//! Writes and reads share one connection behind a mutex.

use super::types::{Record, Storage, now_ms};
use crate::error::StorageError;

use rusqlite::{Connection, OptionalExtension, Params, Row, params};
use std::path::Path;
use std::sync::Mutex;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS records (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    key         TEXT NOT NULL,
    value       TEXT NOT NULL,
    created_at  INTEGER NOT NULL,
    updated_at  INTEGER NOT NULL,
    deleted_at  INTEGER
);
CREATE INDEX IF NOT EXISTS idx_records_key ON records (key);
";

const SELECT_COLUMNS: &str = "id, key, value, created_at, updated_at, deleted_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (creating if needed) the store at `path` and applies the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| {
                    StorageError::CreateDirectory {
                        path: parent.display().to_string(),
                        source,
                    }
                })?;
            }
        }

        let conn = Connection::open(path).map_err(|source| StorageError::Open {
            path: path.display().to_string(),
            source,
        })?;

        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::Open {
            path: ":memory:".to_string(),
            source,
        })?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(
        &self,
        operation: &'static str,
    ) -> Result<std::sync::MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Poisoned(operation))
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<Record> {
    Ok(Record {
        id: row.get::<_, i64>(0)? as u64,
        key: row.get(1)?,
        value: row.get(2)?,
        created_at: row.get::<_, i64>(3)? as u64,
        updated_at: row.get::<_, i64>(4)? as u64,
        deleted_at: row.get::<_, Option<i64>>(5)?.map(|ts| ts as u64),
    })
}

fn select_by_id(conn: &Connection, id: u64) -> Result<Option<Record>, StorageError> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM records WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![id as i64], record_from_row)
        .optional()?)
}

/// Live records matching `filter`, ordered by id.
fn select_live(
    conn: &Connection,
    filter: &str,
    args: impl Params,
) -> Result<Vec<Record>, StorageError> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM records WHERE deleted_at IS NULL{filter} ORDER BY id"
    );

    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(args, record_from_row)?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}

impl Storage for SqliteStore {
    fn create(&self, key: &str, value: &str) -> Result<Record, StorageError> {
        let conn = self.lock("create")?;
        let now = now_ms();

        conn.execute(
            "INSERT INTO records (key, value, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            params![key, value, now as i64],
        )?;

        Ok(Record {
            id: conn.last_insert_rowid() as u64,
            key: key.to_string(),
            value: value.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    fn find_by_key(&self, key: &str) -> Result<Vec<Record>, StorageError> {
        let conn = self.lock("find_by_key")?;
        select_live(&conn, " AND key = ?1", params![key])
    }

    fn find_by_id(&self, id: u64) -> Result<Option<Record>, StorageError> {
        let conn = self.lock("find_by_id")?;
        select_by_id(&conn, id)
    }

    fn update_value(&self, id: u64, value: &str) -> Result<Option<Record>, StorageError> {
        let conn = self.lock("update_value")?;
        let changed = conn.execute(
            "UPDATE records SET value = ?1, updated_at = ?2 WHERE id = ?3 AND deleted_at IS NULL",
            params![value, now_ms() as i64, id as i64],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        select_by_id(&conn, id)
    }

    fn soft_delete(&self, id: u64) -> Result<Option<Record>, StorageError> {
        let conn = self.lock("soft_delete")?;
        let now = now_ms() as i64;
        let changed = conn.execute(
            "UPDATE records SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
            params![now, id as i64],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        select_by_id(&conn, id)
    }

    fn update_value_by_key(&self, key: &str, value: &str) -> Result<usize, StorageError> {
        let conn = self.lock("update_value_by_key")?;
        Ok(conn.execute(
            "UPDATE records SET value = ?1, updated_at = ?2 WHERE key = ?3 AND deleted_at IS NULL",
            params![value, now_ms() as i64, key],
        )?)
    }

    fn soft_delete_by_key(&self, key: &str) -> Result<usize, StorageError> {
        let conn = self.lock("soft_delete_by_key")?;
        Ok(conn.execute(
            "UPDATE records SET deleted_at = ?1, updated_at = ?1 WHERE key = ?2 AND deleted_at IS NULL",
            params![now_ms() as i64, key],
        )?)
    }

    fn all(&self) -> Result<Vec<Record>, StorageError> {
        let conn = self.lock("all")?;
        select_live(&conn, "", [])
    }

    fn updated_after(&self, ts: u64) -> Result<Vec<Record>, StorageError> {
        let conn = self.lock("updated_after")?;
        select_live(&conn, " AND updated_at > ?1", params![ts as i64])
    }

    fn count(&self) -> Result<usize, StorageError> {
        let conn = self.lock("count")?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM records WHERE deleted_at IS NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
