use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A stored key/value entry.
///
/// Owned by the store of the node that created it. Timestamps are unix
/// milliseconds; a set `deleted_at` marks the record as soft-deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub key: String,
    pub value: String,
    pub created_at: u64,
    pub updated_at: u64,
    pub deleted_at: Option<u64>,
}

impl Record {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Private per-node record repository.
///
/// Implementations do not enforce key uniqueness; that is the job of the
/// node protocol. `find_by_key` only ever returns live records, ordered by id.
pub trait Storage: Send + Sync {
    /// Inserts a new record, assigning its id and timestamps.
    fn create(&self, key: &str, value: &str) -> Result<Record, StorageError>;

    /// Returns all non-deleted records with `key`, oldest first.
    fn find_by_key(&self, key: &str) -> Result<Vec<Record>, StorageError>;

    /// Returns a record by id, including soft-deleted ones.
    fn find_by_id(&self, id: u64) -> Result<Option<Record>, StorageError>;

    /// Replaces the value of a live record. `None` if no live record has `id`.
    fn update_value(&self, id: u64, value: &str) -> Result<Option<Record>, StorageError>;

    /// Marks a record deleted. `None` if no live record has `id`.
    fn soft_delete(&self, id: u64) -> Result<Option<Record>, StorageError>;

    /// Replaces the value of every live record with `key`. Returns how many
    /// records changed.
    fn update_value_by_key(&self, key: &str, value: &str) -> Result<usize, StorageError>;

    /// Marks every live record with `key` deleted, freeing the key for a new
    /// Save. Returns how many records were deleted.
    fn soft_delete_by_key(&self, key: &str) -> Result<usize, StorageError>;

    /// All live records, oldest first.
    fn all(&self) -> Result<Vec<Record>, StorageError>;

    /// Live records whose `updated_at` is strictly after `ts`, oldest first.
    fn updated_after(&self, ts: u64) -> Result<Vec<Record>, StorageError>;

    /// Number of live records.
    fn count(&self) -> Result<usize, StorageError>;
}

pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
