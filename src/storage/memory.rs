//! In-memory `Storage` backed by `DashMap`.
//!
//! Nothing survives a restart. Used by tests and by nodes started with
//! `--in-memory`.

use super::types::{Record, Storage, now_ms};
use crate::error::StorageError;

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

pub struct MemoryStore {
    records: DashMap<u64, Record>,
    by_key: DashMap<String, Vec<u64>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            by_key: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl MemoryStore {
    fn ids_for(&self, key: &str) -> Vec<u64> {
        let mut ids = self
            .by_key
            .get(key)
            .map(|ids| ids.value().clone())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    fn live_where(&self, keep: impl Fn(&Record) -> bool) -> Vec<Record> {
        let mut records: Vec<Record> = self
            .records
            .iter()
            .filter(|entry| !entry.value().is_deleted() && keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_unstable_by_key(|record| record.id);
        records
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStore {
    fn create(&self, key: &str, value: &str) -> Result<Record, StorageError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = now_ms();
        let record = Record {
            id,
            key: key.to_string(),
            value: value.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        self.records.insert(id, record.clone());
        self.by_key.entry(key.to_string()).or_default().push(id);

        Ok(record)
    }

    fn find_by_key(&self, key: &str) -> Result<Vec<Record>, StorageError> {
        Ok(self
            .ids_for(key)
            .into_iter()
            .filter_map(|id| self.records.get(&id).map(|r| r.value().clone()))
            .filter(|record| !record.is_deleted())
            .collect())
    }

    fn find_by_id(&self, id: u64) -> Result<Option<Record>, StorageError> {
        Ok(self.records.get(&id).map(|r| r.value().clone()))
    }

    fn update_value(&self, id: u64, value: &str) -> Result<Option<Record>, StorageError> {
        match self.records.get_mut(&id) {
            Some(mut record) if !record.is_deleted() => {
                record.value = value.to_string();
                record.updated_at = now_ms();
                Ok(Some(record.value().clone()))
            }
            _ => Ok(None),
        }
    }

    fn soft_delete(&self, id: u64) -> Result<Option<Record>, StorageError> {
        match self.records.get_mut(&id) {
            Some(mut record) if !record.is_deleted() => {
                let now = now_ms();
                record.deleted_at = Some(now);
                record.updated_at = now;
                Ok(Some(record.value().clone()))
            }
            _ => Ok(None),
        }
    }

    fn update_value_by_key(&self, key: &str, value: &str) -> Result<usize, StorageError> {
        let mut changed = 0;
        for id in self.ids_for(key) {
            if self.update_value(id, value)?.is_some() {
                changed += 1;
            }
        }
        Ok(changed)
    }

    fn soft_delete_by_key(&self, key: &str) -> Result<usize, StorageError> {
        let mut deleted = 0;
        for id in self.ids_for(key) {
            if self.soft_delete(id)?.is_some() {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    fn all(&self) -> Result<Vec<Record>, StorageError> {
        Ok(self.live_where(|_| true))
    }

    fn updated_after(&self, ts: u64) -> Result<Vec<Record>, StorageError> {
        Ok(self.live_where(|record| record.updated_at > ts))
    }

    fn count(&self) -> Result<usize, StorageError> {
        Ok(self
            .records
            .iter()
            .filter(|entry| !entry.value().is_deleted())
            .count())
    }
}
