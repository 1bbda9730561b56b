use crate::error::{LookupError, StorageError};
use crate::storage::Storage;

use async_trait::async_trait;
use std::sync::Arc;

/// "Do you have this key?" asked of exactly one store.
///
/// Implemented once for the node's own storage and once for a remote peer.
/// An implementation must answer from a single store and never delegate.
#[async_trait]
pub trait KeyLookup: Send + Sync {
    /// `Ok(Some(value))` if found, `Ok(None)` if absent.
    async fn load(&self, key: &str) -> Result<Option<String>, LookupError>;

    /// Label used in logs.
    fn describe(&self) -> String;
}

/// Lookup against a local store; returns the oldest live record's value.
pub struct StorageLookup {
    label: String,
    storage: Arc<dyn Storage>,
}

impl StorageLookup {
    pub fn new(label: impl Into<String>, storage: Arc<dyn Storage>) -> Self {
        Self {
            label: label.into(),
            storage,
        }
    }

    /// Typed local read used by the owning node.
    pub fn find(&self, key: &str) -> Result<Option<String>, StorageError> {
        let records = self.storage.find_by_key(key)?;
        Ok(records.into_iter().next().map(|record| record.value))
    }
}

#[async_trait]
impl KeyLookup for StorageLookup {
    async fn load(&self, key: &str) -> Result<Option<String>, LookupError> {
        Ok(self.find(key)?)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
