use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-key critical sections.
///
/// Two Saves of the same key on one node never interleave, and a Save stuck
/// on a slow peer never holds up Saves of other keys. An entry lives only
/// while some task holds or waits for its key.
#[derive(Default)]
pub struct KeyLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Held lock on one key. Dropping it releases the key and, when nobody else
/// is waiting, forgets it.
pub struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: &str) -> KeyGuard<'_> {
        // Built first so a cancelled wait still cleans up the entry
        let mut held = KeyGuard {
            locks: self,
            key: key.to_string(),
            guard: None,
        };

        let mutex = self.locks.entry(key.to_string()).or_default().value().clone();
        held.guard = Some(mutex.lock_owned().await);
        held
    }

    #[cfg(test)]
    pub(crate) fn tracked_keys(&self) -> usize {
        self.locks.len()
    }
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.locks
            .locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
