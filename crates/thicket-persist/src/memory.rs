use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::error::{PersistError, PersistResult};
use crate::traits::SnapshotStore;

/// In-memory, HashMap-based snapshot store.
///
/// Intended for tests and embedding. Counts successful writes so debounce
/// behavior can be observed, and can be switched into a failing mode to
/// simulate a full or unavailable medium.
pub struct InMemorySnapshotStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl InMemorySnapshotStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            writes: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful writes since creation.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Acquire)
    }

    /// When `true`, every write fails with [`PersistError::Unavailable`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Release);
    }
}

impl Default for InMemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn read(&self, key: &str) -> PersistResult<Option<Vec<u8>>> {
        let map = self.blobs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(map.get(key).cloned())
    }

    fn write(&self, key: &str, bytes: &[u8]) -> PersistResult<()> {
        if self.fail_writes.load(Ordering::Acquire) {
            return Err(PersistError::Unavailable("writes disabled".into()));
        }
        let mut map = self.blobs.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(key.to_string(), bytes.to_vec());
        self.writes.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn remove(&self, key: &str) -> PersistResult<bool> {
        let mut map = self.blobs.write().unwrap_or_else(PoisonError::into_inner);
        Ok(map.remove(key).is_some())
    }

    fn exists(&self, key: &str) -> PersistResult<bool> {
        let map = self.blobs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(map.contains_key(key))
    }
}

impl std::fmt::Debug for InMemorySnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySnapshotStore")
            .field("key_count", &self.len())
            .field("write_count", &self.write_count())
            .finish()
    }
}
