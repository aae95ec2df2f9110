use crate::error::PersistResult;

/// Key-value storage medium for serialized snapshots.
///
/// All implementations must satisfy these invariants:
/// - A write replaces the whole value under the key; readers never observe
///   a partially written value.
/// - Keys are opaque to the store.
/// - All I/O errors are propagated. Swallowing them is the caller's call.
pub trait SnapshotStore: Send + Sync {
    /// Read the bytes stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing is stored.
    fn read(&self, key: &str) -> PersistResult<Option<Vec<u8>>>;

    /// Store `bytes` under `key`, replacing any previous value.
    fn write(&self, key: &str, bytes: &[u8]) -> PersistResult<()>;

    /// Remove the value under `key`. Returns `true` if something was stored.
    fn remove(&self, key: &str) -> PersistResult<bool>;

    /// Check whether a value is stored under `key`.
    ///
    /// Default implementation reads the value. Backends may override.
    fn exists(&self, key: &str) -> PersistResult<bool> {
        Ok(self.read(key)?.is_some())
    }
}
