use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{PersistError, PersistResult};
use crate::traits::SnapshotStore;

/// Directory-backed snapshot store: one JSON file per key.
///
/// Writes go to a temporary file in the same directory which is then
/// renamed over the target, so a crash mid-write leaves the previous
/// snapshot intact.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Open (or create) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> PersistResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`: `:` and `/` become `-`, plus a `.json` suffix.
    pub fn path_for(&self, key: &str) -> PersistResult<PathBuf> {
        if key.is_empty() || key.contains("..") || key.contains('\\') {
            return Err(PersistError::InvalidKey(key.to_string()));
        }
        let name: String = key
            .chars()
            .map(|c| if c == ':' || c == '/' { '-' } else { c })
            .collect();
        Ok(self.dir.join(format!("{name}.json")))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn read(&self, key: &str) -> PersistResult<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, bytes: &[u8]) -> PersistResult<()> {
        let path = self.path_for(key)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| PersistError::Io(e.error))?;
        debug!(path = %path.display(), len = bytes.len(), "snapshot file written");
        Ok(())
    }

    fn remove(&self, key: &str) -> PersistResult<bool> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, key: &str) -> PersistResult<bool> {
        Ok(self.path_for(key)?.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_read_remove_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path()).unwrap();

        assert!(store.read("thicket:comments").unwrap().is_none());
        store.write("thicket:comments", b"{}").unwrap();
        assert!(store.exists("thicket:comments").unwrap());
        assert_eq!(
            store.read("thicket:comments").unwrap().as_deref(),
            Some(&b"{}"[..])
        );
        assert!(store.remove("thicket:comments").unwrap());
        assert!(!store.remove("thicket:comments").unwrap());
    }

    #[test]
    fn keys_map_to_flat_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path()).unwrap();
        let path = store.path_for("thicket:userVotes").unwrap();
        assert_eq!(path, dir.path().join("thicket-userVotes.json"));
    }

    #[test]
    fn rejects_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path()).unwrap();
        for bad in ["", "../etc", "a\\b"] {
            assert!(matches!(
                store.write(bad, b"x"),
                Err(PersistError::InvalidKey(_))
            ));
        }
    }

    #[test]
    fn overwrite_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path()).unwrap();
        store.write("k", b"one").unwrap();
        store.write("k", b"two").unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some(&b"two"[..]));
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn open_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileSnapshotStore::open(&nested).unwrap();
        assert!(store.dir().is_dir());
    }
}
