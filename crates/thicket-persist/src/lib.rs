//! Snapshot persistence for thicket.
//!
//! Keeps the comment tree and the vote ledger durable across sessions
//! without making any state transition wait on, or fail because of, the
//! storage medium.
//!
//! # Storage Backends
//!
//! All backends implement the [`SnapshotStore`] trait:
//!
//! - [`InMemorySnapshotStore`] -- `HashMap`-based store for tests and embedding
//! - [`FileSnapshotStore`] -- one JSON file per key, atomically replaced
//!
//! # Layers
//!
//! - [`SnapshotRepository`] -- shape-checked, integrity-checked loads and
//!   best-effort saves under the two [`StorageKeys`]
//! - [`DebouncedWriter`] -- coalesces bursts of changes into one write
//!
//! # Design Rules
//!
//! 1. A load either yields a fully trusted snapshot or nothing.
//! 2. Save failures are logged and dropped.
//! 3. Backends propagate every I/O error; only the repository swallows them.
//! 4. A snapshot just loaded from storage is not written back.

pub mod config;
pub mod debounce;
pub mod error;
pub mod file;
pub mod memory;
pub mod repository;
pub mod traits;

pub use config::{PersistConfig, StorageKeys, DEFAULT_DEBOUNCE_MS, DEFAULT_NAMESPACE};
pub use debounce::{DebouncedWriter, SaveFn};
pub use error::{PersistError, PersistResult};
pub use file::FileSnapshotStore;
pub use memory::InMemorySnapshotStore;
pub use repository::{decode_comments, decode_votes, SnapshotRepository};
pub use traits::SnapshotStore;
