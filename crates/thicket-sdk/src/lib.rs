//! High-level SDK for thicket.
//!
//! [`CommentBoard`] is the main entry point for applications embedding
//! thicket. It is constructed explicitly, hydrated from a
//! [`SnapshotStore`], and flushed on [`close`](CommentBoard::close); there is
//! no ambient global store.

pub mod board;
pub mod error;

pub use board::CommentBoard;
pub use error::{BoardError, BoardResult};

// Re-export key types
pub use thicket_ledger::VoteLedger;
pub use thicket_persist::{
    FileSnapshotStore, InMemorySnapshotStore, PersistConfig, SnapshotStore, StorageKeys,
};
pub use thicket_store::{
    collect_subtree_ids, selectors, Clock, ManualClock, SystemClock, ThreadWalk,
};
pub use thicket_types::{CommentId, CommentNode, CommentsState, Timestamp, Vote};
