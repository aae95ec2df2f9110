/// Errors from snapshot persistence.
///
/// These never escape [`SnapshotRepository`](crate::SnapshotRepository):
/// loads degrade to "absent" and saves are logged and dropped. Backends
/// themselves propagate every failure.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// I/O error from the underlying storage medium.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored bytes are not valid JSON or do not decode to the
    /// expected type.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The stored value parsed but has the wrong shape.
    #[error("malformed snapshot under {key}: {reason}")]
    Malformed { key: String, reason: String },

    /// The stored tree decoded but breaks the forest invariants.
    #[error("snapshot under {key} failed integrity check: {violations} violation(s)")]
    Integrity { key: String, violations: usize },

    /// The key cannot be mapped onto the storage medium.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// The storage medium refuses writes (full, read-only, or disabled).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for persistence operations.
pub type PersistResult<T> = Result<T, PersistError>;
