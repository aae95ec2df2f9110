use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use thicket_ledger::VoteLedger;
use thicket_store::IntegrityValidator;
use thicket_types::CommentsState;

use crate::config::StorageKeys;
use crate::error::{PersistError, PersistResult};
use crate::traits::SnapshotStore;

/// Best-effort load/save of the two snapshots.
///
/// This is the failure boundary of the persistence layer: nothing returned
/// from here is an error. A load that fails for any reason yields `None`,
/// and a failed save is logged and dropped, so state transitions never
/// wait on or crash because of the medium.
pub struct SnapshotRepository {
    store: Arc<dyn SnapshotStore>,
    keys: StorageKeys,
}

impl SnapshotRepository {
    pub fn new(store: Arc<dyn SnapshotStore>, keys: StorageKeys) -> Self {
        Self { store, keys }
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Load the comment tree, or `None` if nothing usable is stored.
    pub fn load_comments(&self) -> Option<CommentsState> {
        let key = &self.keys.comments;
        let bytes = self.read_slot(key, "comments")?;
        match decode_comments(key, &bytes) {
            Ok(state) => {
                debug!(
                    total_comments = state.len(),
                    root_comments = state.root_ids.len(),
                    "loaded comments"
                );
                Some(state)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "discarding stored comments");
                None
            }
        }
    }

    /// Load the vote ledger, or `None` if nothing usable is stored.
    pub fn load_votes(&self) -> Option<VoteLedger> {
        let key = &self.keys.user_votes;
        let bytes = self.read_slot(key, "user votes")?;
        match decode_votes(key, &bytes) {
            Ok(votes) => {
                debug!(total_votes = votes.len(), "loaded user votes");
                Some(votes)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "discarding stored user votes");
                None
            }
        }
    }

    /// Write the comment tree. Returns `false` if the write failed.
    pub fn save_comments(&self, state: &CommentsState) -> bool {
        let saved = self.write_slot(&self.keys.comments, state);
        if saved {
            debug!(
                total_comments = state.len(),
                root_comments = state.root_ids.len(),
                "saved comments"
            );
        }
        saved
    }

    /// Write the vote ledger. Returns `false` if the write failed.
    pub fn save_votes(&self, votes: &VoteLedger) -> bool {
        let saved = self.write_slot(&self.keys.user_votes, votes);
        if saved {
            debug!(total_votes = votes.len(), "saved user votes");
        }
        saved
    }

    /// Remove both snapshots from the medium.
    pub fn clear(&self) {
        for key in [&self.keys.comments, &self.keys.user_votes] {
            if let Err(e) = self.store.remove(key) {
                error!(key = %key, error = %e, "failed to clear snapshot");
            }
        }
        debug!("cleared all storage");
    }

    fn read_slot(&self, key: &str, what: &str) -> Option<Vec<u8>> {
        match self.store.read(key) {
            Ok(Some(bytes)) if !bytes.iter().all(u8::is_ascii_whitespace) => Some(bytes),
            Ok(_) => {
                debug!(key, "no {what} found in storage");
                None
            }
            Err(e) => {
                error!(key, error = %e, "failed to read {what}");
                None
            }
        }
    }

    fn write_slot<T: Serialize>(&self, key: &str, value: &T) -> bool {
        let result = serde_json::to_vec(value)
            .map_err(PersistError::from)
            .and_then(|bytes| self.store.write(key, &bytes));
        match result {
            Ok(()) => true,
            Err(e) => {
                error!(key, error = %e, "failed to save snapshot");
                false
            }
        }
    }
}

/// Decode a stored comment tree.
///
/// The value must be an object whose `byId` is a map and whose `rootIds` is
/// an array, it must decode into [`CommentsState`], and the decoded tree
/// must pass the integrity check. Anything less is rejected whole.
pub fn decode_comments(key: &str, bytes: &[u8]) -> PersistResult<CommentsState> {
    let value: Value = serde_json::from_slice(bytes)?;
    let malformed = |reason: &str| PersistError::Malformed {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    let obj = value
        .as_object()
        .ok_or_else(|| malformed("snapshot is not an object"))?;
    if !obj.get("byId").is_some_and(Value::is_object) {
        return Err(malformed("byId is not a map"));
    }
    if !obj.get("rootIds").is_some_and(Value::is_array) {
        return Err(malformed("rootIds is not an array"));
    }

    let state: CommentsState = serde_json::from_value(value)?;
    let report = IntegrityValidator::validate(&state);
    if !report.is_valid() {
        for violation in &report.violations {
            debug!(id = %violation.id, kind = ?violation.kind, "{}", violation.description);
        }
        return Err(PersistError::Integrity {
            key: key.to_string(),
            violations: report.violations.len(),
        });
    }
    Ok(state)
}

/// Decode a stored vote ledger. The value must be an object.
pub fn decode_votes(key: &str, bytes: &[u8]) -> PersistResult<VoteLedger> {
    let value: Value = serde_json::from_slice(bytes)?;
    if !value.is_object() {
        return Err(PersistError::Malformed {
            key: key.to_string(),
            reason: "votes snapshot is not an object".into(),
        });
    }
    Ok(serde_json::from_value(value)?)
}
