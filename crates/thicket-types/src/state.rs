use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::CommentId;
use crate::node::CommentNode;

/// The whole comment tree.
///
/// An arena (`by_id`) plus the ordered list of top-level identifiers. The
/// arena is an ordered map so serialized snapshots are byte-stable.
///
/// Invariants, maintained by every reducer transition:
/// 1. Every root id resolves in `by_id` to a node without a parent.
/// 2. Every child id resolves to a node whose parent is the containing node.
/// 3. The parent/child graph is a forest.
/// 4. Every node is reachable from `root_ids`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentsState {
    pub by_id: BTreeMap<CommentId, CommentNode>,
    pub root_ids: Vec<CommentId>,
}

impl CommentsState {
    /// The canonical empty tree.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &CommentId) -> Option<&CommentNode> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &CommentId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Number of comments at any depth.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
