use serde::{Deserialize, Serialize};

use crate::id::CommentId;
use crate::time::Timestamp;

/// One authored comment.
///
/// Parent and child links are plain identifiers into the owning
/// [`CommentsState`](crate::CommentsState) arena, never embedded nodes.
/// `text` is untrusted user input and is stored verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    pub id: CommentId,
    /// `None` for a top-level comment. Immutable after creation.
    pub parent_id: Option<CommentId>,
    pub text: String,
    pub created_at: Timestamp,
    /// Set on every edit; absent means the comment was never edited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    /// Replies in insertion order.
    #[serde(default)]
    pub child_ids: Vec<CommentId>,
    /// Absent is read as `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_collapsed: Option<bool>,
    /// Aggregate counters. Signed because a caller passing an inconsistent
    /// previous vote can drive them below zero; they are never clamped.
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub dislikes: i64,
}

impl CommentNode {
    /// A fresh comment with no replies, no votes, and no edit history.
    pub fn new(
        id: CommentId,
        parent_id: Option<CommentId>,
        text: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            parent_id,
            text: text.into(),
            created_at,
            updated_at: None,
            child_ids: Vec::new(),
            is_collapsed: None,
            likes: 0,
            dislikes: 0,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_collapsed(&self) -> bool {
        self.is_collapsed.unwrap_or(false)
    }

    pub fn is_edited(&self) -> bool {
        self.updated_at.is_some()
    }

    pub fn has_replies(&self) -> bool {
        !self.child_ids.is_empty()
    }
}
