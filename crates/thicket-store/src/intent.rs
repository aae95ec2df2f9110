use std::sync::Arc;

use thicket_types::{CommentId, CommentsState, Vote};

/// A requested state transition, as issued by presentation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Create a comment; `parent: None` makes it top-level.
    Add {
        parent: Option<CommentId>,
        text: String,
    },
    Edit {
        id: CommentId,
        text: String,
    },
    /// Remove the comment and its whole subtree.
    Delete { id: CommentId },
    ToggleCollapse { id: CommentId },
    /// `previous` is the actor's prior vote according to the vote ledger.
    Like { id: CommentId, previous: Vote },
    Dislike { id: CommentId, previous: Vote },
    ClearAll,
}

impl Intent {
    /// Short, stable name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Edit { .. } => "edit",
            Self::Delete { .. } => "delete",
            Self::ToggleCollapse { .. } => "toggle_collapse",
            Self::Like { .. } => "like",
            Self::Dislike { .. } => "dislike",
            Self::ClearAll => "clear_all",
        }
    }

    /// The comment this intent targets, if any.
    pub fn target(&self) -> Option<&CommentId> {
        match self {
            Self::Add { parent, .. } => parent.as_ref(),
            Self::Edit { id, .. }
            | Self::Delete { id }
            | Self::ToggleCollapse { id }
            | Self::Like { id, .. }
            | Self::Dislike { id, .. } => Some(id),
            Self::ClearAll => None,
        }
    }
}

/// Result of [`Reducer::apply`](crate::Reducer::apply).
#[derive(Clone, Debug)]
pub struct Outcome {
    pub state: Arc<CommentsState>,
    /// The new comment's id for a successful `Add`, otherwise `None`.
    pub created: Option<CommentId>,
}

impl Outcome {
    /// `false` when the transition was a no-op and `state` is the input `Arc`.
    pub fn changed_from(&self, before: &Arc<CommentsState>) -> bool {
        !Arc::ptr_eq(&self.state, before)
    }
}
