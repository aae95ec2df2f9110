use std::sync::Arc;

use tracing::debug;

use thicket_types::{CommentId, CommentNode, CommentsState, Vote};

use crate::clock::{Clock, SystemClock};
use crate::intent::{Intent, Outcome};
use crate::tree::collect_subtree_ids;

/// Which button the actor pressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Ballot {
    Like,
    Dislike,
}

/// Pure state transitions over the comment tree.
///
/// Each method takes the current snapshot by `&Arc` and returns the next
/// snapshot. Inputs are never mutated. When the target does not exist the
/// input `Arc` itself is returned, so `Arc::ptr_eq(&before, &after)` is the
/// cheap "nothing changed" test.
///
/// The clock is the only source of impurity and is injectable for tests.
#[derive(Debug, Default)]
pub struct Reducer<C: Clock = SystemClock> {
    clock: C,
}

impl Reducer<SystemClock> {
    pub fn new() -> Self {
        Self {
            clock: SystemClock::new(),
        }
    }
}

impl<C: Clock> Reducer<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Dispatch an [`Intent`] to the matching transition.
    pub fn apply(&self, state: &Arc<CommentsState>, intent: Intent) -> Outcome {
        let name = intent.name();
        let target = intent.target().cloned();
        let outcome = match intent {
            Intent::Add { parent, text } => {
                let (state, created) = self.add_comment(state, parent.as_ref(), text);
                return Outcome { state, created };
            }
            Intent::Edit { id, text } => self.edit_comment(state, &id, text),
            Intent::Delete { id } => self.delete_comment(state, &id),
            Intent::ToggleCollapse { id } => self.toggle_collapse(state, &id),
            Intent::Like { id, previous } => self.like_comment(state, &id, previous),
            Intent::Dislike { id, previous } => self.dislike_comment(state, &id, previous),
            Intent::ClearAll => self.clear_all(),
        };
        debug!(
            intent = name,
            target = ?target,
            changed = !Arc::ptr_eq(&outcome, state),
            "intent applied"
        );
        Outcome {
            state: outcome,
            created: None,
        }
    }

    /// Create a comment at the end of `parent`'s replies, or at the end of
    /// the top-level list when `parent` is `None`.
    ///
    /// If `parent` names a comment that no longer exists the whole operation
    /// is a no-op: the input snapshot is returned and no id is allocated.
    pub fn add_comment(
        &self,
        state: &Arc<CommentsState>,
        parent: Option<&CommentId>,
        text: impl Into<String>,
    ) -> (Arc<CommentsState>, Option<CommentId>) {
        if let Some(parent_id) = parent {
            if !state.contains(parent_id) {
                debug!(parent = %parent_id, "add ignored: parent not found");
                return (Arc::clone(state), None);
            }
        }

        let id = CommentId::generate();
        let node = CommentNode::new(id.clone(), parent.cloned(), text, self.clock.now());

        let mut next = CommentsState::clone(state);
        next.by_id.insert(id.clone(), node);
        match parent {
            None => next.root_ids.push(id.clone()),
            Some(parent_id) => {
                if let Some(parent_node) = next.by_id.get_mut(parent_id) {
                    parent_node.child_ids.push(id.clone());
                }
            }
        }

        debug!(id = %id, parent = ?parent, "comment added");
        (Arc::new(next), Some(id))
    }

    /// Replace a comment's text and stamp `updated_at`. Replies, counters
    /// and collapse state are untouched.
    pub fn edit_comment(
        &self,
        state: &Arc<CommentsState>,
        id: &CommentId,
        text: impl Into<String>,
    ) -> Arc<CommentsState> {
        let now = self.clock.now();
        self.update_node(state, id, "edit", |node| {
            node.text = text.into();
            node.updated_at = Some(now);
        })
    }

    /// Remove a comment and its entire subtree in one snapshot, and unlink
    /// it from its parent (or from the top-level list).
    pub fn delete_comment(&self, state: &Arc<CommentsState>, id: &CommentId) -> Arc<CommentsState> {
        let Some(node) = state.get(id) else {
            debug!(id = %id, "delete ignored: comment not found");
            return Arc::clone(state);
        };

        let doomed = collect_subtree_ids(state, id);
        let mut next = CommentsState::clone(state);
        for doomed_id in &doomed {
            next.by_id.remove(doomed_id);
        }

        match &node.parent_id {
            None => next.root_ids.retain(|root| root != id),
            Some(parent_id) => {
                if let Some(parent) = next.by_id.get_mut(parent_id) {
                    parent.child_ids.retain(|child| child != id);
                }
            }
        }

        debug!(id = %id, removed = doomed.len(), "comment subtree deleted");
        Arc::new(next)
    }

    /// Flip `is_collapsed`; an absent flag counts as `false`.
    pub fn toggle_collapse(&self, state: &Arc<CommentsState>, id: &CommentId) -> Arc<CommentsState> {
        self.update_node(state, id, "toggle_collapse", |node| {
            node.is_collapsed = Some(!node.is_collapsed());
        })
    }

    /// Apply a like given the actor's `previous` vote:
    ///
    /// | previous | effect |
    /// |---|---|
    /// | `Like` | likes - 1 (retract) |
    /// | `Dislike` | likes + 1, dislikes - 1 (switch) |
    /// | `None` | likes + 1 |
    pub fn like_comment(
        &self,
        state: &Arc<CommentsState>,
        id: &CommentId,
        previous: Vote,
    ) -> Arc<CommentsState> {
        self.update_node(state, id, "like", |node| {
            tally(node, Ballot::Like, previous);
        })
    }

    /// Mirror image of [`like_comment`](Self::like_comment).
    pub fn dislike_comment(
        &self,
        state: &Arc<CommentsState>,
        id: &CommentId,
        previous: Vote,
    ) -> Arc<CommentsState> {
        self.update_node(state, id, "dislike", |node| {
            tally(node, Ballot::Dislike, previous);
        })
    }

    /// The canonical empty tree, unconditionally.
    pub fn clear_all(&self) -> Arc<CommentsState> {
        debug!("all comments cleared");
        Arc::new(CommentsState::empty())
    }

    fn update_node(
        &self,
        state: &Arc<CommentsState>,
        id: &CommentId,
        op: &'static str,
        mutate: impl FnOnce(&mut CommentNode),
    ) -> Arc<CommentsState> {
        if !state.contains(id) {
            debug!(id = %id, op, "ignored: comment not found");
            return Arc::clone(state);
        }

        let mut next = CommentsState::clone(state);
        if let Some(node) = next.by_id.get_mut(id) {
            mutate(node);
        }
        Arc::new(next)
    }
}

/// Counters are not clamped at zero: a wrong `previous` shows up as drift
/// (possibly negative counts) instead of being hidden. They saturate at the
/// `i64` bounds since stored values are untrusted.
fn tally(node: &mut CommentNode, ballot: Ballot, previous: Vote) {
    let (pressed, other) = match ballot {
        Ballot::Like => (&mut node.likes, &mut node.dislikes),
        Ballot::Dislike => (&mut node.dislikes, &mut node.likes),
    };
    let same = match ballot {
        Ballot::Like => Vote::Like,
        Ballot::Dislike => Vote::Dislike,
    };

    if previous == same {
        *pressed = pressed.saturating_sub(1);
    } else if previous == Vote::None {
        *pressed = pressed.saturating_add(1);
    } else {
        *pressed = pressed.saturating_add(1);
        *other = other.saturating_sub(1);
    }
}
