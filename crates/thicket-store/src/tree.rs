//! Traversal helpers over the comment arena.

use std::collections::HashSet;

use thicket_types::{CommentId, CommentNode, CommentsState};

/// Collect `id` and every descendant reachable through `child_ids`, in
/// pre-order (parent before its replies, replies in insertion order).
///
/// Returns an empty vector when `id` is not in the arena. Iterative, so
/// thread depth is bounded by memory rather than the call stack. A node is
/// never emitted twice even if a corrupt snapshot links it from two parents.
pub fn collect_subtree_ids(state: &CommentsState, id: &CommentId) -> Vec<CommentId> {
    if !state.contains(id) {
        return Vec::new();
    }

    let mut ids = Vec::new();
    let mut seen = HashSet::new();
    let mut stack = vec![id];

    while let Some(current) = stack.pop() {
        if !seen.insert(current) {
            continue;
        }
        ids.push(current.clone());
        if let Some(node) = state.get(current) {
            // Reverse so the first reply is popped first.
            stack.extend(node.child_ids.iter().rev());
        }
    }

    ids
}

/// Number of ancestors above `id` (0 for a top-level comment).
///
/// `None` if `id` is unknown or its parent chain is broken.
pub fn depth_of(state: &CommentsState, id: &CommentId) -> Option<usize> {
    let mut node = state.get(id)?;
    let mut depth = 0;
    while let Some(parent) = &node.parent_id {
        node = state.get(parent)?;
        depth += 1;
        if depth > state.len() {
            return None;
        }
    }
    Some(depth)
}

/// Pre-order walk over the tree yielding `(depth, node)`.
///
/// By default the walk does not descend into collapsed comments (the
/// collapsed comment itself is still yielded), which is exactly what a
/// renderer needs. Dangling identifiers are skipped.
pub struct ThreadWalk<'a> {
    state: &'a CommentsState,
    stack: Vec<(usize, &'a CommentId)>,
    expand_collapsed: bool,
}

impl<'a> ThreadWalk<'a> {
    /// Walk the visible thread, honoring collapse.
    pub fn visible(state: &'a CommentsState) -> Self {
        Self::from_roots(state, false)
    }

    /// Walk every comment regardless of collapse.
    pub fn all(state: &'a CommentsState) -> Self {
        Self::from_roots(state, true)
    }

    /// Walk the subtree rooted at `id` (depth 0 is `id` itself), honoring
    /// collapse below it.
    pub fn subtree(state: &'a CommentsState, id: &'a CommentId) -> Self {
        Self {
            state,
            stack: vec![(0, id)],
            expand_collapsed: false,
        }
    }

    /// Descend into collapsed comments too.
    pub fn expand_collapsed(mut self) -> Self {
        self.expand_collapsed = true;
        self
    }

    fn from_roots(state: &'a CommentsState, expand_collapsed: bool) -> Self {
        Self {
            state,
            stack: state.root_ids.iter().rev().map(|id| (0, id)).collect(),
            expand_collapsed,
        }
    }
}

impl<'a> Iterator for ThreadWalk<'a> {
    type Item = (usize, &'a CommentNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((depth, id)) = self.stack.pop() {
            let Some(node) = self.state.get(id) else {
                continue;
            };
            if self.expand_collapsed || !node.is_collapsed() {
                self.stack
                    .extend(node.child_ids.iter().rev().map(|child| (depth + 1, child)));
            }
            return Some((depth, node));
        }
        None
    }
}
