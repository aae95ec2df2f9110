//! Read-only views over a [`CommentsState`] snapshot.
//!
//! Each selector costs time proportional to the slice it returns: roots walk
//! only `root_ids`, children walk only one node's `child_ids`, and counts are
//! O(1). Identifiers that do not resolve are skipped rather than reported.

use thicket_types::{CommentId, CommentNode, CommentsState};

pub fn comment<'a>(state: &'a CommentsState, id: &CommentId) -> Option<&'a CommentNode> {
    state.get(id)
}

/// Top-level comments in insertion order.
pub fn root_comments(state: &CommentsState) -> impl Iterator<Item = &CommentNode> + '_ {
    state.root_ids.iter().filter_map(|id| state.get(id))
}

/// Direct replies of `parent` in insertion order; empty if `parent` is
/// unknown.
pub fn child_comments<'a>(
    state: &'a CommentsState,
    parent: &CommentId,
) -> impl Iterator<Item = &'a CommentNode> + 'a {
    state
        .get(parent)
        .into_iter()
        .flat_map(|node| node.child_ids.iter())
        .filter_map(|id| state.get(id))
}

/// Number of comments at any depth.
pub fn total_count(state: &CommentsState) -> usize {
    state.by_id.len()
}

pub fn has_comments(state: &CommentsState) -> bool {
    !state.root_ids.is_empty()
}

/// Number of direct replies; `0` if `id` is unknown.
pub fn reply_count(state: &CommentsState, id: &CommentId) -> usize {
    state.get(id).map_or(0, |node| node.child_ids.len())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::clock::ManualClock;
    use crate::reducer::Reducer;

    fn texts<'a>(nodes: impl Iterator<Item = &'a CommentNode>) -> Vec<&'a str> {
        nodes.map(|n| n.text.as_str()).collect()
    }

    #[test]
    fn selectors_follow_insertion_order() {
        let r = Reducer::with_clock(ManualClock::default());
        let s = Arc::new(CommentsState::empty());
        let (s, a) = r.add_comment(&s, None, "first");
        let a = a.unwrap();
        let (s, _) = r.add_comment(&s, None, "second");
        let (s, _) = r.add_comment(&s, Some(&a), "reply-1");
        let (s, _) = r.add_comment(&s, Some(&a), "reply-2");

        assert_eq!(texts(root_comments(&s)), ["first", "second"]);
        assert_eq!(texts(child_comments(&s, &a)), ["reply-1", "reply-2"]);
        assert_eq!(total_count(&s), 4);
        assert_eq!(reply_count(&s, &a), 2);
        assert!(has_comments(&s));
        assert_eq!(comment(&s, &a).map(|n| n.text.as_str()), Some("first"));
    }

    #[test]
    fn unknown_parent_has_no_children() {
        let s = CommentsState::empty();
        let ghost = CommentId::from("ghost");
        assert_eq!(child_comments(&s, &ghost).count(), 0);
        assert_eq!(reply_count(&s, &ghost), 0);
        assert!(comment(&s, &ghost).is_none());
    }

    #[test]
    fn empty_state_has_no_comments() {
        let s = CommentsState::empty();
        assert!(!has_comments(&s));
        assert_eq!(total_count(&s), 0);
        assert_eq!(root_comments(&s).count(), 0);
    }

    #[test]
    fn dangling_ids_are_skipped() {
        let mut s = CommentsState::empty();
        s.root_ids.push(CommentId::from("dangling"));
        assert_eq!(root_comments(&s).count(), 0);
    }
}
