use std::collections::HashSet;

use thicket_types::{CommentId, CommentsState};

/// Result of checking a snapshot against the forest invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntegrityReport {
    pub comment_count: usize,
    pub reachable_count: usize,
    pub violations: Vec<Violation>,
}

impl IntegrityReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific integrity violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub id: CommentId,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    /// Arena key differs from the node's own `id`.
    KeyMismatch,
    DuplicateRoot,
    DanglingRoot,
    RootHasParent,
    DanglingChild,
    /// A child's `parent_id` does not name the node listing it.
    ParentMismatch,
    /// A node is reached twice: shared child or cycle.
    MultipleParents,
    /// A node not reachable from any root.
    Orphan,
}

/// Forest invariant checker.
pub struct IntegrityValidator;

impl IntegrityValidator {
    /// Validate every invariant of a [`CommentsState`].
    pub fn validate(state: &CommentsState) -> IntegrityReport {
        let mut violations = Vec::new();
        let mut report = |id: &CommentId, kind: ViolationKind, description: String| {
            violations.push(Violation {
                id: id.clone(),
                kind,
                description,
            });
        };

        for (key, node) in &state.by_id {
            if key != &node.id {
                report(
                    key,
                    ViolationKind::KeyMismatch,
                    format!("stored under {key} but node id is {}", node.id),
                );
            }
        }

        let mut reached: HashSet<&CommentId> = HashSet::new();
        let mut seen_roots: HashSet<&CommentId> = HashSet::new();
        let mut stack: Vec<&CommentId> = Vec::new();

        for root in &state.root_ids {
            if !seen_roots.insert(root) {
                report(
                    root,
                    ViolationKind::DuplicateRoot,
                    "listed more than once in rootIds".into(),
                );
                continue;
            }
            match state.get(root) {
                None => report(
                    root,
                    ViolationKind::DanglingRoot,
                    "root id has no node".into(),
                ),
                Some(node) => {
                    if let Some(parent) = &node.parent_id {
                        report(
                            root,
                            ViolationKind::RootHasParent,
                            format!("root names parent {parent}"),
                        );
                    }
                    if reached.insert(root) {
                        stack.push(root);
                    }
                }
            }
        }

        while let Some(id) = stack.pop() {
            let Some(node) = state.get(id) else {
                continue;
            };
            for child in &node.child_ids {
                let Some(child_node) = state.get(child) else {
                    report(
                        child,
                        ViolationKind::DanglingChild,
                        format!("listed under {id} but has no node"),
                    );
                    continue;
                };
                if child_node.parent_id.as_ref() != Some(id) {
                    report(
                        child,
                        ViolationKind::ParentMismatch,
                        format!(
                            "listed under {id} but parentId is {:?}",
                            child_node.parent_id.as_ref().map(CommentId::as_str)
                        ),
                    );
                }
                if !reached.insert(child) {
                    report(
                        child,
                        ViolationKind::MultipleParents,
                        format!("reached again via {id}"),
                    );
                    continue;
                }
                stack.push(child);
            }
        }

        for id in state.by_id.keys() {
            if !reached.contains(id) {
                report(
                    id,
                    ViolationKind::Orphan,
                    "not reachable from any root".into(),
                );
            }
        }

        IntegrityReport {
            comment_count: state.len(),
            reachable_count: reached.len(),
            violations,
        }
    }
}
