//! Comment tree store for thicket.
//!
//! This crate owns the canonical state transitions over a
//! [`CommentsState`](thicket_types::CommentsState) snapshot. Every transition
//! consumes an `Arc` snapshot and returns a new one; a transition that has
//! nothing to do hands back the *same* `Arc`, so callers detect "nothing
//! changed" with [`Arc::ptr_eq`](std::sync::Arc::ptr_eq).
//!
//! # Components
//!
//! - [`Reducer`] -- add / edit / cascade delete / collapse / vote / clear
//! - [`Intent`] -- the transitions as data, dispatched by [`Reducer::apply`]
//! - [`selectors`] -- read views proportional to the requested slice
//! - [`tree`] -- subtree collection and visible-thread traversal
//! - [`IntegrityValidator`] -- checks the four forest invariants
//!
//! # Design Rules
//!
//! 1. Unknown targets are silent no-ops, never errors.
//! 2. Input snapshots are never mutated.
//! 3. Comment text is stored verbatim; validation and sanitization belong to
//!    presentation.
//! 4. Vote counters follow the caller-supplied previous vote and are not
//!    clamped.

pub mod clock;
pub mod intent;
pub mod reducer;
pub mod selectors;
pub mod tree;
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use intent::{Intent, Outcome};
pub use reducer::Reducer;
pub use tree::{collect_subtree_ids, depth_of, ThreadWalk};
pub use validation::{IntegrityReport, IntegrityValidator, Violation, ViolationKind};
