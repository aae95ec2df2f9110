//! Foundation types for thicket.
//!
//! This crate provides the data model shared by every other thicket crate:
//! the comment arena, its nodes, and the small value types they are built
//! from.
//!
//! # Key Types
//!
//! - [`CommentId`] -- Opaque, globally unique comment identifier (UUID v7 when generated)
//! - [`Timestamp`] -- Wall-clock milliseconds since the UNIX epoch
//! - [`CommentNode`] -- One authored comment with its parent/child links and counters
//! - [`CommentsState`] -- The whole tree: `byId` arena plus ordered `rootIds`
//! - [`Vote`] -- Three-valued per-actor vote (`None`, `Like`, `Dislike`)

pub mod error;
pub mod id;
pub mod node;
pub mod state;
pub mod time;
pub mod vote;

pub use error::TypeError;
pub use id::CommentId;
pub use node::CommentNode;
pub use state::CommentsState;
pub use time::Timestamp;
pub use vote::Vote;
