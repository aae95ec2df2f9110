//! Per-actor vote ledger for thicket.
//!
//! The comment tree keeps aggregate like/dislike counters that many actors
//! contribute to. This crate records which way the *local* actor voted on
//! each comment, so the next vote can be applied as a toggle or a switch.
//! The two are deliberately independent: clearing or losing the ledger never
//! changes the aggregate counts.

pub mod ledger;

pub use ledger::{UserVotes, VoteLedger};
