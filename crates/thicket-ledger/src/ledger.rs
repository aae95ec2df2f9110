use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use thicket_types::{CommentId, CommentsState, Vote};

/// Serialized form of the ledger: `{ "<id>": "like" | "dislike" }`.
pub type UserVotes = BTreeMap<CommentId, Vote>;

/// The local actor's vote on each comment.
///
/// Only cast votes are stored; "no vote" is the absence of an entry. When
/// reading a persisted blob, `null` and `"none"` values are dropped so the
/// map stays minimal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<CommentId, Option<Vote>>",
    into = "UserVotes"
)]
pub struct VoteLedger {
    votes: UserVotes,
}

impl VoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The actor's current vote; `Vote::None` when there is no entry.
    pub fn get_vote(&self, id: &CommentId) -> Vote {
        self.votes.get(id).copied().unwrap_or_default()
    }

    /// Record a vote. `Vote::None` removes the entry. Returns the previous
    /// vote.
    ///
    /// This does not touch the aggregate counters; pair it with the matching
    /// reducer transition, passing the value returned by
    /// [`get_vote`](Self::get_vote) beforehand as the previous vote.
    pub fn set_vote(&mut self, id: &CommentId, vote: Vote) -> Vote {
        let previous = if vote.is_cast() {
            self.votes.insert(id.clone(), vote)
        } else {
            self.votes.remove(id)
        };
        previous.unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CommentId, Vote)> + '_ {
        self.votes.iter().map(|(id, vote)| (id, *vote))
    }

    pub fn clear(&mut self) {
        self.votes.clear();
    }

    /// Drop entries for comments that no longer exist in `state`. Returns
    /// how many entries were removed.
    pub fn retain_known(&mut self, state: &CommentsState) -> usize {
        let before = self.votes.len();
        self.votes.retain(|id, _| state.contains(id));
        let removed = before - self.votes.len();
        if removed > 0 {
            debug!(removed, "pruned votes for deleted comments");
        }
        removed
    }
}

impl From<BTreeMap<CommentId, Option<Vote>>> for VoteLedger {
    fn from(raw: BTreeMap<CommentId, Option<Vote>>) -> Self {
        let votes = raw
            .into_iter()
            .filter_map(|(id, vote)| vote.filter(Vote::is_cast).map(|v| (id, v)))
            .collect();
        Self { votes }
    }
}

impl From<VoteLedger> for UserVotes {
    fn from(ledger: VoteLedger) -> Self {
        ledger.votes
    }
}

impl FromIterator<(CommentId, Vote)> for VoteLedger {
    fn from_iter<I: IntoIterator<Item = (CommentId, Vote)>>(iter: I) -> Self {
        let mut ledger = Self::new();
        for (id, vote) in iter {
            ledger.set_vote(&id, vote);
        }
        ledger
    }
}
