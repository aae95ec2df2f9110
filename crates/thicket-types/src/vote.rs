use std::fmt;

use serde::{Deserialize, Serialize};

/// One actor's vote on a comment.
///
/// `None` is a real value in memory so the like/dislike transition table is
/// exhaustive, but the vote ledger never stores it: an absent entry already
/// means "no vote".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    #[default]
    None,
    Like,
    Dislike,
}

impl Vote {
    /// Returns `true` for `Like` and `Dislike`.
    pub fn is_cast(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// The actor's vote after pressing "like": a second like retracts it.
    pub fn after_like(self) -> Self {
        match self {
            Self::Like => Self::None,
            Self::None | Self::Dislike => Self::Like,
        }
    }

    /// The actor's vote after pressing "dislike": a second dislike retracts it.
    pub fn after_dislike(self) -> Self {
        match self {
            Self::Dislike => Self::None,
            Self::None | Self::Like => Self::Dislike,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Like => "like",
            Self::Dislike => "dislike",
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
