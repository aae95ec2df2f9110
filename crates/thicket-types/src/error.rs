use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("comment id must not be empty")]
    EmptyId,

    #[error("comment id contains whitespace: {0:?}")]
    WhitespaceInId(String),
}
