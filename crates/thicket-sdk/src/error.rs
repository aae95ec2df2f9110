use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("no comment matches {0:?}")]
    NotFound(String),

    #[error("{prefix:?} is ambiguous: matches {matches} comments")]
    Ambiguous { prefix: String, matches: usize },

    #[error("storage error: {0}")]
    Persist(#[from] thicket_persist::PersistError),
}

pub type BoardResult<T> = Result<T, BoardError>;
