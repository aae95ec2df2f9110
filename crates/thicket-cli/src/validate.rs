pub const MAX_COMMENT_CHARS: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    #[error("comment cannot be empty")]
    Empty,
    #[error("comment cannot exceed {MAX_COMMENT_CHARS} characters (got {0})")]
    TooLong(usize),
}

/// Check comment text and return it trimmed, ready to store.
pub fn validate_comment_text(text: &str) -> Result<&str, TextError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TextError::Empty);
    }
    let len = trimmed.chars().count();
    if len > MAX_COMMENT_CHARS {
        return Err(TextError::TooLong(len));
    }
    Ok(trimmed)
}
