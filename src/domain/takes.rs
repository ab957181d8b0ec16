//! Acceptance rules for new takes.

use time::OffsetDateTime;

use crate::domain::error::DomainError;

/// Titles must be strictly longer than this many characters.
pub const MIN_TITLE_CHARS: usize = 5;
/// Titles must not exceed this many characters.
pub const MAX_TITLE_CHARS: usize = 140;

/// A validated candidate take, ready for insertion. The store assigns the
/// identifier and fills the empty reaction/report fields.
#[derive(Debug, Clone)]
pub struct NewTake {
    pub title: String,
    pub created_at: OffsetDateTime,
}

impl NewTake {
    pub fn new(title: String, created_at: OffsetDateTime) -> Result<Self, DomainError> {
        validate_title(&title)?;
        Ok(Self { title, created_at })
    }
}

/// Checks run in order and the first failure wins. The messages are part of
/// the public API contract and must not be reworded.
pub fn validate_title(title: &str) -> Result<(), DomainError> {
    let length = title.chars().count();
    if length == 0 {
        return Err(DomainError::validation("Post content is missing"));
    }
    if length <= MIN_TITLE_CHARS {
        return Err(DomainError::validation(
            "Post must be longer than 5 characters",
        ));
    }
    if length > MAX_TITLE_CHARS {
        return Err(DomainError::validation(
            "Post must be less than 140 characters",
        ));
    }
    Ok(())
}
