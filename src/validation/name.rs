use crate::error::{NameIssue, ValidationError};

/// A full name needs at least two whitespace separated words.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::InvalidName(NameIssue::Empty));
    }
    if name.split_whitespace().count() < 2 {
        return Err(ValidationError::InvalidName(NameIssue::SingleWord));
    }
    Ok(())
}
