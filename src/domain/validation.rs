//! Input validation shared by the HTTP and CLI front ends.

use std::fmt;

/// Maximum length of a note, task or record name.
pub const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// Numeric field outside its accepted range
    OutOfRange {
        field: &'static str,
        min: i64,
        max: Option<i64>,
        value: i64,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::OutOfRange {
                field,
                min,
                max: Some(max),
                value,
            } => write!(f, "{} must be between {} and {}, got {}", field, min, max, value),
            Self::OutOfRange {
                field,
                min,
                max: None,
                value,
            } => write!(f, "{} must be at least {}, got {}", field, min, value),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check a name field: non-empty and at most [`MAX_NAME_LEN`] characters.
pub fn validate_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}
