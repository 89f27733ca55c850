//! Domain model for users, projects, tasks and tags.
//!
//! # Responsibility
//! - Define the records shared by repositories, forms and services.
//! - Own field-level constraints (`validate()`) mirrored by the form layer.
//!
//! # Invariants
//! - A task's effective owner is the owner of its project.
//! - Ids are assigned by storage; drafts carry no id.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod project;
pub mod tag;
pub mod task;
pub mod user;

/// Field-level constraint violation on a model draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Required text field is empty after trimming.
    Required(&'static str),
    /// Text field exceeds its maximum length in characters.
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
    /// Priority value outside LOW/MEDIUM/HIGH.
    InvalidPriority(i64),
    /// Username contains characters outside `[A-Za-z0-9_@.+-]`.
    InvalidUsername(String),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required(field) => write!(f, "`{field}` is required"),
            Self::TooLong { field, max, actual } => write!(
                f,
                "`{field}` has {actual} characters; at most {max} allowed"
            ),
            Self::InvalidPriority(value) => write!(f, "invalid priority value: {value}"),
            Self::InvalidUsername(value) => write!(f, "invalid username: `{value}`"),
        }
    }
}

impl Error for ModelValidationError {}

pub(crate) fn check_required(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ModelValidationError> {
    if value.trim().is_empty() {
        return Err(ModelValidationError::Required(field));
    }
    check_max_len(field, value, max)
}

pub(crate) fn check_max_len(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ModelValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ModelValidationError::TooLong { field, max, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{check_max_len, check_required, ModelValidationError};

    #[test]
    fn required_rejects_whitespace_only() {
        assert_eq!(
            check_required("title", "   ", 10),
            Err(ModelValidationError::Required("title"))
        );
    }

    #[test]
    fn max_len_counts_characters_not_bytes() {
        assert!(check_max_len("name", "ééééé", 5).is_ok());
        assert!(matches!(
            check_max_len("name", "éééééé", 5),
            Err(ModelValidationError::TooLong { actual: 6, .. })
        ));
    }
}
