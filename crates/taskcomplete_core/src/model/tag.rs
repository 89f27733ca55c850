//! Legacy tag record (many-to-many with tasks, no ownership).

use super::{check_required, ModelValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

pub type TagId = i64;

pub const TAG_NAME_MAX_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Checks one already-normalized tag name.
pub fn validate_tag_name(name: &str) -> Result<(), ModelValidationError> {
    check_required("name", name, TAG_NAME_MAX_LEN)
}

/// Trims and lower-cases one tag; blank input yields `None`.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes, drops blanks and deduplicates; output is sorted.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .filter_map(|tag| normalize_tag(tag))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize_tags, validate_tag_name};

    #[test]
    fn normalize_dedupes_case_insensitively() {
        let tags = vec![
            " Design ".to_string(),
            "design".to_string(),
            "".to_string(),
            "Backend".to_string(),
        ];
        assert_eq!(normalize_tags(&tags), vec!["backend", "design"]);
    }

    #[test]
    fn tag_name_is_bounded() {
        assert!(validate_tag_name("design").is_ok());
        assert!(validate_tag_name(&"x".repeat(21)).is_err());
    }
}
