//! User and group records owned by the authentication layer.

use super::{check_max_len, check_required, ModelValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type UserId = i64;
pub type GroupId = i64;

/// Maximum username length in characters.
pub const USERNAME_MAX_LEN: usize = 150;
/// Group every self-registered user joins. Seeded by the first migration.
pub const SIGNUP_GROUP: &str = "Task Manager User";

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));

/// Registered account. The password hash never leaves the repository layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    /// Unix epoch seconds.
    pub date_joined: i64,
}

impl Display for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.username)
    }
}

/// Named permission group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

/// Account data ready for insertion; `password_hash` is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl UserDraft {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        check_required("username", &self.username, USERNAME_MAX_LEN)?;
        if !is_valid_username(&self.username) {
            return Err(ModelValidationError::InvalidUsername(self.username.clone()));
        }
        check_max_len("email", &self.email, 254)?;
        check_required("password_hash", &self.password_hash, usize::MAX)
    }
}

/// Returns whether `value` only uses letters, digits and `@ . + - _`.
pub fn is_valid_username(value: &str) -> bool {
    USERNAME_RE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::{is_valid_username, UserDraft};

    #[test]
    fn username_charset() {
        assert!(is_valid_username("john.doe+tasks@home"));
        assert!(is_valid_username("émile_1"));
        assert!(!is_valid_username("john doe"));
        assert!(!is_valid_username("john/doe"));
        assert!(!is_valid_username(""));
    }

    #[test]
    fn draft_requires_hash() {
        let draft = UserDraft {
            username: "john".to_string(),
            email: "john@example.com".to_string(),
            password_hash: String::new(),
        };
        assert!(draft.validate().is_err());
    }
}
