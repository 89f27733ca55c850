//! Signup and login forms.

use super::{FormErrors, FormInput, MSG_REQUIRED, NON_FIELD_ERRORS};
use crate::model::user::{is_valid_username, USERNAME_MAX_LEN};
use once_cell::sync::Lazy;
use regex::Regex;

/// Fields never echoed back to the client.
pub const SECRET_FIELDS: &[&str] = &["password", "password1", "password2"];

pub const PASSWORD_MIN_LEN: usize = 8;

pub const MSG_INVALID_USERNAME: &str =
    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";
pub const MSG_DUPLICATE_USERNAME: &str = "A user with that username already exists.";
pub const MSG_INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("valid email regex"));

/// Validated signup submission; `password` is still plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupData {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Validated login submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginData {
    pub username: String,
    pub password: String,
}

/// Validates signup fields. Username uniqueness is checked by the service.
pub fn clean_signup_form(input: &FormInput) -> Result<SignupData, FormErrors> {
    let mut errors = FormErrors::new();

    let username = match input.text("username") {
        Some(value) => {
            let count = value.chars().count();
            if count > USERNAME_MAX_LEN {
                errors.add("username", super::msg_max_length(USERNAME_MAX_LEN, count));
            } else if !is_valid_username(value) {
                errors.add("username", MSG_INVALID_USERNAME);
            }
            value.to_string()
        }
        None => {
            errors.add("username", MSG_REQUIRED);
            String::new()
        }
    };

    let email = match input.text("email") {
        Some(value) if EMAIL_RE.is_match(value) => value.to_string(),
        Some(value) => {
            errors.add("email", "Enter a valid email address.");
            value.to_string()
        }
        None => {
            errors.add("email", MSG_REQUIRED);
            String::new()
        }
    };

    let password1 = input.raw("password1");
    let password2 = input.raw("password2");
    if password1.is_none() {
        errors.add("password1", MSG_REQUIRED);
    }
    if password2.is_none() {
        errors.add("password2", MSG_REQUIRED);
    }

    let password = match (password1, password2) {
        (Some(first), Some(second)) if first != second => {
            errors.add("password2", "The two password fields didn’t match.");
            String::new()
        }
        (Some(first), Some(_)) => {
            for message in password_problems(first, &username) {
                errors.add("password2", message);
            }
            first.to_string()
        }
        _ => String::new(),
    };

    errors.finish(|| SignupData {
        username,
        email,
        password,
    })
}

/// Validates that both login fields are present.
pub fn clean_login_form(input: &FormInput) -> Result<LoginData, FormErrors> {
    let mut errors = FormErrors::new();
    let username = input.text("username").unwrap_or_default().to_string();
    let password = input.raw("password").unwrap_or_default().to_string();
    if username.is_empty() {
        errors.add("username", MSG_REQUIRED);
    }
    if password.is_empty() {
        errors.add("password", MSG_REQUIRED);
    }
    errors.finish(|| LoginData { username, password })
}

/// Error for a failed credential check.
pub fn invalid_login_errors() -> FormErrors {
    FormErrors::single(NON_FIELD_ERRORS, MSG_INVALID_LOGIN)
}

fn password_problems(password: &str, username: &str) -> Vec<String> {
    let mut problems = Vec::new();
    if !username.is_empty() && password.eq_ignore_ascii_case(username) {
        problems.push("The password is too similar to the username.".to_string());
    }
    if password.chars().count() < PASSWORD_MIN_LEN {
        problems.push(format!(
            "This password is too short. It must contain at least {PASSWORD_MIN_LEN} characters."
        ));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_string());
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::{clean_login_form, clean_signup_form};
    use crate::form::FormInput;

    fn signup(pairs: &[(&str, &str)]) -> FormInput {
        pairs.iter().copied().collect()
    }

    #[test]
    fn valid_signup() {
        let data = clean_signup_form(&signup(&[
            ("username", "john"),
            ("email", "john@example.com"),
            ("password1", "correct horse"),
            ("password2", "correct horse"),
        ]))
        .unwrap();
        assert_eq!(data.username, "john");
        assert_eq!(data.password, "correct horse");
    }

    #[test]
    fn mismatched_passwords() {
        let errors = clean_signup_form(&signup(&[
            ("username", "john"),
            ("email", "john@example.com"),
            ("password1", "correct horse"),
            ("password2", "battery staple"),
        ]))
        .unwrap_err();
        assert_eq!(errors.field("password2").len(), 1);
    }

    #[test]
    fn weak_password_reports_every_problem() {
        let errors = clean_signup_form(&signup(&[
            ("username", "john"),
            ("email", "john@example.com"),
            ("password1", "1234"),
            ("password2", "1234"),
        ]))
        .unwrap_err();
        assert_eq!(errors.field("password2").len(), 2);
    }

    #[test]
    fn email_is_required_and_checked() {
        let missing = clean_signup_form(&signup(&[
            ("username", "john"),
            ("password1", "correct horse"),
            ("password2", "correct horse"),
        ]))
        .unwrap_err();
        assert!(missing.has("email"));

        let malformed = clean_signup_form(&signup(&[
            ("username", "john"),
            ("email", "john.example.com"),
            ("password1", "correct horse"),
            ("password2", "correct horse"),
        ]))
        .unwrap_err();
        assert_eq!(malformed.field("email"), ["Enter a valid email address."]);
    }

    #[test]
    fn bad_username_characters() {
        let errors = clean_signup_form(&signup(&[
            ("username", "john doe"),
            ("email", "john@example.com"),
            ("password1", "correct horse"),
            ("password2", "correct horse"),
        ]))
        .unwrap_err();
        assert!(errors.has("username"));
    }

    #[test]
    fn login_requires_both_fields() {
        let errors = clean_login_form(&signup(&[("username", "john")])).unwrap_err();
        assert!(errors.has("password"));
        assert!(!errors.has("username"));
    }
}
