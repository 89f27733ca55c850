//! Form validation layer.
//!
//! # Responsibility
//! - Turn urlencoded submissions into validated model drafts.
//! - Collect every field error at once, keyed by field name.
//!
//! # Invariants
//! - Messages are user-facing and stable; callers render them verbatim.
//! - Non-field errors are stored under [`NON_FIELD_ERRORS`].

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod account_form;
pub mod project_form;
pub mod task_form;

pub const NON_FIELD_ERRORS: &str = "__all__";

pub(crate) const MSG_REQUIRED: &str = "This field is required.";
pub(crate) const MSG_INVALID_DATE: &str = "Enter a valid date.";
pub(crate) const MSG_INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

pub(crate) fn msg_max_length(max: usize, actual: usize) -> String {
    format!("Ensure this value has at most {max} characters (it has {actual}).")
}

/// Raw submitted form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormInput(HashMap<String, String>);

impl FormInput {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self(fields)
    }

    /// Trimmed value; blank or missing fields yield `None`.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Untrimmed value, used for passwords.
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Checkbox semantics: present with `on|true|1|yes`.
    pub fn checked(&self, name: &str) -> bool {
        matches!(
            self.text(name).map(str::to_ascii_lowercase).as_deref(),
            Some("on" | "true" | "1" | "yes")
        )
    }

    /// Copy without the named fields, for echoing a submission back.
    pub fn without(&self, names: &[&str]) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(key, _)| !names.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormInput {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Field name → messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, name: &str) -> &[String] {
        self.0.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// `Ok(value)` when no errors were collected.
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl Display for FormErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let fields = self.0.keys().map(String::as_str).collect::<Vec<_>>();
        write!(f, "invalid form fields: {}", fields.join(","))
    }
}

impl Error for FormErrors {}

/// Required text field with a maximum length.
pub(crate) fn required_text(
    input: &FormInput,
    errors: &mut FormErrors,
    field: &str,
    max: usize,
) -> String {
    match input.text(field) {
        Some(value) => {
            check_length(errors, field, value, max);
            value.to_string()
        }
        None => {
            errors.add(field, MSG_REQUIRED);
            String::new()
        }
    }
}

/// Optional text field with a maximum length; blank becomes `None`.
pub(crate) fn optional_text(
    input: &FormInput,
    errors: &mut FormErrors,
    field: &str,
    max: Option<usize>,
) -> Option<String> {
    let value = input.text(field)?;
    if let Some(max) = max {
        check_length(errors, field, value, max);
    }
    Some(value.to_string())
}

fn check_length(errors: &mut FormErrors, field: &str, value: &str, max: usize) {
    let actual = value.chars().count();
    if actual > max {
        errors.add(field, msg_max_length(max, actual));
    }
}

#[cfg(test)]
mod tests {
    use super::{FormErrors, FormInput};

    #[test]
    fn text_trims_and_drops_blank() {
        let input: FormInput = [("title", "  Portfolio "), ("note", "   ")]
            .into_iter()
            .collect();
        assert_eq!(input.text("title"), Some("Portfolio"));
        assert_eq!(input.text("note"), None);
        assert_eq!(input.text("missing"), None);
    }

    #[test]
    fn checkbox_values() {
        let input: FormInput = [("a", "on"), ("b", "TRUE"), ("c", "off")]
            .into_iter()
            .collect();
        assert!(input.checked("a"));
        assert!(input.checked("b"));
        assert!(!input.checked("c"));
        assert!(!input.checked("d"));
    }

    #[test]
    fn errors_accumulate_per_field() {
        let mut errors = FormErrors::new();
        errors.add("password2", "one");
        errors.add("password2", "two");
        assert_eq!(errors.field("password2").len(), 2);
        assert!(errors.field("title").is_empty());
        assert!(errors.finish(|| ()).is_err());
    }
}
