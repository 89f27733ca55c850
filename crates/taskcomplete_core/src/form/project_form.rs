//! Project create/update form.

use super::{optional_text, required_text, FormErrors, FormInput};
use crate::model::project::{ProjectDraft, PROJECT_DESCRIPTION_MAX_LEN, PROJECT_TITLE_MAX_LEN};

/// Validates `title` and `description` into a draft.
pub fn clean_project_form(input: &FormInput) -> Result<ProjectDraft, FormErrors> {
    let mut errors = FormErrors::new();
    let title = required_text(input, &mut errors, "title", PROJECT_TITLE_MAX_LEN);
    let description = optional_text(
        input,
        &mut errors,
        "description",
        Some(PROJECT_DESCRIPTION_MAX_LEN),
    );
    errors.finish(|| ProjectDraft { title, description })
}

#[cfg(test)]
mod tests {
    use super::clean_project_form;
    use crate::form::FormInput;

    #[test]
    fn valid_form() {
        let input: FormInput = [
            ("title", "Portfolio"),
            ("description", "Tasks to complete portfolio website"),
        ]
        .into_iter()
        .collect();
        let draft = clean_project_form(&input).unwrap();
        assert_eq!(draft.title, "Portfolio");
        assert_eq!(
            draft.description.as_deref(),
            Some("Tasks to complete portfolio website")
        );
    }

    #[test]
    fn empty_title_is_invalid() {
        let input: FormInput = [("title", ""), ("description", "x")].into_iter().collect();
        let errors = clean_project_form(&input).unwrap_err();
        assert_eq!(errors.field("title"), ["This field is required."]);
    }

    #[test]
    fn blank_description_becomes_none() {
        let input: FormInput = [("title", "t"), ("description", "  ")].into_iter().collect();
        assert_eq!(clean_project_form(&input).unwrap().description, None);
    }
}
