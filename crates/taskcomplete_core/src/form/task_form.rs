//! Task create/update form.
//!
//! The `project` choice is restricted to the requesting user's projects. When
//! the submission names no project, the caller-provided default (the session's
//! current project) is used.

use super::{
    optional_text, required_text, FormErrors, FormInput, MSG_INVALID_CHOICE, MSG_INVALID_DATE,
    MSG_REQUIRED,
};
use crate::model::project::ProjectId;
use crate::model::task::{Priority, TaskDraft, TASK_TITLE_MAX_LEN};
use crate::repo::task_repo::parse_due_date;

/// Field label shown for the `complete` checkbox.
pub const COMPLETE_LABEL: &str = "Task Completed?";

/// Validates a task submission.
///
/// - `choices`: ids of projects the user may assign.
/// - `default_project`: used when `project` is absent; ignored unless it is
///   one of `choices`.
pub fn clean_task_form(
    input: &FormInput,
    choices: &[ProjectId],
    default_project: Option<ProjectId>,
) -> Result<TaskDraft, FormErrors> {
    let mut errors = FormErrors::new();

    let title = required_text(input, &mut errors, "title", TASK_TITLE_MAX_LEN);

    let project_id = match input.text("project") {
        Some(raw) => match raw.parse::<ProjectId>() {
            Ok(id) if choices.contains(&id) => Some(id),
            _ => {
                errors.add("project", MSG_INVALID_CHOICE);
                None
            }
        },
        None => match default_project.filter(|id| choices.contains(id)) {
            Some(id) => Some(id),
            None => {
                errors.add("project", MSG_REQUIRED);
                None
            }
        },
    };

    let priority = match input.text("priority") {
        Some(raw) => match raw.parse::<i64>().ok().map(Priority::from_value) {
            Some(Ok(priority)) => priority,
            _ => {
                errors.add(
                    "priority",
                    format!("Select a valid choice. {raw} is not one of the available choices."),
                );
                Priority::default()
            }
        },
        None => Priority::default(),
    };

    let due_date = match input.text("due_date") {
        Some(raw) => {
            let parsed = parse_due_date(raw);
            if parsed.is_none() {
                errors.add("due_date", MSG_INVALID_DATE);
            }
            parsed
        }
        None => None,
    };

    let note = optional_text(input, &mut errors, "note", None);
    let complete = input.checked("complete");

    errors.finish(|| TaskDraft {
        project_id: project_id.unwrap_or_default(),
        title,
        priority,
        due_date,
        note,
        complete,
    })
}
