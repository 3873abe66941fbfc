//! Prompt construction for the model tier.

use crate::clock::format_date;
use crate::model::task::Task;

const NONE_PLACEHOLDER: &str = "None";

const INSTRUCTIONS: &str = "Based on the task information above, classify this task's priority as either HIGH, MEDIUM, or LOW.
Consider the following criteria:
- Urgency (due date proximity)
- Task complexity and importance (based on description)
- Task scope and impact
- Keywords indicating priority

Respond with only one word: HIGH, MEDIUM, or LOW
";

/// Renders the classification prompt for one task.
///
/// Blank optional fields render as `None`; the due date renders as a UTC
/// `YYYY-MM-DD` day.
pub fn build_priority_prompt(task: &Task) -> String {
    let description = non_blank(task.description.as_deref());
    let due_date = task.due_date.and_then(format_date);
    let category = non_blank(task.category.as_deref());

    format!(
        "Task Title: {}\nDescription: {}\nDue Date: {}\nCategory: {}\n\n{INSTRUCTIONS}",
        task.title.trim(),
        description.unwrap_or(NONE_PLACEHOLDER),
        due_date.as_deref().unwrap_or(NONE_PLACEHOLDER),
        category.unwrap_or(NONE_PLACEHOLDER),
    )
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}
