use super::state::TaskEntry;

/// Descriptions of every checked row with a non-blank description, in table order. The list is
/// rebuilt from scratch each time so it never drifts from the table.
pub fn completed_tasks(tasks: &[TaskEntry]) -> Vec<String> {
    tasks
        .iter()
        .filter(|v| v.done && !v.is_blank())
        .map(|v| v.description.clone())
        .collect()
}
