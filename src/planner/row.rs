//! Construction of task rows. Rows are only built here; inserting them into a planner and saving
//! is up to the caller.

use super::state::{split_time_range, TaskEntry, TaskRecord};

/// Builds a row out of a stored `"HH:MM to HH:MM"` range, a description and a done flag.
pub fn create_task_row(time_range: &str, description: &str, done: bool) -> TaskEntry {
    let (start_time, end_time) = split_time_range(time_range);
    TaskEntry {
        start_time,
        end_time,
        description: description.to_owned(),
        done,
    }
}

/// Row with no times, no description and an unchecked box.
pub fn empty_task_row() -> TaskEntry {
    TaskEntry::default()
}

impl From<&TaskRecord> for TaskEntry {
    fn from(record: &TaskRecord) -> Self {
        create_task_row(&record.time, &record.task, record.done)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use crate::planner::state::TaskRecord;

    use super::{create_task_row, empty_task_row, TaskEntry};

    #[test]
    fn test_prefilled_row() {
        let row = create_task_row("9:00 to 9:30", "standup", false);
        assert_eq!(row.start_time, NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(row.end_time, NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(row.description, "standup");
        assert!(!row.done);
    }

    #[test]
    fn test_empty_row() {
        let row = empty_task_row();
        assert_eq!(row, create_task_row("", "", false));
        assert!(row.is_blank());
    }

    #[test]
    fn test_row_from_record() {
        let record = TaskRecord {
            time: "13:00 to 14:00".into(),
            task: "lunch".into(),
            done: true,
        };
        let row = TaskEntry::from(&record);
        assert!(row.done);
        assert_eq!(TaskRecord::from(&row), record);
    }
}
