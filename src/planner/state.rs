use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::time::{format_time_of_day, parse_iso_date, parse_time_of_day};

/// Separator between the start and the end of a time range in the stored layout. Splitting a
/// stored range on it must give back both times, so descriptions never go through it.
pub const TIME_RANGE_SEPARATOR: &str = " to ";

/// Number of empty rows a fresh planner starts with.
pub const DEFAULT_ROW_COUNT: usize = 3;

/// One time-boxed row of the task table. Rows have no identity besides their position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEntry {
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub description: String,
    pub done: bool,
}

impl TaskEntry {
    /// Joins both times into the `"HH:MM to HH:MM"` form used by storage. Non-zero seconds are
    /// kept as `HH:MM:SS`.
    pub fn time_range(&self) -> String {
        format!(
            "{}{TIME_RANGE_SEPARATOR}{}",
            format_time_of_day(self.start_time),
            format_time_of_day(self.end_time)
        )
    }

    pub fn is_blank(&self) -> bool {
        self.description.trim().is_empty()
    }
}

/// Splits a stored time range back into the start and the end time.
pub fn split_time_range(time_range: &str) -> (Option<NaiveTime>, Option<NaiveTime>) {
    let mut parts = time_range.split(TIME_RANGE_SEPARATOR);
    let start = parts.next().and_then(parse_time_of_day);
    let end = parts.next().and_then(parse_time_of_day);
    (start, end)
}

/// The full snapshot of one day's plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerState {
    pub date: NaiveDate,
    pub top_priorities: String,
    pub brain_dump: String,
    pub tasks: Vec<TaskEntry>,
}

impl PlannerState {
    /// Planner for `date` with empty texts and [DEFAULT_ROW_COUNT] empty rows.
    pub fn new_default(date: NaiveDate) -> Self {
        Self {
            date,
            top_priorities: String::new(),
            brain_dump: String::new(),
            tasks: vec![TaskEntry::default(); DEFAULT_ROW_COUNT],
        }
    }
}

/// Layout of a row inside the stored blob.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct TaskRecord {
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub done: bool,
}

/// Layout of the stored blob. Field names are part of the persisted format.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlannerRecord {
    /// `None` when the stored date is missing, empty or not an ISO date.
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub top_priorities: String,
    #[serde(default)]
    pub brain_dump: String,
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
}

/// A date field that can't be read drops only the date, never the rest of the planner.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(parse_iso_date))
}

impl PlannerRecord {
    /// Turns the stored layout back into a planner, using `fallback_date` when the stored date is
    /// unusable.
    pub fn into_state(self, fallback_date: NaiveDate) -> PlannerState {
        PlannerState {
            date: self.date.unwrap_or(fallback_date),
            tasks: self.tasks.iter().map(TaskEntry::from).collect(),
            top_priorities: self.top_priorities,
            brain_dump: self.brain_dump,
        }
    }
}

impl From<&TaskEntry> for TaskRecord {
    fn from(entry: &TaskEntry) -> Self {
        TaskRecord {
            time: entry.time_range(),
            task: entry.description.clone(),
            done: entry.done,
        }
    }
}

impl From<&PlannerState> for PlannerRecord {
    fn from(state: &PlannerState) -> Self {
        PlannerRecord {
            date: Some(state.date),
            top_priorities: state.top_priorities.clone(),
            brain_dump: state.brain_dump.clone(),
            tasks: state.tasks.iter().map(TaskRecord::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::{split_time_range, PlannerRecord, PlannerState, TaskEntry, TaskRecord};

    #[test]
    fn test_time_range_round_trip() {
        let entry = TaskEntry {
            start_time: NaiveTime::from_hms_opt(9, 30, 0),
            end_time: NaiveTime::from_hms_opt(11, 0, 0),
            description: "design doc".into(),
            done: true,
        };

        assert_eq!(entry.time_range(), "09:30 to 11:00");
        assert_eq!(
            split_time_range(&entry.time_range()),
            (entry.start_time, entry.end_time)
        );
    }

    #[test]
    fn test_time_range_with_seconds() {
        let (start, end) = split_time_range("09:00:30 to 10:00");
        let entry = TaskEntry {
            start_time: start,
            end_time: end,
            ..Default::default()
        };

        assert_eq!(entry.time_range(), "09:00:30 to 10:00");
    }

    #[test]
    fn test_empty_time_range() {
        let entry = TaskEntry::default();
        assert_eq!(entry.time_range(), " to ");
        assert_eq!(split_time_range(" to "), (None, None));
        assert_eq!(split_time_range(""), (None, None));
    }

    #[test]
    fn test_half_time_range() {
        assert_eq!(
            split_time_range(" to 10:15"),
            (None, NaiveTime::from_hms_opt(10, 15, 0))
        );
        assert_eq!(
            split_time_range("08:00 to "),
            (NaiveTime::from_hms_opt(8, 0, 0), None)
        );
    }

    #[test]
    fn test_record_layout() -> anyhow::Result<()> {
        let mut state = PlannerState::new_default(NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
        state.top_priorities = "ship".into();
        state.tasks.truncate(1);

        let json = serde_json::to_value(PlannerRecord::from(&state))?;

        assert_eq!(
            json,
            serde_json::json!({
                "date": "2025-03-15",
                "topPriorities": "ship",
                "brainDump": "",
                "tasks": [{ "time": " to ", "task": "", "done": false }],
            })
        );
        Ok(())
    }

    #[test]
    fn test_record_missing_fields() -> anyhow::Result<()> {
        let record: PlannerRecord = serde_json::from_str(r#"{"date":"2025-03-15"}"#)?;
        assert!(record.tasks.is_empty());
        assert_eq!(record.brain_dump, "");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 3, 15));

        let task: TaskRecord = serde_json::from_str(r#"{"task":"standup"}"#)?;
        assert_eq!(task.time, "");
        assert!(!task.done);
        Ok(())
    }

    #[test]
    fn test_unreadable_date_keeps_the_rest() -> anyhow::Result<()> {
        let fallback = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        for blob in [
            r#"{"date":"","topPriorities":"ship"}"#,
            r#"{"date":"next week","topPriorities":"ship"}"#,
            r#"{"date":null,"topPriorities":"ship"}"#,
            r#"{"topPriorities":"ship"}"#,
        ] {
            let record: PlannerRecord = serde_json::from_str(blob)?;
            assert_eq!(record.date, None, "{blob}");

            let state = record.into_state(fallback);
            assert_eq!(state.date, fallback);
            assert_eq!(state.top_priorities, "ship");
        }
        Ok(())
    }
}
