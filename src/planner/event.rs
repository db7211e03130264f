use chrono::{NaiveDate, NaiveTime};

/// Change to a single field of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEdit {
    StartTime(Option<NaiveTime>),
    EndTime(Option<NaiveTime>),
    Description(String),
    Done(bool),
}

/// Everything the user or the session lifecycle can do to a planner. Row indices are 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannerEvent {
    AddTask,
    RemoveTask(usize),
    EditTask { index: usize, edit: TaskEdit },
    Print,
    Reset,
    SetDate(NaiveDate),
    SetTopPriorities(String),
    SetBrainDump(String),
    Unload,
}
