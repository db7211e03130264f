use crate::utils::percentage::Percentage;

use super::state::TaskEntry;

/// Completion of the task table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Counts checked rows against all rows, blank descriptions included.
    pub fn of(tasks: &[TaskEntry]) -> Self {
        Progress {
            completed: tasks.iter().filter(|v| v.done).count(),
            total: tasks.len(),
        }
    }

    /// Exact share of completed rows. Used for the proportional fill.
    pub fn fraction(&self) -> f64 {
        Percentage::of(self.completed, self.total).fraction()
    }

    /// Share of completed rows rounded to the nearest whole percent. Used for the label.
    pub fn percentage(&self) -> Percentage {
        Percentage::of(self.completed, self.total).rounded()
    }

    pub fn label(&self) -> String {
        format!("{}% Complete", *self.percentage() as u32)
    }
}
