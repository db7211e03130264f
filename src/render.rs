//! Text rendering of a planner, both for the terminal and for the printable sheet.

use std::fmt::Write;

use ansi_term::{Colour, Style};

use crate::{
    planner::{progress::Progress, state::PlannerState},
    utils::time::{format_date, format_time_of_day},
};

const PROGRESS_WIDTH: usize = 30;
const TIME_COLUMN_WIDTH: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStyle {
    Plain,
    Color,
}

impl RenderStyle {
    fn paint(self, style: Style, text: &str) -> String {
        match self {
            RenderStyle::Plain => text.to_string(),
            RenderStyle::Color => style.paint(text).to_string(),
        }
    }
}

/// Bar of [PROGRESS_WIDTH] cells, filled proportionally to the exact completed fraction.
pub fn render_progress(progress: &Progress, style: RenderStyle) -> String {
    let filled =
        ((progress.fraction() * PROGRESS_WIDTH as f64).round() as usize).min(PROGRESS_WIDTH);
    let (fill_char, empty_char) = match style {
        RenderStyle::Plain => ("#", "-"),
        RenderStyle::Color => ("█", "░"),
    };
    format!(
        "[{}{}] {}",
        style.paint(Colour::Green.normal(), &fill_char.repeat(filled)),
        empty_char.repeat(PROGRESS_WIDTH - filled),
        style.paint(Style::new().bold(), &progress.label())
    )
}

pub fn render_planner(
    state: &PlannerState,
    progress: &Progress,
    completed: &[String],
    style: RenderStyle,
) -> String {
    let heading = |text: &str| style.paint(Style::new().bold().underline(), text);
    let mut out = String::new();

    let _ = writeln!(out, "{} {}", heading("Date:"), format_date(state.date));
    let _ = writeln!(out);

    let _ = writeln!(out, "{}", heading("Top priorities"));
    write_text_block(&mut out, &state.top_priorities, style);
    let _ = writeln!(out);

    let _ = writeln!(out, "{}", heading("Tasks"));
    if state.tasks.is_empty() {
        let _ = writeln!(out, "  {}", style.paint(Colour::Fixed(244).normal(), "(no tasks)"));
    }
    for (index, task) in state.tasks.iter().enumerate() {
        let time = match (task.start_time, task.end_time) {
            (None, None) => String::new(),
            (start, end) => format!(
                "{:>5} - {:<5}",
                format_time_of_day(start),
                format_time_of_day(end)
            ),
        };
        let checkbox = if task.done { "[x]" } else { "[ ]" };
        let description = if task.done {
            style.paint(Colour::Green.normal(), &task.description)
        } else {
            task.description.clone()
        };
        let _ = writeln!(
            out,
            "  {:>2}. {checkbox} {time:<width$} {description}",
            index + 1,
            width = TIME_COLUMN_WIDTH
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "{}", render_progress(progress, style));
    let _ = writeln!(out);

    let _ = writeln!(out, "{}", heading("Completed"));
    if completed.is_empty() {
        let _ = writeln!(out, "  {}", style.paint(Colour::Fixed(244).normal(), "(nothing yet)"));
    }
    for task in completed {
        let _ = writeln!(out, "  - {task}");
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "{}", heading("Brain dump"));
    write_text_block(&mut out, &state.brain_dump, style);

    out
}

fn write_text_block(out: &mut String, text: &str, style: RenderStyle) {
    if text.trim().is_empty() {
        let _ = writeln!(out, "  {}", style.paint(Colour::Fixed(244).normal(), "(empty)"));
        return;
    }
    for line in text.lines() {
        let _ = writeln!(out, "  {line}");
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::planner::{
        progress::Progress,
        row::create_task_row,
        state::PlannerState,
        summary::completed_tasks,
    };

    use super::{render_planner, render_progress, RenderStyle};

    #[test]
    fn test_render_progress_fill() {
        let progress = Progress {
            completed: 1,
            total: 2,
        };
        assert_eq!(
            render_progress(&progress, RenderStyle::Plain),
            format!("[{}{}] 50% Complete", "#".repeat(15), "-".repeat(15))
        );

        let empty = Progress {
            completed: 0,
            total: 0,
        };
        assert!(render_progress(&empty, RenderStyle::Plain).ends_with("] 0% Complete"));
    }

    #[test]
    fn test_render_planner_plain() {
        let mut state = PlannerState::new_default(NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
        state.tasks = vec![
            create_task_row("09:00 to 09:30", "standup", false),
            create_task_row("09:30 to 11:00", "design doc", true),
        ];
        state.brain_dump = "buy milk\nrenew passport".into();

        let sheet = render_planner(
            &state,
            &Progress::of(&state.tasks),
            &completed_tasks(&state.tasks),
            RenderStyle::Plain,
        );

        assert!(sheet.starts_with("Date: 2025-03-15\n"));
        assert!(sheet.contains("   1. [ ] 09:00 - 09:30  standup\n"));
        assert!(sheet.contains("   2. [x] 09:30 - 11:00  design doc\n"));
        assert!(sheet.contains("50% Complete"));
        assert!(sheet.contains("  - design doc\n"));
        assert!(sheet.contains("  renew passport\n"));
        assert!(!sheet.contains('\u{1b}'));
    }
}
