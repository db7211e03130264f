//! Interactive planner session. Reads one command per line, turns it into planner events and
//! handles them one at a time until input ends, `quit` is typed or Ctrl-C is pressed.

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Local};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{
    planner::{
        event::{PlannerEvent, TaskEdit},
        PlannerController,
    },
    platform::TerminalPlatform,
    render::{render_progress, RenderStyle},
    storage::key_value::KeyValueStore,
    utils::{clock::Clock, time::parse_time_of_day},
};

use super::{parse_date, row_index, DateStyle};

pub const HELP: &str = "\
Commands:
  show                    show the planner
  add                     add an empty task row
  rm N                    remove row N
  done N / undo N         check or uncheck row N
  task N TEXT             set the description of row N
  time N START [END]      set the times of row N, '-' clears a time
  date WHEN               set the date (2025-03-15, tomorrow, 15/03/2025)
  top TEXT                replace the top priorities
  dump TEXT               replace the brain dump
  print                   print the planner sheet
  reset                   clear the planner
  help                    show this help
  quit                    save and leave
";

const PROMPT: &str = "> ";

#[derive(Debug, PartialEq, Eq)]
pub enum SessionCommand {
    Events(Vec<PlannerEvent>),
    Show,
    Help,
    Quit,
    Nothing,
}

pub struct SessionOptions<'a> {
    pub style: RenderStyle,
    pub date_style: DateStyle,
    pub clock: &'a dyn Clock,
}

/// Executes the session loop. The planner is saved one last time whichever way the loop ends.
pub async fn run_session<S, R, W>(
    controller: &mut PlannerController<S>,
    platform: &mut TerminalPlatform<R, W>,
    options: SessionOptions<'_>,
    shutdown: CancellationToken,
) -> Result<()>
where
    S: KeyValueStore,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("Session started");
    platform.write(&controller.render(options.style)).await?;
    platform.write(PROMPT).await?;

    let result = session_loop(controller, platform, &options, &shutdown).await;
    if let Err(e) = &result {
        error!("Session stopped unexpectedly {e:?}");
    }

    controller.handle(PlannerEvent::Unload, platform).await?;
    if controller.has_unsaved_changes() {
        platform
            .write("\nWarning: changes could not be saved, see logs for details\n")
            .await?;
    }
    info!("Session finished");
    result
}

async fn session_loop<S, R, W>(
    controller: &mut PlannerController<S>,
    platform: &mut TerminalPlatform<R, W>,
    options: &SessionOptions<'_>,
    shutdown: &CancellationToken,
) -> Result<()>
where
    S: KeyValueStore,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        let line = tokio::select! {
            biased;
            // Cancelation means the user wants out. The caller takes care of the last save.
            _ = shutdown.cancelled() => return Ok(()),
            line = platform.next_line() => line?,
        };
        let Some(line) = line else {
            return Ok(());
        };

        let command = parse_session_line(&line, options.date_style, options.clock.now());
        debug!("Parsed {line:?} into {command:?}");
        match command {
            Ok(SessionCommand::Quit) => return Ok(()),
            Ok(SessionCommand::Nothing) => {}
            Ok(SessionCommand::Show) => platform.write(&controller.render(options.style)).await?,
            Ok(SessionCommand::Help) => platform.write(HELP).await?,
            Ok(SessionCommand::Events(events)) => {
                for event in events {
                    if let Err(e) = controller.handle(event, platform).await {
                        platform.write(&format!("{e}\n")).await?;
                        break;
                    }
                }
                if controller.has_unsaved_changes() {
                    platform
                        .write("Warning: changes could not be saved, see logs for details\n")
                        .await?;
                }
                platform
                    .write(&format!(
                        "{}\n",
                        render_progress(&controller.progress(), options.style)
                    ))
                    .await?;
            }
            Err(e) => platform.write(&format!("{e}\n{HELP}")).await?,
        }
        platform.write(PROMPT).await?;
    }
}

/// Turns a line typed in a session into a command. Rows are numbered from 1 like in `show`.
pub fn parse_session_line(
    line: &str,
    date_style: DateStyle,
    now: DateTime<Local>,
) -> Result<SessionCommand> {
    let line = line.trim();
    let (name, rest) = line
        .split_once(char::is_whitespace)
        .map(|(name, rest)| (name, rest.trim()))
        .unwrap_or((line, ""));

    let event = match name.to_lowercase().as_str() {
        "" => return Ok(SessionCommand::Nothing),
        "show" | "ls" => return Ok(SessionCommand::Show),
        "help" | "?" => return Ok(SessionCommand::Help),
        "quit" | "exit" | "q" => return Ok(SessionCommand::Quit),
        "add" => PlannerEvent::AddTask,
        "print" => PlannerEvent::Print,
        "reset" => PlannerEvent::Reset,
        "rm" | "remove" => PlannerEvent::RemoveTask(parse_row(rest)?),
        "done" | "undo" => PlannerEvent::EditTask {
            index: parse_row(rest)?,
            edit: TaskEdit::Done(name.eq_ignore_ascii_case("done")),
        },
        "task" => {
            let (row, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            PlannerEvent::EditTask {
                index: parse_row(row)?,
                edit: TaskEdit::Description(text.trim().to_string()),
            }
        }
        "time" => return parse_times(rest).map(SessionCommand::Events),
        "date" => {
            if rest.is_empty() {
                bail!("Missing date");
            }
            PlannerEvent::SetDate(parse_date(rest, date_style, now)?)
        }
        "top" => PlannerEvent::SetTopPriorities(rest.to_string()),
        "dump" => PlannerEvent::SetBrainDump(rest.to_string()),
        _ => bail!("Unknown command {name:?}"),
    };
    Ok(SessionCommand::Events(vec![event]))
}

fn parse_row(value: &str) -> Result<usize> {
    let row = value
        .trim()
        .parse::<usize>()
        .map_err(|_| anyhow!("Expected a row number, got {value:?}"))?;
    row_index(row)
}

fn parse_times(rest: &str) -> Result<Vec<PlannerEvent>> {
    let mut parts = rest.split_whitespace();
    let index = parse_row(parts.next().unwrap_or_default())?;
    let Some(start) = parts.next() else {
        bail!("Missing start time");
    };

    let mut events = vec![PlannerEvent::EditTask {
        index,
        edit: TaskEdit::StartTime(parse_time_part(start)?),
    }];
    if let Some(end) = parts.next() {
        events.push(PlannerEvent::EditTask {
            index,
            edit: TaskEdit::EndTime(parse_time_part(end)?),
        });
    }
    Ok(events)
}

fn parse_time_part(value: &str) -> Result<Option<chrono::NaiveTime>> {
    if value == "-" {
        return Ok(None);
    }
    parse_time_of_day(value)
        .map(Some)
        .ok_or_else(|| anyhow!("{value:?} is not a time, expected HH:MM"))
}
