pub mod session;
pub mod shutdown;

use std::{fmt::Display, path::PathBuf};

use anyhow::{bail, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use tokio::io::{self, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;

use crate::{
    planner::{
        event::{PlannerEvent, TaskEdit},
        PlannerController,
    },
    platform::TerminalPlatform,
    render::{render_progress, RenderStyle},
    storage::{gateway::PersistenceGateway, key_value::FileKeyValueStore},
    utils::{
        clock::{Clock, DefaultClock},
        dir::{create_application_default_path, create_application_path},
        logging::{enable_logging, CLI_PREFIX, SESSION_PREFIX},
        time::{parse_iso_date, parse_time_of_day},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Timebox", version, long_about = None)]
#[command(about = "Daily planner with time-boxed tasks", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Mirror logs to the console")]
    log: bool,
    #[arg(long = "log-filter", global = true)]
    log_filter: Option<LevelFilter>,
    #[arg(long = "no-color", global = true, help = "Render without terminal colors")]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Show the planner")]
    Show,
    #[command(about = "Add a task row. Without values the row is left empty")]
    Add {
        #[arg(long, value_parser = parse_time_arg, help = "Start time, for example 9:00")]
        start: Option<NaiveTime>,
        #[arg(long, value_parser = parse_time_arg, help = "End time, for example 9:30")]
        end: Option<NaiveTime>,
        #[arg(long, help = "Add the task already checked")]
        done: bool,
        #[arg(help = "Task description")]
        text: Vec<String>,
    },
    #[command(about = "Remove a task row")]
    Remove {
        #[arg(help = "Row number as shown by `show`")]
        row: usize,
    },
    #[command(about = "Mark a task as done")]
    Check { row: usize },
    #[command(about = "Mark a task as not done")]
    Uncheck { row: usize },
    #[command(about = "Change times or the description of a task row")]
    Edit {
        row: usize,
        #[arg(long, value_parser = parse_time_arg)]
        start: Option<NaiveTime>,
        #[arg(long, value_parser = parse_time_arg)]
        end: Option<NaiveTime>,
        #[arg(long = "clear-times", conflicts_with_all = ["start", "end"])]
        clear_times: bool,
        #[arg(long)]
        task: Option<String>,
    },
    #[command(about = "Set the date of the planner")]
    Date {
        #[arg(
            required = true,
            help = "Examples are \"2025-03-15\", \"tomorrow\", \"15/03/2025\", \"next friday\""
        )]
        when: Vec<String>,
        #[arg(
            long,
            default_value_t = DateStyle::Uk,
            help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year"
        )]
        date_style: DateStyle,
    },
    #[command(about = "Replace the top priorities")]
    Priorities { text: Vec<String> },
    #[command(about = "Replace or extend the brain dump")]
    Dump {
        #[arg(long, help = "Add a line instead of replacing the text")]
        append: bool,
        text: Vec<String>,
    },
    #[command(about = "Print the planner sheet")]
    Print {
        #[arg(long, short, help = "Export the sheet into a file instead of stdout")]
        output: Option<PathBuf>,
    },
    #[command(about = "Clear the planner and start over")]
    Reset {
        #[arg(long, short, help = "Don't ask for confirmation")]
        yes: bool,
    },
    #[command(about = "Edit the planner interactively, one command per line")]
    Session {
        #[arg(long, default_value_t = DateStyle::Uk)]
        date_style: DateStyle,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

type StdPlatform = TerminalPlatform<BufReader<io::Stdin>, io::Stdout>;

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args
        .dir
        .map_or_else(create_application_default_path, create_application_path)?;

    let prefix = match args.commands {
        Commands::Session { .. } => SESSION_PREFIX,
        _ => CLI_PREFIX,
    };
    let logging_level = args
        .log_filter
        .or(if args.log { Some(LevelFilter::TRACE) } else { None });
    enable_logging(prefix, &app_dir, logging_level, args.log)?;

    let store = FileKeyValueStore::new(app_dir.join("storage"))?;
    let mut controller =
        PlannerController::load(PersistenceGateway::new(store), Box::new(DefaultClock)).await;
    if controller.is_load_failed() {
        eprintln!("Warning: the saved planner could not be read, changes won't be saved");
    }
    let style = if args.no_color {
        RenderStyle::Plain
    } else {
        RenderStyle::Color
    };
    let mut platform: StdPlatform =
        TerminalPlatform::new(BufReader::new(io::stdin()), io::stdout());

    if let Commands::Session { date_style } = args.commands {
        let shutdown_token = CancellationToken::new();
        let (_, result) = tokio::join!(shutdown::detect_shutdown(shutdown_token.clone()), async {
            let result = session::run_session(
                &mut controller,
                &mut platform,
                session::SessionOptions {
                    style,
                    date_style,
                    clock: &DefaultClock,
                },
                shutdown_token.clone(),
            )
            .await;
            shutdown_token.cancel();
            result
        });
        return result;
    }

    let result = process_command(args.commands, &mut controller, &mut platform, style).await;

    // Final save on exit, whatever the command was
    controller.handle(PlannerEvent::Unload, &mut platform).await?;
    if controller.has_unsaved_changes() {
        eprintln!("Warning: changes could not be saved, see logs for details");
    }
    result
}

async fn process_command(
    command: Commands,
    controller: &mut PlannerController<FileKeyValueStore>,
    platform: &mut StdPlatform,
    style: RenderStyle,
) -> Result<()> {
    let events = match command {
        Commands::Show => {
            platform.write(&controller.render(style)).await?;
            return Ok(());
        }
        Commands::Add {
            start,
            end,
            done,
            text,
        } => {
            let index = controller.state().tasks.len();
            let mut events = vec![PlannerEvent::AddTask];
            let edits = [
                start.map(|v| TaskEdit::StartTime(Some(v))),
                end.map(|v| TaskEdit::EndTime(Some(v))),
                (!text.is_empty()).then(|| TaskEdit::Description(text.join(" "))),
                done.then_some(TaskEdit::Done(true)),
            ];
            events.extend(
                edits
                    .into_iter()
                    .flatten()
                    .map(|edit| PlannerEvent::EditTask { index, edit }),
            );
            events
        }
        Commands::Remove { row } => vec![PlannerEvent::RemoveTask(row_index(row)?)],
        Commands::Check { row } => vec![PlannerEvent::EditTask {
            index: row_index(row)?,
            edit: TaskEdit::Done(true),
        }],
        Commands::Uncheck { row } => vec![PlannerEvent::EditTask {
            index: row_index(row)?,
            edit: TaskEdit::Done(false),
        }],
        Commands::Edit {
            row,
            start,
            end,
            clear_times,
            task,
        } => {
            let index = row_index(row)?;
            let edits = if clear_times {
                vec![TaskEdit::StartTime(None), TaskEdit::EndTime(None)]
            } else {
                [
                    start.map(|v| TaskEdit::StartTime(Some(v))),
                    end.map(|v| TaskEdit::EndTime(Some(v))),
                ]
                .into_iter()
                .flatten()
                .collect()
            };
            edits
                .into_iter()
                .chain(task.map(TaskEdit::Description))
                .map(|edit| PlannerEvent::EditTask { index, edit })
                .collect()
        }
        Commands::Date { when, date_style } => {
            let date = parse_date(&when.join(" "), date_style, DefaultClock.now())
                .map_err(|e| Args::command().error(clap::error::ErrorKind::ValueValidation, e))?;
            vec![PlannerEvent::SetDate(date)]
        }
        Commands::Priorities { text } => vec![PlannerEvent::SetTopPriorities(text.join(" "))],
        Commands::Dump { append, text } => {
            let text = text.join(" ");
            let brain_dump = &controller.state().brain_dump;
            let text = if append && !brain_dump.is_empty() {
                format!("{brain_dump}\n{text}")
            } else {
                text
            };
            vec![PlannerEvent::SetBrainDump(text)]
        }
        Commands::Print { output } => {
            let mut platform = TerminalPlatform::new(BufReader::new(io::stdin()), io::stdout())
                .with_export_path(output);
            return controller.handle(PlannerEvent::Print, &mut platform).await;
        }
        Commands::Reset { yes } => {
            let mut platform = TerminalPlatform::new(BufReader::new(io::stdin()), io::stdout())
                .with_assume_yes(yes);
            return controller.handle(PlannerEvent::Reset, &mut platform).await;
        }
        Commands::Session { .. } => bail!("Sessions are started by run_cli"),
    };

    for event in events {
        controller.handle(event, platform).await?;
    }
    platform
        .write(&format!("{}\n", render_progress(&controller.progress(), style)))
        .await
}

/// Converts a row number shown to the user into an index.
pub fn row_index(row: usize) -> Result<usize> {
    if row == 0 {
        bail!("Rows are numbered from 1");
    }
    Ok(row - 1)
}

fn parse_time_arg(value: &str) -> Result<NaiveTime, String> {
    parse_time_of_day(value).ok_or_else(|| format!("{value:?} is not a time, expected HH:MM"))
}

/// Accepts ISO dates and whatever `chrono_english` understands, relative to `now`.
pub fn parse_date(when: &str, date_style: DateStyle, now: DateTime<Local>) -> Result<NaiveDate> {
    if let Some(date) = parse_iso_date(when) {
        return Ok(date);
    }
    match parse_date_string(when.trim(), now, date_style.into()) {
        Ok(v) => Ok(v.date_naive()),
        Err(e) => bail!("Failed to validate date {when:?}: {e}"),
    }
}
