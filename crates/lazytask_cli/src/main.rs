//! LazyTask command-line entry point.
//!
//! # Responsibility
//! - Wire `lazytask_core` to a TOML config file and a SQLite database.
//! - Expose classification, task, assistant and read-only reminder commands.
//!
//! Reminder scheduling needs a live notification gateway, so this binary
//! only validates and inspects reminders.

use clap::{Args, Parser, Subcommand, ValueEnum};
use lazytask_core::clock::{format_date, format_instant, parse_date, parse_instant};
use lazytask_core::reminder::validate_reminder_time;
use lazytask_core::{
    assistant_reply, check_upcoming, init_logging_from_config, open_db, ChatMessage, Clock,
    CoreConfig, EpochMs, HuggingFaceClient, PriorityInferenceEngine, ReminderStore,
    SqliteReminderStore, SqliteTaskRepository, SystemClock, Task, TaskDraft, TaskId,
    TaskListQuery, TaskRepository, TaskService, TaskStatus,
};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Personal task manager with reminder checks and priority inference.
#[derive(Parser)]
#[command(name = "lazytask", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `storage.db_path`.
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check core linkage.
    Ping,

    /// Classify a task's priority without storing it.
    Classify(TaskFields),

    /// Manage tasks.
    #[command(subcommand)]
    Task(TaskCommand),

    /// Ask the task assistant a question about your open tasks.
    Ask {
        message: String,

        /// Maximum number of tasks passed as context.
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },

    /// Inspect reminders.
    #[command(subcommand)]
    Reminder(ReminderCommand),
}

#[derive(Args)]
struct TaskFields {
    /// Task title.
    title: String,

    #[arg(long)]
    description: Option<String>,

    /// Due day as `YYYY-MM-DD` (UTC).
    #[arg(long)]
    due: Option<String>,

    #[arg(long)]
    category: Option<String>,
}

#[derive(Subcommand)]
enum TaskCommand {
    /// Create a task and classify its priority.
    Add(TaskFields),

    /// List tasks, highest priority first.
    List {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,

        #[arg(long)]
        limit: Option<u32>,
    },
}

#[derive(Subcommand)]
enum ReminderCommand {
    /// Check whether a reminder time would be accepted for a task.
    Check {
        task: TaskId,

        /// RFC 3339 instant, e.g. `2026-02-13T10:00:00Z`.
        at: String,
    },

    /// List a task's reminders in trigger order.
    List { task: TaskId },

    /// Show the reminder inside the heads-up window, if any.
    Upcoming { task: TaskId },
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Pending,
    InProgress,
    Completed,
    Archived,
}

impl From<StatusArg> for TaskStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Pending => Self::Pending,
            StatusArg::InProgress => Self::InProgress,
            StatusArg::Completed => Self::Completed,
            StatusArg::Archived => Self::Archived,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let mut config = load_config(cli.config.as_ref())?;
    if let Some(db) = cli.db {
        config.storage.db_path = db;
    }
    init_logging_from_config(&config.logging)?;
    info!("event=cli_start module=cli status=ok");

    match cli.command {
        Command::Ping => {
            println!("lazytask_core ping={}", lazytask_core::ping());
            println!("lazytask_core version={}", lazytask_core::core_version());
            Ok(())
        }
        Command::Classify(fields) => classify(&config, fields),
        Command::Task(command) => run_task(&config, command),
        Command::Ask { message, limit } => ask(&config, message, limit),
        Command::Reminder(command) => run_reminder(&config, command),
    }
}

fn load_config(explicit: Option<&PathBuf>) -> CliResult<CoreConfig> {
    let config = match explicit {
        Some(path) => CoreConfig::from_file(path)?,
        None => {
            let path = CoreConfig::default_config_path();
            if path.is_file() {
                CoreConfig::from_file(&path)?
            } else {
                CoreConfig::default()
            }
        }
    };
    Ok(config.with_env_overrides()?)
}

fn engine(config: &CoreConfig) -> PriorityInferenceEngine<HuggingFaceClient, SystemClock> {
    PriorityInferenceEngine::new(HuggingFaceClient::from_config(&config.inference), SystemClock)
}

fn draft_from(fields: TaskFields) -> CliResult<TaskDraft> {
    let due_date = fields
        .due
        .as_deref()
        .map(|value| parse_date(value).ok_or_else(|| format!("invalid due date `{value}`")))
        .transpose()?;
    Ok(TaskDraft {
        description: fields.description,
        due_date,
        category: fields.category,
        ..TaskDraft::titled(fields.title)
    })
}

fn classify(config: &CoreConfig, fields: TaskFields) -> CliResult<()> {
    let draft = draft_from(fields)?;
    let mut task = Task::new(draft.title, SystemClock.now_ms());
    task.description = draft.description;
    task.due_date = draft.due_date;
    task.category = draft.category;

    let decision = engine(config).decide(&task);
    println!("{} ({})", decision.label, decision.source.as_str());
    Ok(())
}

fn run_task(config: &CoreConfig, command: TaskCommand) -> CliResult<()> {
    let conn = open_db(&config.storage.db_path)?;
    let service = TaskService::new(SqliteTaskRepository::new(&conn), engine(config));

    match command {
        TaskCommand::Add(fields) => {
            let task = service.create_task(draft_from(fields)?)?;
            println!("{} {}", task.id, task.priority);
        }
        TaskCommand::List { status, limit } => {
            let query = TaskListQuery {
                status: status.map(TaskStatus::from),
                limit,
                ..TaskListQuery::default()
            };
            for task in service.list_tasks(&query)? {
                let due = task
                    .due_date
                    .and_then(format_date)
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    task.id,
                    task.priority,
                    task.status.as_str(),
                    due,
                    task.title
                );
            }
        }
    }
    Ok(())
}

fn ask(config: &CoreConfig, message: String, limit: u32) -> CliResult<()> {
    let client = HuggingFaceClient::from_config(&config.inference)
        .ok_or("inference is disabled or no API key is configured")?;
    let conn = open_db(&config.storage.db_path)?;
    let query = TaskListQuery {
        status: Some(TaskStatus::Pending),
        limit: Some(limit),
        ..TaskListQuery::default()
    };
    let tasks = SqliteTaskRepository::new(&conn).list_tasks(&query)?;

    let reply = assistant_reply(&client, &[ChatMessage::user(message)], &tasks)?;
    println!("{reply}");
    Ok(())
}

fn run_reminder(config: &CoreConfig, command: ReminderCommand) -> CliResult<()> {
    let conn = open_db(&config.storage.db_path)?;
    let store = SqliteReminderStore::new(&conn);
    let now = SystemClock.now_ms();

    match command {
        ReminderCommand::Check { task, at } => {
            let candidate =
                parse_instant(&at).ok_or_else(|| format!("invalid reminder time `{at}`"))?;
            let existing = store.list_by_task(task)?;
            match validate_reminder_time(candidate, &existing, now) {
                Ok(()) => println!("ok"),
                Err(err) => println!("rejected: {err}"),
            }
        }
        ReminderCommand::List { task } => {
            for reminder in store.list_by_task(task)? {
                println!(
                    "{}\t{}\t{}\t{}",
                    reminder.id,
                    render_instant(reminder.reminder_time),
                    reminder.status.as_str(),
                    reminder.custom_message.as_deref().unwrap_or("")
                );
            }
        }
        ReminderCommand::Upcoming { task } => {
            let reminders = store.list_by_task(task)?;
            match check_upcoming(&reminders, now, config.reminders.upcoming_window_ms()) {
                Some(reminder) => println!(
                    "{}\t{}",
                    reminder.id,
                    render_instant(reminder.reminder_time)
                ),
                None => println!("none"),
            }
        }
    }
    Ok(())
}

fn render_instant(at: EpochMs) -> String {
    format_instant(at).unwrap_or_else(|| at.to_string())
}
