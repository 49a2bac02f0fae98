use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::daybook::Daybook;
use crate::error::Rejection;
use crate::persistence::PersistenceError;
use crate::utils::format_date_label;

#[derive(Parser)]
#[command(name = "dn")]
#[command(about = "Daynotes - one task list per day, in as many workspaces as you like")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Add a task to today
    Add {
        /// Task text
        #[arg(required = true)]
        text: Vec<String>,
        /// Workspace name (default: the active one)
        #[arg(short, long)]
        workspace: Option<String>,
    },
    /// Show the tasks of a day
    List {
        /// How many notes back to look (0 = today)
        #[arg(short, long, default_value_t = 0)]
        back: usize,
        /// Workspace name (default: the active one)
        #[arg(short, long)]
        workspace: Option<String>,
    },
    /// Toggle completion of today's task number N
    Done {
        /// Task number as shown by `list` (1-based)
        number: usize,
        #[arg(short, long)]
        workspace: Option<String>,
    },
    /// Toggle the pin on today's task number N
    Pin {
        /// Task number as shown by `list` (1-based)
        number: usize,
        #[arg(short, long)]
        workspace: Option<String>,
    },
    /// Show completion history, newest first
    History {
        /// Show at most this many entries
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// List workspaces
    Workspaces,
    /// Show available themes, or switch to one
    Theme {
        /// Theme to make current
        name: Option<String>,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Persistence error: {0}")]
    PersistenceError(#[from] PersistenceError),
    #[error("{0}")]
    Rejected(#[from] Rejection),
    #[error("No workspace named '{0}'")]
    UnknownWorkspace(String),
    #[error("No task number {0} today")]
    NoSuchTask(usize),
    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Failed to write output: {0}")]
    IoError(#[from] std::io::Error),
}

/// Run `f` with the named workspace active, restoring the previous one after
fn with_workspace<T>(
    daybook: &mut Daybook,
    workspace: Option<&str>,
    f: impl FnOnce(&mut Daybook) -> Result<T, CliError>,
) -> Result<T, CliError> {
    let Some(name) = workspace else {
        return f(daybook);
    };
    let target = daybook
        .collection()
        .find_by_name(name)
        .map(|w| w.id.clone())
        .ok_or_else(|| CliError::UnknownWorkspace(name.to_string()))?;
    let previous = daybook.collection().active_workspace_id.clone();

    daybook.switch_workspace(&target)?;
    let result = f(daybook);
    if previous != target {
        daybook.switch_workspace(&previous)?;
    }
    result
}

/// Id of today's task at 1-based position `number`
fn task_id_at(daybook: &Daybook, number: usize) -> Result<String, CliError> {
    daybook
        .active_workspace()
        .and_then(|w| w.latest_note())
        .and_then(|note| note.tasks.get(number.wrapping_sub(1)))
        .map(|task| task.id.clone())
        .ok_or(CliError::NoSuchTask(number))
}

/// Handle the add command
pub fn handle_add(
    text: Vec<String>,
    workspace: Option<String>,
    daybook: &mut Daybook,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let text = text.join(" ");
    with_workspace(daybook, workspace.as_deref(), |daybook| {
        daybook.add_task(&text)?;
        writeln!(out, "Added: {}", text.trim())?;
        Ok(())
    })
}

/// Handle the list command
pub fn handle_list(
    back: usize,
    workspace: Option<String>,
    daybook: &mut Daybook,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let today = daybook.today();
    with_workspace(daybook, workspace.as_deref(), |daybook| {
        let Some(workspace) = daybook.active_workspace() else {
            return Ok(());
        };
        let Some(note) = workspace.notes.get(back) else {
            writeln!(out, "{}: only {} day(s) recorded", workspace.name, workspace.notes.len())?;
            return Ok(());
        };

        writeln!(out, "{} - {}", workspace.name, format_date_label(note.date, today))?;
        if note.tasks.is_empty() {
            writeln!(out, "  (no tasks)")?;
        }
        for (i, task) in note.tasks.iter().enumerate() {
            let check = if task.completed { "x" } else { " " };
            let pin = if task.pinned { " *" } else { "" };
            writeln!(out, "{:>3}. [{}] {}{}", i + 1, check, task.text, pin)?;
        }
        Ok(())
    })
}

/// Handle the done command
pub fn handle_done(
    number: usize,
    workspace: Option<String>,
    daybook: &mut Daybook,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    with_workspace(daybook, workspace.as_deref(), |daybook| {
        let id = task_id_at(daybook, number)?;
        let completed = daybook.toggle_complete(&id)?;
        let verb = if completed { "Completed" } else { "Reopened" };
        writeln!(out, "{} task {}", verb, number)?;
        Ok(())
    })
}

/// Handle the pin command
pub fn handle_pin(
    number: usize,
    workspace: Option<String>,
    daybook: &mut Daybook,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    with_workspace(daybook, workspace.as_deref(), |daybook| {
        let id = task_id_at(daybook, number)?;
        let pinned = daybook.toggle_pin(&id)?;
        let verb = if pinned { "Pinned" } else { "Unpinned" };
        writeln!(out, "{} task {}", verb, number)?;
        Ok(())
    })
}

/// Handle the history command
pub fn handle_history(
    limit: Option<usize>,
    daybook: &Daybook,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let entries = daybook.ledger().entries();
    if entries.is_empty() {
        writeln!(out, "Nothing completed yet")?;
    }
    for record in entries.iter().take(limit.unwrap_or(usize::MAX)) {
        writeln!(out, "{}  {}", record.completed_date, record.text)?;
    }
    Ok(())
}

/// Handle the workspaces command
pub fn handle_workspaces(daybook: &Daybook, out: &mut dyn Write) -> Result<(), CliError> {
    let collection = daybook.collection();
    for workspace in &collection.workspaces {
        let marker = if workspace.id == collection.active_workspace_id { "*" } else { " " };
        writeln!(out, "{} {} ({} days)", marker, workspace.name, workspace.notes.len())?;
    }
    Ok(())
}

/// Handle the theme command
pub fn handle_theme(
    name: Option<String>,
    config: &mut Config,
    config_path: &Path,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    match name {
        Some(name) => {
            config.set_theme(&name)?;
            config.save_to_path(config_path)?;
            writeln!(out, "Theme set to {}", name)?;
        }
        None => {
            for theme in config.get_available_themes() {
                let marker = if theme == config.current_theme { "*" } else { " " };
                writeln!(out, "{} {}", marker, theme)?;
            }
        }
    }
    Ok(())
}
