use clap::Subcommand;
use colored::*;
use jiff::Timestamp;
use thiserror::Error;

use crate::{
    models::task::{ReminderParseError, parse_reminder},
    services::tasks::{AddTaskParameters, EditDraft, Submitted, TaskError, TaskStore},
    storage::Storage,
    ui::{self, THEMES, TerminalPresenter},
};

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// Show all tasks
    #[command(alias = "ls")]
    List,

    /// Add a new task (in the shell, submits a pending edit instead)
    Add {
        /// Task text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Remind at a time (e.g., "30m", "2h 15m", "2025-03-01T14:30")
        #[arg(short, long)]
        remind: Option<String>,

        /// Hide the text until revealed with the password
        #[arg(short, long)]
        secret: bool,

        /// Password for a secret task (empty if omitted)
        #[arg(short, long, requires = "secret", allow_hyphen_values = true)]
        password: Option<String>,

        /// Drop the staged reminder when submitting an edit
        #[arg(long, conflicts_with = "remind")]
        no_reminder: bool,
    },

    /// Change a task's text and reminder. Without text the shell stages it for editing
    Edit {
        /// Task number
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        number: u64,

        /// New text
        text: Vec<String>,

        /// New reminder (the current one is kept otherwise)
        #[arg(short, long)]
        remind: Option<String>,

        /// Remove the reminder
        #[arg(long, conflicts_with = "remind")]
        no_reminder: bool,
    },

    /// Mark a task done, or not done again
    #[command(alias = "done")]
    Toggle {
        /// Task number
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        number: u64,
    },

    /// Delete a task
    #[command(alias = "rm")]
    Delete {
        /// Task number
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        number: u64,
    },

    /// Show the text of a secret task
    Reveal {
        /// Task number
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        number: u64,

        /// Password given when the task was added (empty if omitted)
        #[arg(allow_hyphen_values = true)]
        password: Option<String>,
    },

    /// Remove a task's reminder
    Clear {
        /// Task number
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        number: u64,
    },

    /// Show progress
    Stats,

    /// Show or set the colour theme
    Theme {
        /// One of: default, ocean, forest, sunset
        name: Option<String>,
    },
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Task(#[from] TaskError),

    #[error(transparent)]
    Reminder(#[from] ReminderParseError),

    #[error("Incorrect password!")]
    IncorrectPassword,

    #[error("Nothing to change. Give the new text, e.g. `nudge edit {0} New text`")]
    MissingEditText(u64),

    #[error("Unknown theme '{0}'. Available themes: {themes}", themes = THEMES.join(", "))]
    UnknownTheme(String),
}

/// Per-session presentation state
#[derive(Default)]
pub struct Session {
    /// Inputs staged by `edit <number>` in the shell
    pub staged: Option<EditDraft>,
    pub interactive: bool,
}

impl Session {
    pub fn one_shot() -> Self {
        Self::default()
    }

    pub fn interactive() -> Self {
        Self {
            staged: None,
            interactive: true,
        }
    }
}

fn to_index(number: u64) -> usize {
    number.saturating_sub(1) as usize
}

fn resolve_reminder(
    remind: Option<String>,
    no_reminder: bool,
    fallback: Option<Timestamp>,
    now: Timestamp,
) -> Result<Option<Timestamp>, ReminderParseError> {
    match remind {
        Some(input) => parse_reminder(&input, now).map(Some),
        None if no_reminder => Ok(None),
        None => Ok(fallback),
    }
}

pub fn execute<S: Storage>(
    store: &mut TaskStore<S, TerminalPresenter>,
    session: &mut Session,
    command: TaskCommand,
    now: Timestamp,
) -> Result<(), CommandError> {
    match command {
        TaskCommand::List => store.render(),
        TaskCommand::Add {
            text,
            remind,
            secret,
            password,
            no_reminder,
        } => {
            // A pending edit starts from the staged reminder, like a prefilled form
            let staged = store
                .pending_edit()
                .and(session.staged.as_ref())
                .and_then(|draft| draft.reminder_time);
            let reminder_time = resolve_reminder(remind, no_reminder, staged, now)?;

            let submitted = store.add_or_edit_task(AddTaskParameters {
                text: text.join(" "),
                reminder_time,
                is_secret: secret,
                password: password.unwrap_or_default(),
            })?;
            if let Submitted::Edited(_) = submitted {
                session.staged = None;
            }
        }
        TaskCommand::Edit {
            number,
            text,
            remind,
            no_reminder,
        } => {
            let index = to_index(number);
            if text.is_empty() {
                if !session.interactive {
                    return Err(CommandError::MissingEditText(number));
                }
                let draft = store.begin_edit(index)?;
                ui::render_edit_draft(index, &draft);
                session.staged = Some(draft);
            } else {
                let current = store.task(index)?.reminder_time;
                let reminder_time = resolve_reminder(remind, no_reminder, current, now)?;
                store.edit_task(index, &text.join(" "), reminder_time)?;
            }
        }
        TaskCommand::Toggle { number } => {
            store.toggle_complete(to_index(number))?;
        }
        TaskCommand::Delete { number } => {
            let removed = store.delete_task(to_index(number))?;
            println!("{} {}", "Deleted:".dimmed(), removed.display_text());
        }
        TaskCommand::Reveal { number, password } => {
            let index = to_index(number);
            if !store.reveal_task(index, &password.unwrap_or_default())? {
                return Err(CommandError::IncorrectPassword);
            }
            println!("{} {}", format!("#{}", number).dimmed(), store.task(index)?.text.bold());
        }
        TaskCommand::Clear { number } => {
            if !store.clear_reminder(to_index(number))? {
                println!("Task #{} has no reminder", number);
            }
        }
        TaskCommand::Stats => ui::render_stats(&store.stats()),
        TaskCommand::Theme { name: None } => println!("{}", store.theme()),
        TaskCommand::Theme { name: Some(name) } => {
            if !THEMES.contains(&name.as_str()) {
                return Err(CommandError::UnknownTheme(name));
            }
            store.set_theme(&name)?;
            store.presenter_mut().set_theme(&name);
            println!("Theme set to {}", name.bold());
        }
    }

    Ok(())
}
