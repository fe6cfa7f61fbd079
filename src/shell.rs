use std::io::Write;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::*;
use jiff::Timestamp;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::{
    commands::{Session, TaskCommand, execute},
    scheduler::{self, ReminderScheduler},
    services::tasks::TaskStore,
    storage::Storage,
    ui::TerminalPresenter,
};

#[derive(Debug, Parser)]
#[command(name = "nudge", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, Subcommand)]
enum ShellCommand {
    #[command(flatten)]
    Task(TaskCommand),

    /// Drop the pending edit
    Cancel,

    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn prompt<S: Storage>(store: &TaskStore<S, TerminalPresenter>) -> std::io::Result<()> {
    let marker = match store.pending_edit() {
        Some(index) => format!("edit #{}>", index + 1),
        None => String::from(">"),
    };
    print!("{} ", marker.cyan());
    std::io::stdout().flush()
}

fn handle_line<S: Storage>(
    store: &mut TaskStore<S, TerminalPresenter>,
    session: &mut Session,
    line: &str,
) -> Flow {
    let Some(words) = shlex::split(line) else {
        eprintln!("{} unbalanced quotes", "Error:".red().bold());
        return Flow::Continue;
    };
    if words.is_empty() {
        return Flow::Continue;
    }

    let command = match ShellLine::try_parse_from(words) {
        Ok(parsed) => parsed.command,
        Err(e) => {
            // Also covers `help`
            let _ = e.print();
            return Flow::Continue;
        }
    };

    store.reload();
    let theme = store.theme().to_string();
    store.presenter_mut().set_theme(&theme);
    if store.pending_edit().is_none() {
        session.staged = None;
    }

    match command {
        ShellCommand::Quit => return Flow::Quit,
        ShellCommand::Cancel => {
            if store.cancel_edit().is_some() {
                session.staged = None;
                println!("{}", "Edit cancelled".dimmed());
            }
        }
        ShellCommand::Task(command) => {
            if let Err(e) = execute(store, session, command, Timestamp::now()) {
                eprintln!("{} {}", "Error:".red().bold(), e);
            }
        }
    }

    Flow::Continue
}

/// Interactive session. Input lines and reminder ticks are handled one at a
/// time on the current thread, each running to completion.
pub async fn run<S: Storage>(
    store: &mut TaskStore<S, TerminalPresenter>,
    period: Duration,
) -> std::io::Result<()> {
    let mut reminders = ReminderScheduler::start(period);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session = Session::interactive();

    store.render();
    println!("{}", "Type `help` for commands, `quit` to leave.".dimmed());
    prompt(store)?;

    loop {
        tokio::select! {
            Some(now) = reminders.next_tick() => {
                if let Some(fired) = scheduler::run_tick(store, now)
                    && fired > 0
                {
                    prompt(store)?;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };
                if handle_line(store, &mut session, &line) == Flow::Quit {
                    break;
                }
                prompt(store)?;
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        }
    }

    reminders.stop();
    Ok(())
}

/// Runs only the reminder sweep until Ctrl-C.
pub async fn watch<S: Storage>(store: &mut TaskStore<S, TerminalPresenter>, period: Duration) {
    let mut reminders = ReminderScheduler::start(period);

    let pending = store
        .tasks()
        .iter()
        .filter(|t| !t.completed && t.reminder_time.is_some())
        .count();
    println!(
        "Watching {} {}. Press Ctrl-C to stop.",
        pending,
        if pending == 1 { "reminder" } else { "reminders" }
    );

    let stop = reminders.cancellation_token();
    let interrupted = async move {
        let _ = tokio::signal::ctrl_c().await;
        stop.cancel();
    };

    tokio::join!(scheduler::run(&mut reminders, store), interrupted);
}
