use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::{
    commands::{Session, TaskCommand, execute},
    config::{Config, STORE_ENV, init_tracing},
    models::store::DEFAULT_THEME,
    scheduler::DEFAULT_PERIOD,
    services::tasks::TaskStore,
    storage::json::JsonFileStorage,
    ui::TerminalPresenter,
};

mod commands;
mod config;
mod models;
mod presenter;
mod scheduler;
mod services;
mod shell;
mod storage;
#[cfg(test)]
mod testing;
mod ui;
mod urgency;

#[derive(Parser)]
#[command(
    name = "nudge",
    about = "A small task list with reminders and secret tasks"
)]
struct Cli {
    /// Path to the task store (defaults to the local data directory)
    #[arg(long, global = true, env = STORE_ENV)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Task(TaskCommand),

    /// Interactive session with live reminders
    Shell {
        /// Milliseconds between reminder checks
        #[arg(long, default_value_t = DEFAULT_PERIOD.as_millis() as u64, value_parser = clap::value_parser!(u64).range(1..))]
        tick_ms: u64,
    },

    /// Only watch for due reminders until interrupted
    Watch {
        /// Milliseconds between reminder checks
        #[arg(long, default_value_t = DEFAULT_PERIOD.as_millis() as u64, value_parser = clap::value_parser!(u64).range(1..))]
        tick_ms: u64,
    },
}

/// Runs `future` on a single-threaded runtime. Shutting down in the
/// background lets us leave while a stdin read is still blocked.
fn block_on<T>(future: impl Future<Output = T>) -> std::io::Result<T> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    Ok(output)
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let config = Config::resolve(cli.store);
    if let Err(e) = config.ensure_data_dir() {
        eprintln!("Error: Failed to create data directory: {}", e);
        std::process::exit(1);
    }
    debug!(path = %config.store_path.display(), "using task store");

    let storage = JsonFileStorage::new(config.store_path);
    let mut store = TaskStore::open(storage, TerminalPresenter::new(DEFAULT_THEME));
    let theme = store.theme().to_string();
    store.presenter_mut().set_theme(&theme);

    let command = cli.command.unwrap_or(Commands::Task(TaskCommand::List));

    match command {
        Commands::Task(command) => {
            let mut session = Session::one_shot();
            if let Err(e) = execute(&mut store, &mut session, command, jiff::Timestamp::now()) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Shell { tick_ms } => {
            let period = Duration::from_millis(tick_ms);
            if let Err(e) = block_on(shell::run(&mut store, period)).and_then(|result| result) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Watch { tick_ms } => {
            let period = Duration::from_millis(tick_ms);
            if let Err(e) = block_on(shell::watch(&mut store, period)) {
                eprintln!("Error: Failed to start the reminder loop: {}", e);
                std::process::exit(1);
            }
        }
    }
}
