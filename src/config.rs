use std::path::PathBuf;

/// Overrides the store location
pub const STORE_ENV: &str = "NUDGE_STORE";

/// Log filter, e.g. `NUDGE_LOG=debug`
pub const LOG_ENV: &str = "NUDGE_LOG";

pub struct Config {
    pub store_path: PathBuf,
}

impl Config {
    pub fn resolve(store_override: Option<PathBuf>) -> Self {
        Self {
            store_path: store_override.unwrap_or_else(Self::default_store_path),
        }
    }

    pub fn default_store_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nudge")
            .join("store.json")
    }

    /// Create parent directory if it doesn't exist
    pub fn ensure_data_dir(&self) -> std::io::Result<()> {
        match self.store_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}

/// Logs go to stderr so they never mix with the rendered list
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
