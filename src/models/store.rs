use serde::{Deserialize, Serialize};

use crate::models::task::Task;

/// Current schema version
pub const CURRENT_VERSION: u32 = 2;

/// Theme used when none has been chosen
pub const DEFAULT_THEME: &str = "default";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Store {
    pub version: u32,
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Only read by the presentation layer
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

impl Default for Store {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            tasks: vec![],
            theme: default_theme(),
        }
    }
}
