use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;

use crate::models::store::Store;

pub mod json;
pub mod migrations;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to load store from '{path}': {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON from '{path}': {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to save store to '{path}': {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize store to JSON: {source}")]
    SerializeFailed {
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to move unreadable store to '{path}': {source}")]
    SetAsideFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store file has a malformed version field: {0}")]
    InvalidVersion(String),

    #[error(
        "Store file was created by a newer version of nudge (version {0}). Please upgrade nudge to open this file."
    )]
    FutureVersion(u32),

    #[error("Store file has unsupported version {0}. This version of nudge cannot read this file.")]
    UnsupportedVersion(u32),
}

pub trait Storage {
    fn load(&self) -> Result<Store, StorageError>;
    fn save(&self, store: &Store) -> Result<(), StorageError>;

    /// Moves a store that failed to load out of the way, so the next save
    /// does not overwrite it. Returns where it went.
    fn set_aside(&self) -> Result<Option<PathBuf>, StorageError> {
        Ok(None)
    }
}

/// Loads the store, starting empty when nothing usable is on disk.
pub fn load_or_empty(storage: &impl Storage) -> Store {
    match storage.load() {
        Ok(store) => store,
        Err(e) => {
            warn!(error = %e, "could not load saved tasks, starting with an empty list");
            set_aside_unreadable(storage);
            Store::default()
        }
    }
}

pub fn set_aside_unreadable(storage: &impl Storage) {
    match storage.set_aside() {
        Ok(Some(path)) => warn!(path = %path.display(), "kept the unreadable store"),
        Ok(None) => {}
        Err(e) => warn!(error = %e, "could not keep the unreadable store"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::task::Task, testing::MemoryStorage};

    #[test]
    fn test_load_or_empty_returns_saved_store() {
        let storage = MemoryStorage::default();
        let store = Store {
            tasks: vec![Task::new(String::from("Buy milk"), None)],
            ..Store::default()
        };
        storage.save(&store).unwrap();

        assert_eq!(load_or_empty(&storage), store);
    }

    #[test]
    fn test_load_or_empty_degrades_on_failure() {
        let storage = MemoryStorage::failing_loads();
        assert_eq!(load_or_empty(&storage), Store::default());
    }
}
