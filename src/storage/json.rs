use std::{
    fs::{self, OpenOptions, rename, write},
    path::{Path, PathBuf},
};

use fs2::FileExt;
use serde_json::to_string_pretty;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    models::store::{CURRENT_VERSION, Store},
    storage::{
        Storage, StorageError,
        migrations::{apply_migrations, detect_version},
    },
};

pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn get_backup_dir(&self) -> PathBuf {
        let parent_store_path = self.path.parent().unwrap_or(Path::new("."));
        parent_store_path.join("backups")
    }

    fn get_set_aside_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("store.json"));
        let timestamp = jiff::Timestamp::now().strftime("%Y%m%dT%H%M%S%.fZ");

        self.get_backup_dir()
            .join(format!("{}.unreadable-{}", file_name, timestamp))
    }

    fn parse_failed(&self, source: serde_json::Error) -> StorageError {
        StorageError::ParseFailed {
            path: self.path.clone(),
            source,
        }
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> Result<Store, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Store::default()),
            Err(e) => {
                return Err(StorageError::LoadFailed {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        let mut data: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| self.parse_failed(e))?;

        let file_version = detect_version(&data)?;
        if file_version > CURRENT_VERSION {
            return Err(StorageError::FutureVersion(file_version));
        }

        if file_version < CURRENT_VERSION {
            info!(
                from = file_version,
                to = CURRENT_VERSION,
                path = %self.path.display(),
                "migrating task store"
            );
            data = apply_migrations(data, file_version, CURRENT_VERSION)?;
        }

        serde_json::from_value(data).map_err(|e| self.parse_failed(e))
    }

    fn save(&self, store: &Store) -> Result<(), StorageError> {
        let json =
            to_string_pretty(store).map_err(|e| StorageError::SerializeFailed { source: e })?;

        let unique_temp = format!("{}.tmp.{}", self.path.display(), Uuid::new_v4());
        let temp_path = PathBuf::from(&unique_temp);
        write(&temp_path, json).map_err(|e| StorageError::SaveFailed {
            path: temp_path.clone(),
            source: e,
        })?;

        let lock_file_path = self.path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_file_path)
            .map_err(|e| StorageError::SaveFailed {
                path: lock_file_path.clone(),
                source: e,
            })?;
        lock_file
            .lock_exclusive()
            .map_err(|e| StorageError::SaveFailed {
                path: lock_file_path,
                source: e,
            })?;

        let renamed = rename(&temp_path, &self.path);
        let unlocked = lock_file.unlock();

        renamed.map_err(|e| {
            let _ = std::fs::remove_file(&temp_path);
            StorageError::SaveFailed {
                path: self.path.clone(),
                source: e,
            }
        })?;
        unlocked.map_err(|e| StorageError::SaveFailed {
            path: self.path.clone(),
            source: e,
        })?;

        debug!(tasks = store.tasks.len(), path = %self.path.display(), "saved task store");
        Ok(())
    }

    fn set_aside(&self) -> Result<Option<PathBuf>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let target = self.get_set_aside_path();
        let set_aside_failed = |source: std::io::Error| StorageError::SetAsideFailed {
            path: target.clone(),
            source,
        };
        fs::create_dir_all(self.get_backup_dir()).map_err(set_aside_failed)?;
        rename(&self.path, &target).map_err(set_aside_failed)?;

        info!(from = %self.path.display(), to = %target.display(), "moved unreadable task store");
        Ok(Some(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::task::Task,
        services::tasks::{AddTaskParameters, TaskStore},
        testing::RecordingPresenter,
    };

    fn storage_in(dir: &tempfile::TempDir) -> JsonFileStorage {
        JsonFileStorage::new(dir.path().join("store.json"))
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);

        let reminder: jiff::Timestamp = "2025-03-01T14:30:00Z".parse().unwrap();
        let store = Store {
            tasks: vec![
                Task::new(String::from("Buy milk"), Some(reminder)),
                Task {
                    completed: true,
                    ..Task::secret(String::from("Gift"), None, String::from("1234"))
                },
            ],
            theme: String::from("ocean"),
            ..Store::default()
        };

        storage.save(&store).expect("Should correctly save the store");
        let loaded = storage.load().expect("Should correctly load the saved store");
        assert_eq!(loaded, store);
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);
        storage.save(&Store::default()).unwrap();

        let leftovers = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp."))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = storage_in(&dir).load().unwrap();
        assert_eq!(store, Store::default());
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);
        std::fs::write(dir.path().join("store.json"), "{ this is not valid json }").unwrap();

        match storage.load() {
            Err(StorageError::ParseFailed { .. }) => {}
            other => panic!("Expected ParseFailed error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_future_version() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);
        std::fs::write(
            dir.path().join("store.json"),
            r#"{ "version": 999, "tasks": [], "theme": "default" }"#,
        )
        .unwrap();

        assert!(matches!(storage.load(), Err(StorageError::FutureVersion(999))));
    }

    #[test]
    fn test_load_legacy_browser_array() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);
        let legacy = r#"[
            {"text": "Buy milk", "completed": false, "reminderTime": "", "isSecret": false, "password": null, "revealed": true},
            {"text": "Gift", "completed": true, "reminderTime": "2025-03-01T14:30:00Z", "isSecret": true, "password": "1234", "revealed": false}
        ]"#;
        std::fs::write(dir.path().join("store.json"), legacy).unwrap();

        let store = storage.load().unwrap();
        assert_eq!(store.version, CURRENT_VERSION);
        assert_eq!(store.tasks.len(), 2);
        assert_eq!(store.tasks[0].reminder_time, None);
        assert_eq!(
            store.tasks[1].reminder_time,
            Some("2025-03-01T14:30:00Z".parse().unwrap())
        );
        assert!(store.tasks[1].is_locked());
    }

    #[test]
    fn test_unreadable_store_survives_the_next_save() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = dir.path().join("store.json");
        let garbage = "{ written by hand, not json";
        std::fs::write(&store_path, garbage).unwrap();

        let mut store = TaskStore::open(storage_in(&dir), RecordingPresenter::default());
        assert!(store.tasks().is_empty());
        store
            .add_task(AddTaskParameters {
                text: String::from("Buy milk"),
                reminder_time: None,
                is_secret: false,
                password: String::new(),
            })
            .unwrap();

        let kept: Vec<_> = std::fs::read_dir(dir.path().join("backups"))
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .collect();
        assert_eq!(kept.len(), 1);
        assert!(
            kept[0]
                .file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("store.json.unreadable-")
        );
        assert_eq!(std::fs::read_to_string(&kept[0]).unwrap(), garbage);

        let reloaded = storage_in(&dir).load().unwrap();
        assert_eq!(reloaded.tasks[0].text, "Buy milk");
    }

    #[test]
    fn test_set_aside_without_a_file_does_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(storage_in(&dir).set_aside().unwrap(), None);
        assert!(!dir.path().join("backups").exists());
    }
}
