//! Test doubles for the storage and presentation seams.

use std::cell::{Cell, RefCell};
use std::path::PathBuf;

use crate::{
    models::{stats::Stats, store::Store, task::Task},
    presenter::Presenter,
    storage::{Storage, StorageError},
};

#[derive(Default)]
pub struct MemoryStorage {
    saved: RefCell<Option<Store>>,
    pub saves: Cell<usize>,
    pub fail_saves: Cell<bool>,
    fail_loads: bool,
}

impl MemoryStorage {
    pub fn with_store(store: Store) -> Self {
        Self {
            saved: RefCell::new(Some(store)),
            ..Self::default()
        }
    }

    pub fn failing_loads() -> Self {
        Self {
            fail_loads: true,
            ..Self::default()
        }
    }

    pub fn saved(&self) -> Option<Store> {
        self.saved.borrow().clone()
    }
}

fn io_failure() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only")
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Store, StorageError> {
        if self.fail_loads {
            return Err(StorageError::LoadFailed {
                path: PathBuf::from("<memory>"),
                source: io_failure(),
            });
        }
        Ok(self.saved.borrow().clone().unwrap_or_default())
    }

    fn save(&self, store: &Store) -> Result<(), StorageError> {
        if self.fail_saves.get() {
            return Err(StorageError::SaveFailed {
                path: PathBuf::from("<memory>"),
                source: io_failure(),
            });
        }
        self.saves.set(self.saves.get() + 1);
        *self.saved.borrow_mut() = Some(store.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingPresenter {
    pub renders: Vec<(Vec<Task>, Stats)>,
    pub celebrations: usize,
    pub notifications: Vec<String>,
}

impl RecordingPresenter {
    pub fn last_stats(&self) -> Option<Stats> {
        self.renders.last().map(|(_, stats)| *stats)
    }
}

impl Presenter for RecordingPresenter {
    fn render(&mut self, tasks: &[Task], stats: &Stats) {
        self.renders.push((tasks.to_vec(), *stats));
    }

    fn celebrate(&mut self) {
        self.celebrations += 1;
    }

    fn notify(&mut self, task_text: &str) {
        self.notifications.push(task_text.to_string());
    }
}
