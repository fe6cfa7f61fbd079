use jiff::Timestamp;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    models::{stats::Stats, store::Store, task::Task},
    presenter::Presenter,
    services::secrets::{PlaintextVerifier, SecretVerifier},
    storage::{Storage, StorageError, load_or_empty, set_aside_unreadable},
    urgency::{Urgency, classify},
};

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task #{number} not found (the list has {len} tasks)", number = .index + 1)]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Task #{number} is secret. Reveal it before editing", number = .index + 1)]
    Locked { index: usize },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct AddTaskParameters {
    pub text: String,
    pub reminder_time: Option<Timestamp>,
    pub is_secret: bool,
    /// Ignored unless `is_secret` is set
    pub password: String,
}

/// Values staged for the input fields when an edit starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub text: String,
    pub reminder_time: Option<Timestamp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitted {
    Added(usize),
    Edited(usize),
    /// The text was empty after trimming
    Ignored,
}

/// Owns the task list. Every mutation is saved and then re-rendered.
pub struct TaskStore<S: Storage, P: Presenter> {
    store: Store,
    storage: S,
    presenter: P,
    verifier: Box<dyn SecretVerifier>,
    pending_edit: Option<usize>,
    all_complete: bool,
    /// The last save failed, so memory is ahead of storage
    unsaved: bool,
}

impl<S: Storage, P: Presenter> TaskStore<S, P> {
    /// Loads whatever the storage holds. Nothing is rendered yet and a list
    /// that is already complete does not celebrate again.
    pub fn open(storage: S, presenter: P) -> Self {
        let store = load_or_empty(&storage);
        let all_complete = Stats::compute(&store.tasks).is_all_complete();

        Self {
            store,
            storage,
            presenter,
            verifier: Box::new(PlaintextVerifier),
            pending_edit: None,
            all_complete,
            unsaved: false,
        }
    }

    #[cfg(test)]
    pub fn with_verifier(mut self, verifier: impl SecretVerifier + 'static) -> Self {
        self.verifier = Box::new(verifier);
        self
    }

    pub fn tasks(&self) -> &[Task] {
        &self.store.tasks
    }

    pub fn task(&self, index: usize) -> Result<&Task, TaskError> {
        self.store.tasks.get(index).ok_or(TaskError::IndexOutOfRange {
            index,
            len: self.store.tasks.len(),
        })
    }

    pub fn stats(&self) -> Stats {
        Stats::compute(&self.store.tasks)
    }

    pub fn theme(&self) -> &str {
        &self.store.theme
    }

    pub fn pending_edit(&self) -> Option<usize> {
        self.pending_edit
    }

    #[cfg(test)]
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    #[cfg(test)]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Picks up changes other processes saved since the last load. Memory is
    /// kept when the last save failed or storage cannot be read. The pending
    /// edit survives while its index is still in the list.
    pub fn reload(&mut self) {
        if self.unsaved {
            debug!("skipping reload, memory has unsaved changes");
            return;
        }

        match self.storage.load() {
            Ok(store) => self.store = store,
            Err(e) => {
                warn!(error = %e, "could not reload saved tasks, keeping the current list");
                set_aside_unreadable(&self.storage);
                return;
            }
        }

        if let Some(index) = self.pending_edit
            && index >= self.store.tasks.len()
        {
            debug!(index, "pending edit no longer exists");
            self.pending_edit = None;
        }
    }

    /// Redraws without changing anything
    pub fn render(&mut self) {
        let stats = self.stats();
        self.presenter.render(&self.store.tasks, &stats);
    }

    pub fn add_task(&mut self, parameters: AddTaskParameters) -> Result<Option<usize>, TaskError> {
        let text = parameters.text.trim();
        if text.is_empty() {
            debug!("ignoring task with empty text");
            return Ok(None);
        }

        let task = if parameters.is_secret {
            Task::secret(
                text.to_string(),
                parameters.reminder_time,
                parameters.password,
            )
        } else {
            Task::new(text.to_string(), parameters.reminder_time)
        };

        let urgency = classify(task.reminder_time, Timestamp::now());
        self.store.tasks.push(task);
        let index = self.store.tasks.len() - 1;
        debug!(index, urgency = urgency.bucket(), "task added");

        self.commit()?;
        Ok(Some(index))
    }

    /// First half of an edit: records `index` as pending, replacing any
    /// earlier pending edit, and returns the values to stage.
    pub fn begin_edit(&mut self, index: usize) -> Result<EditDraft, TaskError> {
        let task = self.task(index)?;
        if task.is_locked() {
            return Err(TaskError::Locked { index });
        }

        let draft = EditDraft {
            text: task.text.clone(),
            reminder_time: task.reminder_time,
        };

        if let Some(previous) = self.pending_edit.replace(index)
            && previous != index
        {
            debug!(previous, index, "replacing pending edit");
        }

        Ok(draft)
    }

    pub fn cancel_edit(&mut self) -> Option<usize> {
        self.pending_edit.take()
    }

    /// Second half of an edit when one is pending, otherwise an add.
    pub fn add_or_edit_task(&mut self, parameters: AddTaskParameters) -> Result<Submitted, TaskError> {
        match self.pending_edit {
            Some(index) => {
                if parameters.text.trim().is_empty() {
                    return Ok(Submitted::Ignored);
                }
                self.pending_edit = None;
                self.edit_task(index, &parameters.text, parameters.reminder_time)?;
                Ok(Submitted::Edited(index))
            }
            None => Ok(self
                .add_task(parameters)?
                .map_or(Submitted::Ignored, Submitted::Added)),
        }
    }

    /// Overwrites text and reminder. Returns false when the text is empty.
    pub fn edit_task(
        &mut self,
        index: usize,
        text: &str,
        reminder_time: Option<Timestamp>,
    ) -> Result<bool, TaskError> {
        let task = self.task_mut(index)?;

        let text = text.trim();
        if text.is_empty() {
            return Ok(false);
        }

        task.text = text.to_string();
        task.reminder_time = reminder_time;

        self.commit()?;
        Ok(true)
    }

    /// Returns the new completed state
    pub fn toggle_complete(&mut self, index: usize) -> Result<bool, TaskError> {
        let task = self.task_mut(index)?;
        task.completed = !task.completed;
        let completed = task.completed;

        self.commit()?;
        Ok(completed)
    }

    pub fn delete_task(&mut self, index: usize) -> Result<Task, TaskError> {
        self.task(index)?;
        let removed = self.store.tasks.remove(index);

        // Keep a pending edit pointed at the same task
        self.pending_edit = match self.pending_edit {
            Some(pending) if pending == index => None,
            Some(pending) if pending > index => Some(pending - 1),
            pending => pending,
        };

        self.commit()?;
        Ok(removed)
    }

    /// True when `supplied` unlocks a secret task. Revealing is permanent;
    /// repeating it with the right password keeps returning true.
    pub fn reveal_task(&mut self, index: usize, supplied: &str) -> Result<bool, TaskError> {
        let task = self.task(index)?;

        let unlocked = match (task.is_secret, task.password.as_deref()) {
            (true, Some(expected)) => self.verifier.verify(expected, supplied),
            _ => false,
        };
        if !unlocked {
            debug!(index, "reveal rejected");
            return Ok(false);
        }

        if !task.revealed {
            self.store.tasks[index].revealed = true;
            self.commit()?;
        }
        Ok(true)
    }

    /// Returns false when there was no reminder to clear
    pub fn clear_reminder(&mut self, index: usize) -> Result<bool, TaskError> {
        let task = self.task_mut(index)?;
        if task.reminder_time.take().is_none() {
            return Ok(false);
        }

        self.commit()?;
        Ok(true)
    }

    pub fn set_theme(&mut self, theme: &str) -> Result<(), TaskError> {
        self.store.theme = theme.to_string();
        self.save()
    }

    /// Notifies and clears every open task whose reminder has come due.
    /// Completed tasks keep their reminder and stay quiet.
    pub fn fire_due_reminders(&mut self, now: Timestamp) -> Result<usize, TaskError> {
        let mut fired = 0;

        for task in self.store.tasks.iter_mut().filter(|t| !t.completed) {
            if classify(task.reminder_time, now) == Urgency::Overdue {
                self.presenter.notify(task.display_text());
                task.reminder_time = None;
                fired += 1;
            }
        }

        if fired > 0 {
            debug!(fired, "reminders fired");
            self.commit()?;
        }
        Ok(fired)
    }

    fn task_mut(&mut self, index: usize) -> Result<&mut Task, TaskError> {
        let len = self.store.tasks.len();
        self.store
            .tasks
            .get_mut(index)
            .ok_or(TaskError::IndexOutOfRange { index, len })
    }

    fn save(&mut self) -> Result<(), TaskError> {
        let saved = self.storage.save(&self.store);
        self.unsaved = saved.is_err();
        saved.map_err(TaskError::from)
    }

    /// Saves and re-renders. A failed save is reported after the render;
    /// the in-memory list stays as it is.
    fn commit(&mut self) -> Result<(), TaskError> {
        let saved = self.save();

        let stats = self.stats();
        self.presenter.render(&self.store.tasks, &stats);

        let all_complete = stats.is_all_complete();
        if all_complete && !self.all_complete {
            self.presenter.celebrate();
        }
        self.all_complete = all_complete;

        saved
    }
}
