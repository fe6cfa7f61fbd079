use crate::models::{stats::Stats, task::Task};

/// What the task store tells whoever is drawing it
pub trait Presenter {
    /// Called after every mutation with the full list
    fn render(&mut self, tasks: &[Task], stats: &Stats);
    /// Called once each time the list becomes fully complete
    fn celebrate(&mut self);
    /// Called once when a reminder comes due
    fn notify(&mut self, task_text: &str);
}
