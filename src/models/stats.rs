use std::fmt;

use crate::models::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMessage {
    NoTasks,
    AllComplete,
    Encouragement,
    KeepWorking,
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            StatusMessage::NoTasks => "Please add tasks",
            StatusMessage::AllComplete => "All tasks completed!",
            StatusMessage::Encouragement => "Good job! Keep going!",
            StatusMessage::KeepWorking => "Keep working on your tasks",
        };
        f.write_str(message)
    }
}

/// Aggregate progress over the whole list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub completed_count: usize,
    pub total_count: usize,
    pub progress_percent: f64,
    pub status: StatusMessage,
}

impl Stats {
    pub fn compute(tasks: &[Task]) -> Self {
        let completed_count = tasks.iter().filter(|t| t.completed).count();
        let total_count = tasks.len();

        let progress_percent = if total_count == 0 {
            0.0
        } else {
            100.0 * completed_count as f64 / total_count as f64
        };

        // Order matters: an all-complete list also satisfies the half-way check
        let status = if total_count == 0 {
            StatusMessage::NoTasks
        } else if completed_count == total_count {
            StatusMessage::AllComplete
        } else if 2 * completed_count >= total_count {
            StatusMessage::Encouragement
        } else {
            StatusMessage::KeepWorking
        };

        Self {
            completed_count,
            total_count,
            progress_percent,
            status,
        }
    }

    pub fn is_all_complete(&self) -> bool {
        self.status == StatusMessage::AllComplete
    }
}
