use colored::*;
use jiff::Timestamp;
use unicode_width::UnicodeWidthStr;

use crate::{
    models::{
        stats::Stats,
        store::DEFAULT_THEME,
        task::Task,
    },
    presenter::Presenter,
    services::tasks::EditDraft,
    urgency::{Urgency, classify},
};

const PROGRESS_WIDTH: usize = 20;

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

/// Themes recognised by the terminal presenter
pub const THEMES: [&str; 4] = [DEFAULT_THEME, "ocean", "forest", "sunset"];

pub struct TerminalPresenter {
    theme: String,
}

impl TerminalPresenter {
    pub fn new(theme: &str) -> Self {
        Self {
            theme: theme.to_string(),
        }
    }

    pub fn set_theme(&mut self, theme: &str) {
        self.theme = theme.to_string();
    }

    fn accent(&self, text: &str) -> ColoredString {
        match self.theme.as_str() {
            "ocean" => text.blue(),
            "forest" => text.green(),
            "sunset" => text.magenta(),
            _ => text.cyan(),
        }
    }
}

impl Presenter for TerminalPresenter {
    fn render(&mut self, tasks: &[Task], stats: &Stats) {
        let now = Timestamp::now();
        let width = get_terminal_width();

        println!(
            "\n  {}  {}  {}",
            self.accent("TASKS").bold(),
            self.accent(&progress_bar(stats.progress_percent, PROGRESS_WIDTH)),
            format!("{} / {}", stats.completed_count, stats.total_count).bold()
        );
        println!("  {}\n", stats.status.to_string().dimmed());

        for (index, task) in tasks.iter().enumerate() {
            println!("{}", format_task_line(index, task, now, width));
        }
        if !tasks.is_empty() {
            println!();
        }
    }

    fn celebrate(&mut self) {
        let confetti = "✦ ✧ ✦ ✧ ✦";
        println!(
            "  {}  {}  {}\n",
            confetti.yellow(),
            "All tasks completed!".green().bold(),
            confetti.magenta()
        );
    }

    fn notify(&mut self, task_text: &str) {
        // Terminal bell
        print!("\x07");
        println!("{} {}", "Task Reminder:".yellow().bold(), task_text);
    }
}

/// Draws a fixed-width bar such as `[#####---------------]`
pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Get the appropriate status glyph for a task
pub fn get_status_glyph(task: &Task, urgency: Urgency) -> ColoredString {
    if task.completed {
        "✓".dimmed()
    } else if task.is_locked() {
        "◆".yellow()
    } else if urgency == Urgency::Overdue {
        "●".red()
    } else {
        "○".normal()
    }
}

fn color_for_urgency(text: &str, urgency: Urgency) -> ColoredString {
    match urgency {
        Urgency::None => text.normal(),
        Urgency::Overdue => text.red().bold(),
        Urgency::DueSoon => text.yellow(),
        Urgency::Warning { .. } => text.magenta(),
        Urgency::Attention => text.green(),
    }
}

/// Format a reminder in local time (e.g., "Mar 01 14:30")
pub fn format_reminder(timestamp: Timestamp) -> String {
    let zoned = jiff::Zoned::new(timestamp, jiff::tz::TimeZone::system());
    zoned.strftime("%b %d %H:%M").to_string()
}

/// One list line: number, glyph, text, and the urgency label right-aligned
pub fn format_task_line(index: usize, task: &Task, now: Timestamp, terminal_width: usize) -> String {
    let urgency = classify(task.reminder_time, now);

    let number = format!("{:>3}", index + 1);
    let glyph = get_status_glyph(task, urgency);
    let text = task.display_text();

    let left_section = format!("  {}  {}  {}", number, glyph, text);
    let styled_left = if task.completed {
        left_section.dimmed()
    } else if task.is_locked() {
        left_section.italic()
    } else {
        left_section.bold()
    };

    let Some(reminder_time) = task.reminder_time else {
        return styled_left.to_string();
    };

    let label = urgency.label();
    let when = format_reminder(reminder_time);

    // Terminal columns without ANSI codes; the glyph is a single column
    let left_visible_len = format!("  {}  {}  {}", number, " ", text).width();
    let right_visible_len = label.width() + "  ·  ".width() + when.width();
    let total_content = left_visible_len + right_visible_len;

    let right_section = format!(
        "{}  ·  {}",
        color_for_urgency(&label, urgency),
        when.dimmed()
    );

    if total_content + 4 < terminal_width {
        let padding = terminal_width - total_content - 2;
        format!("{}{}{}", styled_left, " ".repeat(padding), right_section)
    } else {
        // Not enough space for right alignment
        format!("{}  {}", styled_left, right_section)
    }
}

/// Print the values staged by an edit
pub fn render_edit_draft(index: usize, draft: &EditDraft) {
    println!(
        "\n  {} #{}: {}",
        "Editing".cyan().bold(),
        index + 1,
        draft.text.bold()
    );
    match draft.reminder_time {
        Some(reminder_time) => println!("  {} {}", "Reminder:".dimmed(), format_reminder(reminder_time)),
        None => println!("  {}", "No reminder".dimmed()),
    }
    println!(
        "  {}\n",
        "Submit with `add <text>` or drop it with `cancel`".dimmed()
    );
}

/// Print the summary line on its own
pub fn render_stats(stats: &Stats) {
    println!(
        "{} / {} completed ({:.0}%) · {}",
        stats.completed_count, stats.total_count, stats.progress_percent, stats.status
    );
}
