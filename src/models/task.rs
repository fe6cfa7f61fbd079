use jiff::civil::DateTime;
use jiff::tz::TimeZone;
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

/// Text shown in place of a secret task until it is revealed
pub const SECRET_PLACEHOLDER: &str = "Secret Task";

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Description of the task
    pub text: String,
    /// Whether the task has been checked off
    #[serde(default)]
    pub completed: bool,
    /// When the reminder fires. Cleared once it fires or is cleared by hand
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<Timestamp>,
    /// Secret tasks hide their text until revealed
    #[serde(default)]
    pub is_secret: bool,
    /// Unlock password, only ever set on secret tasks
    #[serde(default)]
    pub password: Option<String>,
    /// Whether the text may be shown
    pub revealed: bool,
}

impl Task {
    pub fn new(text: String, reminder_time: Option<Timestamp>) -> Self {
        Self {
            text,
            completed: false,
            reminder_time,
            is_secret: false,
            password: None,
            revealed: true,
        }
    }

    pub fn secret(text: String, reminder_time: Option<Timestamp>, password: String) -> Self {
        Self {
            text,
            completed: false,
            reminder_time,
            is_secret: true,
            password: Some(password),
            revealed: false,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.is_secret && !self.revealed
    }

    /// The text as it may be displayed right now
    pub fn display_text(&self) -> &str {
        if self.is_locked() {
            SECRET_PLACEHOLDER
        } else {
            &self.text
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReminderParseError {
    #[error("Invalid reminder '{0}': expected a duration like '30m' or a date like '2025-03-01T14:30'")]
    Unrecognized(String),

    #[error("Reminder '{0}' is out of range")]
    OutOfRange(String),
}

/// Parses an absolute reminder: an RFC 3339 timestamp, or a civil date-time
/// (the `datetime-local` form) in the system time zone.
pub fn parse_reminder_timestamp(input: &str) -> Option<Timestamp> {
    let input = input.trim();
    if let Ok(timestamp) = input.parse::<Timestamp>() {
        return Some(timestamp);
    }
    let civil: DateTime = input.parse().ok()?;
    civil
        .to_zoned(TimeZone::system())
        .ok()
        .map(|zoned| zoned.timestamp())
}

/// Parses `--remind` input, either absolute or relative to `now`.
pub fn parse_reminder(input: &str, now: Timestamp) -> Result<Timestamp, ReminderParseError> {
    if let Some(timestamp) = parse_reminder_timestamp(input) {
        return Ok(timestamp);
    }

    let relative = input.trim();
    let relative = relative.strip_prefix("in ").unwrap_or(relative);
    let duration: SignedDuration = relative
        .parse()
        .map_err(|_| ReminderParseError::Unrecognized(input.to_string()))?;

    now.checked_add(duration)
        .map_err(|_| ReminderParseError::OutOfRange(input.to_string()))
}
