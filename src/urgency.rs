use jiff::{SignedDuration, Timestamp};

const ONE_HOUR: SignedDuration = SignedDuration::from_hours(1);
const ONE_DAY: SignedDuration = SignedDuration::from_hours(24);

/// How close a reminder is, evaluated against the clock at call time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    None,
    Overdue,
    DueSoon,
    Warning { hours: i64 },
    Attention,
}

impl Urgency {
    pub fn bucket(&self) -> &'static str {
        match self {
            Urgency::None => "none",
            Urgency::Overdue => "overdue",
            Urgency::DueSoon => "due-soon",
            Urgency::Warning { .. } => "warning",
            Urgency::Attention => "attention",
        }
    }

    pub fn label(&self) -> String {
        match self {
            Urgency::None => String::from("No reminder"),
            Urgency::Overdue => String::from("Overdue"),
            Urgency::DueSoon => String::from("Less than 1 hour"),
            Urgency::Warning { hours } => format!("In {} hours", hours),
            Urgency::Attention => String::from("Plenty of time"),
        }
    }
}

/// Buckets are inclusive on their lower bound: exactly one hour left is a
/// warning, exactly a day left is attention, and zero left is overdue.
pub fn classify(reminder_time: Option<Timestamp>, now: Timestamp) -> Urgency {
    let Some(reminder_time) = reminder_time else {
        return Urgency::None;
    };

    let time_left = reminder_time.duration_since(now);

    if time_left <= SignedDuration::ZERO {
        Urgency::Overdue
    } else if time_left < ONE_HOUR {
        Urgency::DueSoon
    } else if time_left < ONE_DAY {
        Urgency::Warning {
            hours: time_left.as_hours(),
        }
    } else {
        Urgency::Attention
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> Timestamp {
        "2025-03-01T12:00:00Z".parse().unwrap()
    }

    fn after(duration: SignedDuration) -> Option<Timestamp> {
        Some(now().checked_add(duration).unwrap())
    }

    #[test]
    fn test_absent_reminder() {
        assert_eq!(classify(None, now()), Urgency::None);
        assert_eq!(Urgency::None.bucket(), "none");
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(classify(after(SignedDuration::ZERO), now()), Urgency::Overdue);
        assert_eq!(
            classify(after(SignedDuration::from_secs(-1)), now()),
            Urgency::Overdue
        );
        assert_eq!(
            classify(after(SignedDuration::from_millis(1)), now()),
            Urgency::DueSoon
        );
        assert_eq!(
            classify(after(SignedDuration::from_secs(3599)), now()),
            Urgency::DueSoon
        );
        assert_eq!(
            classify(after(ONE_HOUR), now()),
            Urgency::Warning { hours: 1 }
        );
        assert_eq!(classify(after(ONE_DAY), now()), Urgency::Attention);
    }

    #[test]
    fn test_warning_hours_round_down() {
        let urgency = classify(after(SignedDuration::from_mins(5 * 60 + 59)), now());
        assert_eq!(urgency, Urgency::Warning { hours: 5 });
        assert_eq!(urgency.label(), "In 5 hours");
        assert_eq!(urgency.bucket(), "warning");

        let urgency = classify(after(SignedDuration::from_secs(86_399)), now());
        assert_eq!(urgency, Urgency::Warning { hours: 23 });
    }

    #[test]
    fn test_same_reminder_moves_between_buckets_as_time_passes() {
        let reminder = after(SignedDuration::from_mins(90));
        assert_eq!(classify(reminder, now()).bucket(), "warning");

        let later = now().checked_add(SignedDuration::from_mins(45)).unwrap();
        assert_eq!(classify(reminder, later).bucket(), "due-soon");

        let much_later = now().checked_add(SignedDuration::from_hours(3)).unwrap();
        assert_eq!(classify(reminder, much_later).label(), "Overdue");
    }
}
