//! Launch countdown shown on the lock screen.

use chrono::{DateTime, TimeDelta, Utc};

/// Time left until a launch instant, split into display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    days: i64,
    hours: i64,
    minutes: i64,
    seconds: i64,
}

impl Countdown {
    /// Time left from `now` until `target`. All zero once `target` has passed.
    #[must_use]
    pub fn between(now: DateTime<Utc>, target: DateTime<Utc>) -> Self {
        let remaining = target.signed_duration_since(now);
        if remaining <= TimeDelta::zero() {
            return Self::expired();
        }

        let total = remaining.num_seconds();
        Self {
            days: total / 86_400,
            hours: (total % 86_400) / 3_600,
            minutes: (total % 3_600) / 60,
            seconds: total % 60,
        }
    }

    /// Time left from the current instant.
    #[must_use]
    pub fn until(target: DateTime<Utc>) -> Self {
        Self::between(Utc::now(), target)
    }

    const fn expired() -> Self {
        Self {
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }

    /// Whether the launch instant has been reached.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }

    /// Display units as zero-padded values with their labels.
    #[must_use]
    pub fn units(&self) -> [(String, &'static str); 4] {
        [
            (format!("{:02}", self.days), "Days"),
            (format!("{:02}", self.hours), "Hours"),
            (format!("{:02}", self.minutes), "Mins"),
            (format!("{:02}", self.seconds), "Secs"),
        ]
    }
}
