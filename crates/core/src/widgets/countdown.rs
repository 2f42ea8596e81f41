//! Flash-sale countdown.

use std::fmt;

use chrono::{DateTime, Utc};

/// Hours/minutes/seconds left until a sale ends.
///
/// Counts down one second per [`tick`](Self::tick) and holds at `00:00:00`;
/// it never goes negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Countdown {
    remaining_secs: u64,
}

impl Countdown {
    /// Countdown from a number of seconds.
    #[must_use]
    pub const fn from_secs(remaining_secs: u64) -> Self {
        Self { remaining_secs }
    }

    /// Countdown from `now` until `ends_at`; zero if the end is already past.
    #[must_use]
    pub fn until(ends_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let secs = (ends_at - now).num_seconds();
        Self::from_secs(u64::try_from(secs).unwrap_or(0))
    }

    /// Advance one second. Returns `false` if the countdown was already at zero.
    pub const fn tick(&mut self) -> bool {
        if self.remaining_secs == 0 {
            return false;
        }
        self.remaining_secs -= 1;
        true
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.remaining_secs == 0
    }

    #[must_use]
    pub const fn hours(&self) -> u64 {
        self.remaining_secs / 3600
    }

    #[must_use]
    pub const fn minutes(&self) -> u64 {
        (self.remaining_secs % 3600) / 60
    }

    #[must_use]
    pub const fn seconds(&self) -> u64 {
        self.remaining_secs % 60
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours(),
            self.minutes(),
            self.seconds()
        )
    }
}
