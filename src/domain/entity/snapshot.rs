use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::entity::interval::CountdownInterval;

/// Label shown once a countdown has reached its end.
pub const EXPIRED_LABEL: &str = "Time is up";

const HOUR_MS: u128 = 3_600_000;
const MINUTE_MS: u128 = 60_000;

/// Values derived from a [`CountdownInterval`] at one point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSnapshot {
    elapsed_fraction: f64,
    remaining: Duration,
    hours: u64,
    minutes: u64,
}

impl TickSnapshot {
    /// Compute a [`TickSnapshot`] of `interval` at `now`.
    ///
    /// The remaining time is split into whole hours and the minutes left in
    /// the current partial hour, rounded up. So 61 seconds are shown as
    /// `0 h 2 min`, and `0 h 1 min` means that at most one minute is left.
    /// The remaining time is kept in whole milliseconds, so a snapshot is
    /// expired exactly when its label is [`RemainingLabel::Expired`].
    pub fn compute(interval: &CountdownInterval, now: DateTime<Utc>) -> Self {
        let total = interval.duration();
        let remaining_ms = interval.remaining(now).as_millis();
        let remaining = Duration::from_millis(u64::try_from(remaining_ms).unwrap_or(u64::MAX));

        let elapsed_fraction = if total.is_zero() {
            0.0
        } else {
            (1.0 - remaining.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
        };

        let hours = (remaining_ms / HOUR_MS) as u64;
        let minutes = (remaining_ms % HOUR_MS).div_ceil(MINUTE_MS) as u64;

        Self {
            elapsed_fraction,
            remaining,
            hours,
            minutes,
        }
    }

    /// Returns the elapsed part of the interval in `[0, 1]`.
    pub fn elapsed_fraction(&self) -> f64 {
        self.elapsed_fraction
    }

    /// Returns the progress as a percentage in `[0, 100]`.
    pub fn percent(&self) -> f64 {
        self.elapsed_fraction * 100.0
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn hours(&self) -> u64 {
        self.hours
    }

    pub fn minutes(&self) -> u64 {
        self.minutes
    }

    /// Returns `true` if no time is left.
    pub fn is_expired(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Returns `true` if the remaining time is worth emphasizing: every
    /// quarter of an hour, and at 10, 5 and 1 minutes in the last hour.
    pub fn threshold_crossed(&self) -> bool {
        self.minutes % 15 == 0 || (self.hours == 0 && matches!(self.minutes, 1 | 5 | 10))
    }

    /// Returns the `(hours, minutes)` pair used to detect label changes.
    pub fn label_key(&self) -> (u64, u64) {
        (self.hours, self.minutes)
    }

    /// Returns the human-readable remaining time.
    pub fn label(&self) -> RemainingLabel {
        if self.hours > 0 {
            RemainingLabel::Hours {
                hours: self.hours,
                minutes: self.minutes,
            }
        } else if self.minutes > 0 {
            RemainingLabel::Minutes {
                minutes: self.minutes,
            }
        } else {
            RemainingLabel::Expired
        }
    }
}

/// The remaining time as displayed to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainingLabel {
    Hours { hours: u64, minutes: u64 },
    Minutes { minutes: u64 },
    Expired,
}

impl Display for RemainingLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Hours { hours, minutes } => write!(f, "{hours} h {minutes:02} min"),
            Self::Minutes { minutes } => write!(f, "{minutes} min"),
            Self::Expired => f.write_str(EXPIRED_LABEL),
        }
    }
}
