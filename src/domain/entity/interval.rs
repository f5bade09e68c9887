use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use snafu::prelude::*;

/// The persisted pair of timestamps that defines a countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl CountdownInterval {
    /// Creates a new [`CountdownInterval`]. `end` is not required to be later
    /// than `start`, such an interval simply expires immediately.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Returns the time when this countdown was created.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the target time of this countdown.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns the total length of this countdown, clamped to zero.
    pub fn duration(&self) -> Duration {
        (self.end - self.start).to_std().unwrap_or(Duration::ZERO)
    }

    /// Returns the time left from `now` to the end, clamped to zero.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.end - now).to_std().unwrap_or(Duration::ZERO)
    }
}

/// Encode a timestamp in ISO-8601. Fractional seconds are written with as
/// many digits as needed, so [`parse_timestamp`] gives back the same value.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Decode an ISO-8601 timestamp with any offset into UTC.
///
/// # Errors
///
/// This function will return an error if the text is not a valid timestamp.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, ParseTimestampError> {
    let timestamp = DateTime::parse_from_rfc3339(text.trim()).context(InvalidSnafu {
        text: text.to_owned(),
    })?;
    Ok(timestamp.with_timezone(&Utc))
}

/// An error type of decoding a timestamp.
#[derive(Debug, Clone, Snafu, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseTimestampError {
    #[snafu(display("Could not parse {text:?} as an ISO-8601 timestamp"))]
    #[non_exhaustive]
    Invalid {
        text: String,
        source: chrono::ParseError,
    },
}
