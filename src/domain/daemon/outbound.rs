//! Ports the daemon drives: the desktop notifier, the countdown display and
//! the wall clock.

use std::error::Error as StdError;

use chrono::{DateTime, Utc};
use snafu::prelude::*;

use crate::domain::entity::notification::NotificationMessage;

/// Shows desktop notifications.
#[async_trait::async_trait]
pub trait NotifyPort: Send + Sync + 'static {
    /// Show one notification. Suppressing it is not an error.
    ///
    /// # Errors
    ///
    /// This function will return an error if the notification server refused
    /// the request.
    async fn notify(&self, request: NotifyRequest) -> Result<(), NotifyError>;
}

/// A notification with every placeholder already substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyRequest {
    pub summary: String,
    pub body: Option<String>,
}

impl From<NotificationMessage> for NotifyRequest {
    fn from(message: NotificationMessage) -> Self {
        let (summary, body) = message.into_parts();
        Self { summary, body }
    }
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum NotifyError {
    #[snafu(whatever, display("Could not show notification: {message}"))]
    Unknown {
        message: String,
        #[snafu(source(from(Box<dyn StdError>, Some)))]
        source: Option<Box<dyn StdError>>,
    },
}

/// A public port for presenting the countdown to the user.
#[async_trait::async_trait]
pub trait DisplayPort: Send + Sync + 'static {
    /// Present the result of one tick.
    async fn publish(&self, update: &DisplayUpdate);

    /// Hide the countdown after it has been cleared.
    async fn clear(&self);
}

/// What one tick hands over to the display.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayUpdate {
    /// Progress in `[0, 100]`.
    pub progress: f64,
    /// The remaining time label. `None` if it is the same as last tick's.
    pub label: Option<String>,
    pub blink: bool,
    pub expired: bool,
}

/// A public port for reading the wall clock.
pub trait ClockPort: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}
