use std::error::Error as StdError;

use snafu::prelude::*;

use crate::domain::entity::notification::{NotificationMessage, TryNewNotificationMessageError};

/// Source of the notification templates.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait NotificationRepository: Send + Sync + 'static {
    /// Template shown when the remaining time crosses a threshold.
    ///
    /// # Errors
    ///
    /// This function will return an error if the template is missing or
    /// invalid.
    async fn remaining_notification(&self) -> Result<NotificationMessage, GetNotificationError>;

    /// Template shown once when the countdown expires.
    ///
    /// # Errors
    ///
    /// This function will return an error if the template is missing or
    /// invalid.
    async fn expired_notification(&self) -> Result<NotificationMessage, GetNotificationError>;
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum GetNotificationError {
    #[snafu(display("Notification template is invalid"))]
    #[non_exhaustive]
    Invalid {
        source: TryNewNotificationMessageError,
    },
    #[snafu(whatever, display("Could not get notification template: {message}"))]
    #[non_exhaustive]
    Unknown {
        message: String,
        #[snafu(source(from(Box<dyn StdError>, Some)))]
        source: Option<Box<dyn StdError>>,
    },
}
