use std::sync::Arc;

use crate::daemon::config::{Configuration, MessageContent};
use crate::domain::entity::NotificationMessage;
use crate::domain::repository::{notification::GetNotificationError, NotificationRepository};

/// A [`NotificationRepository`] implementation which reads configuration files.
pub struct NotificationConfiguration {
    config: Arc<Configuration>,
}

impl NotificationConfiguration {
    /// Creates a new [`NotificationConfiguration`].
    pub fn new(config: Arc<Configuration>) -> Self {
        Self { config }
    }

    fn message(section: &MessageContent) -> Result<NotificationMessage, GetNotificationError> {
        NotificationMessage::try_new(section.summary.clone(), section.body.clone())
            .map_err(|err| GetNotificationError::Invalid { source: err })
    }
}

#[async_trait::async_trait]
impl NotificationRepository for NotificationConfiguration {
    async fn remaining_notification(&self) -> Result<NotificationMessage, GetNotificationError> {
        Self::message(&self.config.notification.remaining)
    }

    async fn expired_notification(&self) -> Result<NotificationMessage, GetNotificationError> {
        Self::message(&self.config.notification.expired)
    }
}
