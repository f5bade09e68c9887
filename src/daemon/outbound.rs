use chrono::{DateTime, Utc};
use notify_rust::Notification;
use snafu::prelude::*;
use tokio::sync::OnceCell;

use crate::domain::daemon::outbound::{
    ClockPort, DisplayPort, DisplayUpdate, NotifyError, NotifyPort, NotifyRequest,
};

/// Desktop notifications through the notification server of the session.
/// Notifications are dropped silently when they are disabled or no server
/// answers.
#[derive(Debug)]
pub struct NotifyService {
    app_name: String,
    enabled: bool,
    available: OnceCell<bool>,
}

impl NotifyService {
    pub fn new(app_name: String, enabled: bool) -> Self {
        Self {
            app_name,
            enabled,
            available: OnceCell::new(),
        }
    }

    /// Ask the notification server once and remember the answer for the rest
    /// of the process.
    async fn is_available(&self) -> bool {
        *self.available.get_or_init(detect_service).await
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
async fn detect_service() -> bool {
    let res = tokio::task::spawn_blocking(notify_rust::get_server_information).await;
    match res {
        Ok(Ok(info)) => {
            tracing::debug!(server = info.name, "Found notification server");
            true
        }
        Ok(Err(err)) => {
            tracing::warn!(%err, "No notification server, notifications are disabled");
            false
        }
        Err(_) => false,
    }
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
async fn detect_service() -> bool {
    true
}

#[async_trait::async_trait]
impl NotifyPort for NotifyService {
    async fn notify(&self, request: NotifyRequest) -> Result<(), NotifyError> {
        if !self.enabled || !self.is_available().await {
            tracing::debug!(summary = request.summary, "Suppressed notification");
            return Ok(());
        }

        let mut notification = Notification::new();
        notification.appname(&self.app_name);
        notification.summary(&request.summary);

        if let Some(body) = request.body {
            notification.body(&body);
        }

        whatever!(
            notification.show_async().await,
            "Could not show notification",
        );

        Ok(())
    }
}

/// A [`DisplayPort`] implementation for a headless daemon. Label changes are
/// logged, the per-second progress only at trace level.
#[derive(Debug, Default)]
pub struct DisplayLogger;

#[async_trait::async_trait]
impl DisplayPort for DisplayLogger {
    async fn publish(&self, update: &DisplayUpdate) {
        match &update.label {
            Some(label) => tracing::info!(
                %label,
                progress = update.progress,
                blink = update.blink,
                expired = update.expired,
                "Countdown updated"
            ),
            None => tracing::trace!(progress = update.progress, "Countdown ticked"),
        }
    }

    async fn clear(&self) {
        tracing::info!("Countdown hidden");
    }
}

/// The real wall clock.
#[derive(Debug, Default)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
