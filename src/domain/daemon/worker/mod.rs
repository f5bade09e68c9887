mod handle;
mod routine;
mod state;

pub use handle::{Command, QueryResponse, WorkerHandle};

use std::sync::Arc;

use snafu::prelude::*;

use crate::domain::daemon::outbound::{ClockPort, DisplayPort, NotifyPort};
use crate::domain::repository::notification::{GetNotificationError, NotificationRepository};
use crate::domain::repository::IntervalRepository;

use routine::{WorkerConfig, WorkerContext, WorkerRoutine};

/// Spawn the background worker that owns the countdown. The persisted
/// interval is restored by the worker itself before it accepts commands.
///
/// # Errors
///
/// This function will return an error if the notification messages could not
/// be loaded.
pub async fn spawn(
    interval_repository: Arc<dyn IntervalRepository>,
    notification_repository: Arc<dyn NotificationRepository>,
    notifier: Arc<dyn NotifyPort>,
    display: Arc<dyn DisplayPort>,
    clock: Arc<dyn ClockPort>,
) -> Result<WorkerHandle, SpawnWorkerError> {
    let config = load_config(notification_repository).await?;
    let (requester, commands) = tokio::sync::mpsc::channel(1);
    WorkerRoutine::spawn(WorkerContext {
        config,
        commands,
        repository: interval_repository,
        notifier,
        display,
        clock,
    });
    Ok(WorkerHandle::new(requester))
}

async fn load_config(
    notification_repository: Arc<dyn NotificationRepository>,
) -> Result<WorkerConfig, SpawnWorkerError> {
    let remaining_notification = notification_repository
        .remaining_notification()
        .await
        .context(NotificationConfigSnafu { key: "remaining" })?;
    let expired_notification = notification_repository
        .expired_notification()
        .await
        .context(NotificationConfigSnafu { key: "expired" })?;

    Ok(WorkerConfig {
        remaining_notification,
        expired_notification,
    })
}

/// An error for spawning the background worker.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum SpawnWorkerError {
    #[snafu(display("Could not load {key} notification configration from repository"))]
    NotificationConfig {
        key: &'static str,
        source: GetNotificationError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, TimeZone, Utc};

    use crate::domain::daemon::outbound::{DisplayUpdate, NotifyError, NotifyRequest};
    use crate::domain::entity::{CountdownInterval, CountdownState, NotificationMessage};
    use crate::domain::repository::interval::MockIntervalRepository;
    use crate::domain::repository::notification::MockNotificationRepository;

    #[tokio::test]
    async fn spawn_restore_expired() {
        let mut interval_repository = MockIntervalRepository::new();
        interval_repository.expect_load().returning(|| {
            Ok(Some(CountdownInterval::new(
                now() - chrono::Duration::hours(2),
                now() - chrono::Duration::hours(1),
            )))
        });
        let display = Arc::new(CountingDisplay::default());

        let handle = spawn(
            Arc::new(interval_repository),
            Arc::new(init_notification_repository()),
            Arc::new(SilentNotifier),
            Arc::clone(&display) as Arc<dyn DisplayPort>,
            Arc::new(FixedClock),
        )
        .await
        .unwrap();

        let response = handle.query().await;
        assert_eq!(response.state, CountdownState::Expired);
        let snapshot = response.snapshot.unwrap();
        assert!(snapshot.is_expired());
        assert_eq!(snapshot.percent(), 100.0);
        assert_eq!(display.count(), 1);

        handle.stop().await;
        let response = handle.query().await;
        assert_eq!(response.state, CountdownState::Idle);
        assert!(response.interval.is_none());
    }

    #[tokio::test]
    async fn spawn_invalid_notification() {
        let mut notification_repository = MockNotificationRepository::new();
        notification_repository
            .expect_remaining_notification()
            .returning(|| snafu::whatever!("missing"));

        let res = spawn(
            Arc::new(MockIntervalRepository::new()),
            Arc::new(notification_repository),
            Arc::new(SilentNotifier),
            Arc::new(CountingDisplay::default()),
            Arc::new(FixedClock),
        )
        .await;

        assert!(matches!(
            res,
            Err(SpawnWorkerError::NotificationConfig {
                key: "remaining",
                ..
            })
        ));
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    fn init_notification_repository() -> MockNotificationRepository {
        let mut mock = MockNotificationRepository::new();
        mock.expect_remaining_notification()
            .returning(|| Ok(NotificationMessage::try_new("{remaining} left".to_owned(), None).unwrap()));
        mock.expect_expired_notification()
            .returning(|| Ok(NotificationMessage::try_new("Done".to_owned(), None).unwrap()));
        mock
    }

    struct FixedClock;

    impl ClockPort for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            now()
        }
    }

    struct SilentNotifier;

    #[async_trait::async_trait]
    impl NotifyPort for SilentNotifier {
        async fn notify(&self, _request: NotifyRequest) -> Result<(), NotifyError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingDisplay {
        published: std::sync::atomic::AtomicUsize,
    }

    impl CountingDisplay {
        fn count(&self) -> usize {
            self.published.load(std::sync::atomic::Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl DisplayPort for CountingDisplay {
        async fn publish(&self, _update: &DisplayUpdate) {
            self.published
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }

        async fn clear(&self) {}
    }
}
