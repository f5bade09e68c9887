use std::sync::Arc;

use snafu::prelude::*;

use crate::domain::daemon::app::service::{ClearService, QueryService, SetService, StopService};
use crate::domain::daemon::inbound::{ClearPort, QueryPort, SetPort, StopPort};
use crate::domain::daemon::outbound::{ClockPort, DisplayPort, NotifyPort};
use crate::domain::daemon::worker::{self, SpawnWorkerError};
use crate::domain::repository::{IntervalRepository, NotificationRepository};

/// The daemon's inbound ports. All of them talk to the same countdown
/// worker.
pub struct ApplicationCore {
    pub set: Arc<dyn SetPort>,
    pub clear: Arc<dyn ClearPort>,
    pub query: Arc<dyn QueryPort>,
    pub stop: Arc<dyn StopPort>,
}

impl ApplicationCore {
    /// Wire the adapters to a freshly spawned worker. The worker restores a
    /// persisted countdown on its own before it serves the first request.
    ///
    /// # Errors
    ///
    /// This function will return an error if the worker could not be
    /// spawned.
    pub async fn setup(
        notify_port: Arc<dyn NotifyPort>,
        display_port: Arc<dyn DisplayPort>,
        clock_port: Arc<dyn ClockPort>,
        interval_repository: Arc<dyn IntervalRepository>,
        notification_repository: Arc<dyn NotificationRepository>,
    ) -> Result<Self, SetupApplicationCoreError> {
        let handle = worker::spawn(
            interval_repository,
            notification_repository,
            notify_port,
            display_port,
            clock_port,
        )
        .await
        .context(WorkerSnafu)
        .map(Arc::new)?;

        Ok(Self {
            set: Arc::new(SetService::new(Arc::clone(&handle))),
            clear: Arc::new(ClearService::new(Arc::clone(&handle))),
            query: Arc::new(QueryService::new(Arc::clone(&handle))),
            stop: Arc::new(StopService::new(handle)),
        })
    }
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum SetupApplicationCoreError {
    #[snafu(display("Could not start the countdown worker"))]
    Worker { source: SpawnWorkerError },
}
