use std::sync::Arc;

use tokio::sync::mpsc::Receiver;
use tokio::task::JoinHandle;

use crate::domain::daemon::outbound::{ClockPort, DisplayPort, NotifyPort};
use crate::domain::daemon::worker::handle::Command;
use crate::domain::daemon::worker::state::WorkerState;
use crate::domain::entity::NotificationMessage;
use crate::domain::repository::IntervalRepository;

/// Notification templates, loaded once when the worker is spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    pub remaining_notification: NotificationMessage,
    pub expired_notification: NotificationMessage,
}

/// Everything a [`WorkerState`] may touch while it handles a command or a
/// tick.
pub struct WorkerContext {
    pub config: WorkerConfig,
    pub commands: Receiver<Command>,
    pub repository: Arc<dyn IntervalRepository>,
    pub notifier: Arc<dyn NotifyPort>,
    pub display: Arc<dyn DisplayPort>,
    pub clock: Arc<dyn ClockPort>,
}

/// The task owning the countdown. Each step of the state machine either
/// handles one [`Command`] or one tick.
pub struct WorkerRoutine {
    context: WorkerContext,
    state: WorkerState,
}

impl WorkerRoutine {
    /// Start the task. The first step restores the persisted countdown.
    pub fn spawn(context: WorkerContext) -> JoinHandle<()> {
        let routine = Self {
            context,
            state: WorkerState::new(),
        };
        tokio::spawn(routine.run())
    }

    async fn run(mut self) {
        while !self.state.is_stopped() {
            self.state.run(&mut self.context).await;
        }
        tracing::info!("Countdown worker stopped");
    }
}
