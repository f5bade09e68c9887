use std::pin::Pin;

use chrono::Local;
use tokio::time::{Duration, Sleep};

use crate::domain::daemon::outbound::DisplayUpdate;
use crate::domain::daemon::worker::handle::{Command, QueryResponse};
use crate::domain::daemon::worker::routine::WorkerContext;
use crate::domain::entity::{CountdownInterval, CountdownState, NotificationMessage, TickSnapshot};
use crate::tracing_report;

/// Delay between two ticks of a running countdown.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug)]
#[repr(transparent)]
pub struct WorkerState {
    inner: Option<WorkerStateInner>,
}

impl WorkerState {
    /// Creates a new [`WorkerState`].
    pub fn new() -> Self {
        Self {
            inner: Some(WorkerStateInner::new()),
        }
    }

    /// Do the business logic based on its inner state.
    pub async fn run(&mut self, context: &mut WorkerContext) {
        self.inner = match self.inner.take() {
            Some(inner) => Some(inner.run(context).await),
            None => unreachable!("`WorkerState`'s inner should not be `None`"),
        };
    }

    /// Returns `true` if is stopped of this [`WorkerState`].
    pub fn is_stopped(&self) -> bool {
        matches!(self.inner, Some(WorkerStateInner::Stopped(_)))
    }
}

#[enum_dispatch::enum_dispatch]
trait StateRun {
    async fn run(self, context: &mut WorkerContext) -> WorkerStateInner;
}

/// Actual implementation of running state of [`WorkerRoutine`].
///
/// [`WorkerRoutine`]: crate::domain::daemon::worker::routine::WorkerRoutine
#[derive(Debug)]
#[enum_dispatch::enum_dispatch(StateRun)]
enum WorkerStateInner {
    Ready(ReadyState),
    Idle(IdleState),
    Running(RunningState),
    Expired(ExpiredState),
    Stopped(StoppedState),
}

impl WorkerStateInner {
    pub fn new() -> Self {
        Self::Ready(ReadyState)
    }

    /// Dispatch a command received in a waiting state. `Query` keeps the
    /// current state, everything else replaces it.
    async fn handle(self, command: Option<Command>, context: &mut WorkerContext) -> Self {
        match command {
            Some(Command::Set { interval }) => start(interval, context).await,
            Some(Command::Clear) => clear(context).await,
            Some(Command::Query { responder }) => {
                let _ = responder.send(self.query(context));
                self
            }
            Some(Command::Stop) | None => StoppedState.into(),
        }
    }

    fn query(&self, context: &WorkerContext) -> QueryResponse {
        let (state, interval) = match self {
            Self::Running(running) => (CountdownState::Running, Some(running.interval)),
            Self::Expired(expired) => (CountdownState::Expired, Some(expired.interval)),
            _ => (CountdownState::Idle, None),
        };
        let snapshot = interval.map(|interval| TickSnapshot::compute(&interval, context.clock.now()));
        QueryResponse {
            state,
            interval,
            snapshot,
        }
    }
}

/// A state which indicates that the [`WorkerRoutine`] has to restore the
/// persisted countdown first.
///
/// [`WorkerRoutine`]: crate::domain::daemon::worker::routine::WorkerRoutine
#[derive(Debug)]
struct ReadyState;

impl StateRun for ReadyState {
    async fn run(self, context: &mut WorkerContext) -> WorkerStateInner {
        let restored = match context.repository.load().await {
            Ok(restored) => restored,
            Err(err) => {
                tracing_report!(err, "Could not restore countdown, discarding it");
                None
            }
        };

        match restored {
            Some(interval) => {
                tracing::info!(
                    start = %interval.start(),
                    end = %interval.end(),
                    "Restored countdown"
                );
                tick(interval, LabelTracker::new(), context).await
            }
            None => clear(context).await,
        }
    }
}

/// A state which indicates that no countdown is set.
#[derive(Debug)]
struct IdleState;

impl StateRun for IdleState {
    async fn run(self, context: &mut WorkerContext) -> WorkerStateInner {
        let command = context.commands.recv().await;
        WorkerStateInner::from(self).handle(command, context).await
    }
}

/// A state which indicates that the countdown is running. It owns the only
/// pending tick, so replacing this state cancels it.
#[derive(Debug)]
struct RunningState {
    interval: CountdownInterval,
    tracker: LabelTracker,
    next_tick: Pin<Box<Sleep>>,
}

impl StateRun for RunningState {
    async fn run(mut self, context: &mut WorkerContext) -> WorkerStateInner {
        tokio::select! {
            _ = &mut self.next_tick => tick(self.interval, self.tracker, context).await,
            command = context.commands.recv() => {
                WorkerStateInner::from(self).handle(command, context).await
            }
        }
    }
}

/// A state which indicates that the countdown has reached its end. Nothing is
/// scheduled until the next `Set`.
#[derive(Debug)]
struct ExpiredState {
    interval: CountdownInterval,
}

impl StateRun for ExpiredState {
    async fn run(self, context: &mut WorkerContext) -> WorkerStateInner {
        let command = context.commands.recv().await;
        WorkerStateInner::from(self).handle(command, context).await
    }
}

/// A state which indicates that [`WorkerRoutine`] should stop running.
///
/// [`WorkerRoutine`]: crate::domain::daemon::worker::routine::WorkerRoutine
#[derive(Debug)]
struct StoppedState;

impl StateRun for StoppedState {
    async fn run(self, _context: &mut WorkerContext) -> WorkerStateInner {
        self.into()
    }
}

/// Remembers the last `(hours, minutes)` pair so that the label and the
/// notifications are only emitted when it changes. It starts empty, which
/// makes the first tick always count as a change.
#[derive(Debug, Default)]
struct LabelTracker {
    last: Option<(u64, u64)>,
}

impl LabelTracker {
    fn new() -> Self {
        Self::default()
    }

    /// Record the snapshot's pair and return `true` if it differs from the
    /// previous one.
    fn observe(&mut self, snapshot: &TickSnapshot) -> bool {
        let key = Some(snapshot.label_key());
        let changed = self.last != key;
        self.last = key;
        changed
    }
}

async fn start(interval: CountdownInterval, context: &mut WorkerContext) -> WorkerStateInner {
    tracing::info!(start = %interval.start(), end = %interval.end(), "Set countdown");

    if let Err(err) = context.repository.save(&interval).await {
        tracing_report!(err, "Could not persist countdown");
    }

    tick(interval, LabelTracker::new(), context).await
}

async fn clear(context: &mut WorkerContext) -> WorkerStateInner {
    tracing::info!("Clear countdown");

    if let Err(err) = context.repository.clear().await {
        tracing_report!(err, "Could not clear persisted countdown");
    }

    context.display.clear().await;
    IdleState.into()
}

/// Recompute the countdown, publish it and schedule the next tick unless it
/// has expired.
async fn tick(
    interval: CountdownInterval,
    mut tracker: LabelTracker,
    context: &mut WorkerContext,
) -> WorkerStateInner {
    let snapshot = TickSnapshot::compute(&interval, context.clock.now());
    let changed = tracker.observe(&snapshot);
    let expired = snapshot.is_expired();
    let label = snapshot.label().to_string();

    let update = DisplayUpdate {
        progress: snapshot.percent(),
        label: changed.then(|| label.clone()),
        blink: expired || snapshot.threshold_crossed(),
        expired,
    };
    context.display.publish(&update).await;

    if changed {
        tracing::debug!(remaining = %label, "Remaining time changed");

        let message = if expired {
            Some(&context.config.expired_notification)
        } else if snapshot.threshold_crossed() {
            Some(&context.config.remaining_notification)
        } else {
            None
        };

        if let Some(message) = message {
            let end = interval.end().with_timezone(&Local).format("%H:%M").to_string();
            notify(context, message.fill(&label, &end)).await;
        }
    }

    if expired {
        tracing::info!(end = %interval.end(), "Countdown expired");
        ExpiredState { interval }.into()
    } else {
        RunningState {
            interval,
            tracker,
            next_tick: Box::pin(tokio::time::sleep(TICK_PERIOD)),
        }
        .into()
    }
}

async fn notify(context: &WorkerContext, message: NotificationMessage) {
    if let Err(err) = context.notifier.notify(message.into()).await {
        tracing_report!(err, "Could not show notification");
    }
}
