use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::time::Duration;

use crate::domain::daemon::inbound::{ClearPort, QueryPort, QueryResponse, SetPort, StopPort};
use crate::domain::daemon::worker::{QueryResponse as WorkerQueryResponse, WorkerHandle};
use crate::domain::entity::{CountdownInterval, CountdownState};

#[derive(Debug)]
pub struct SetService {
    worker: Arc<WorkerHandle>,
}

impl SetService {
    pub fn new(worker: Arc<WorkerHandle>) -> Self {
        Self { worker }
    }
}

#[async_trait::async_trait]
impl SetPort for SetService {
    async fn set(&self, start: DateTime<Utc>, end: DateTime<Utc>) {
        self.worker.set(CountdownInterval::new(start, end)).await
    }
}

#[derive(Debug)]
pub struct ClearService {
    worker: Arc<WorkerHandle>,
}

impl ClearService {
    pub fn new(worker: Arc<WorkerHandle>) -> Self {
        Self { worker }
    }
}

#[async_trait::async_trait]
impl ClearPort for ClearService {
    async fn clear(&self) {
        self.worker.clear().await
    }
}

#[derive(Debug)]
pub struct StopService {
    worker: Arc<WorkerHandle>,
}

impl StopService {
    pub fn new(worker: Arc<WorkerHandle>) -> Self {
        Self { worker }
    }
}

#[async_trait::async_trait]
impl StopPort for StopService {
    async fn stop(&self) {
        self.worker.stop().await
    }
}

#[derive(Debug)]
pub struct QueryService {
    worker: Arc<WorkerHandle>,
}

impl QueryService {
    pub fn new(worker: Arc<WorkerHandle>) -> Self {
        Self { worker }
    }
}

#[async_trait::async_trait]
impl QueryPort for QueryService {
    /// A countdown whose snapshot has already run out is reported as expired
    /// even if the worker has not ticked into that state yet.
    async fn query(&self) -> QueryResponse {
        let WorkerQueryResponse {
            state,
            interval,
            snapshot,
        } = self.worker.query().await;

        let expired = snapshot.is_some_and(|snapshot| snapshot.is_expired());
        let state = if expired {
            CountdownState::Expired
        } else {
            state
        };

        let mut response = QueryResponse {
            state: state.to_string(),
            start: interval.map(|interval| interval.start()),
            end: interval.map(|interval| interval.end()),
            progress: 0.0,
            remaining: Duration::ZERO,
            label: String::new(),
            blink: false,
            expired,
        };
        if let Some(snapshot) = snapshot {
            response.progress = snapshot.percent();
            response.remaining = snapshot.remaining();
            response.label = snapshot.label().to_string();
            response.blink = expired || snapshot.threshold_crossed();
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use tokio::sync::mpsc::Receiver;

    use crate::domain::daemon::worker::Command;
    use crate::domain::entity::TickSnapshot;

    #[tokio::test]
    async fn query_service_running() {
        let interval = new_interval(600);
        let (worker, commands) = new_worker();
        tokio::spawn(reply_once(commands, CountdownState::Running, interval, now()));

        let response = QueryService::new(worker).query().await;
        assert_eq!(response.state, "Running");
        assert_eq!(response.start, Some(now()));
        assert_eq!(response.end, Some(interval.end()));
        assert_eq!(response.progress, 0.0);
        assert_eq!(response.remaining, Duration::from_secs(600));
        assert_eq!(response.label, "10 min");
        assert!(response.blink);
        assert!(!response.expired);
    }

    #[tokio::test]
    async fn query_service_running_past_end_reports_expired() {
        let interval = new_interval(600);
        let (worker, commands) = new_worker();
        tokio::spawn(reply_once(
            commands,
            CountdownState::Running,
            interval,
            interval.end(),
        ));

        let response = QueryService::new(worker).query().await;
        assert_eq!(response.state, "Expired");
        assert_eq!(response.progress, 100.0);
        assert_eq!(response.remaining, Duration::ZERO);
        assert_eq!(response.label, "Time is up");
        assert!(response.blink);
        assert!(response.expired);
    }

    #[tokio::test]
    async fn query_service_idle() {
        let (worker, mut commands) = new_worker();
        tokio::spawn(async move {
            if let Some(Command::Query { responder }) = commands.recv().await {
                let _ = responder.send(WorkerQueryResponse {
                    state: CountdownState::Idle,
                    interval: None,
                    snapshot: None,
                });
            }
        });

        let response = QueryService::new(worker).query().await;
        assert_eq!(response.state, "Idle");
        assert!(response.start.is_none());
        assert!(response.label.is_empty());
        assert!(!response.blink);
        assert!(!response.expired);
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    fn new_interval(seconds: i64) -> CountdownInterval {
        CountdownInterval::new(now(), now() + chrono::Duration::seconds(seconds))
    }

    fn new_worker() -> (Arc<WorkerHandle>, Receiver<Command>) {
        let (sender, receiver) = tokio::sync::mpsc::channel(1);
        (Arc::new(WorkerHandle::new(sender)), receiver)
    }

    async fn reply_once(
        mut commands: Receiver<Command>,
        state: CountdownState,
        interval: CountdownInterval,
        at: DateTime<Utc>,
    ) {
        if let Some(Command::Query { responder }) = commands.recv().await {
            let _ = responder.send(WorkerQueryResponse {
                state,
                interval: Some(interval),
                snapshot: Some(TickSnapshot::compute(&interval, at)),
            });
        }
    }
}
