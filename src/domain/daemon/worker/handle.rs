use tokio::sync::mpsc::Sender;
use tokio::sync::oneshot::{self, Sender as OneshotSender};

use crate::domain::entity::{CountdownInterval, CountdownState, TickSnapshot};

/// What the worker reports about the countdown at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResponse {
    pub state: CountdownState,
    pub interval: Option<CountdownInterval>,
    pub snapshot: Option<TickSnapshot>,
}

/// Messages accepted by the worker loop, handled one at a time in arrival
/// order.
#[derive(Debug)]
pub enum Command {
    Set { interval: CountdownInterval },
    Clear,
    Query { responder: OneshotSender<QueryResponse> },
    Stop,
}

/// The sending side of the worker's command queue. Commands sent after the
/// worker has stopped are dropped.
#[derive(Debug)]
pub struct WorkerHandle {
    requester: Sender<Command>,
}

impl WorkerHandle {
    pub fn new(requester: Sender<Command>) -> Self {
        Self { requester }
    }

    /// Replace the countdown with `interval`, whatever state it is in.
    pub async fn set(&self, interval: CountdownInterval) {
        self.send(Command::Set { interval }).await;
    }

    /// Drop the countdown and its persisted copy.
    pub async fn clear(&self) {
        self.send(Command::Clear).await;
    }

    /// Snapshot of the countdown. Once the worker is stopped it reports
    /// [`CountdownState::Idle`].
    pub async fn query(&self) -> QueryResponse {
        let (responder, response) = oneshot::channel();
        self.send(Command::Query { responder }).await;
        response.await.unwrap_or(QueryResponse {
            state: CountdownState::Idle,
            interval: None,
            snapshot: None,
        })
    }

    /// Make the worker loop exit.
    pub async fn stop(&self) {
        self.send(Command::Stop).await;
    }

    async fn send(&self, command: Command) {
        if let Err(err) = self.requester.send(command).await {
            tracing::debug!(command = ?err.0, "Worker is stopped, command dropped");
        }
    }
}
