use chrono::{DateTime, Utc};
use tokio::time::Duration;

/// A public port for starting a countdown.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SetPort: Send + Sync + 'static {
    /// Start a countdown from `start` to `end`, replacing the current one.
    async fn set(&self, start: DateTime<Utc>, end: DateTime<Utc>);
}

/// A public port for dropping the countdown.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ClearPort: Send + Sync + 'static {
    /// Do the clear operation.
    async fn clear(&self);
}

/// A public port for querying the current state.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait QueryPort: Send + Sync + 'static {
    /// Do the query operation.
    async fn query(&self) -> QueryResponse;
}

/// A public port for shutting the countdown worker down.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait StopPort: Send + Sync + 'static {
    /// Stop handling commands. Later requests find the countdown idle.
    async fn stop(&self);
}

/// The state of the countdown, as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResponse {
    pub state: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub progress: f64,
    pub remaining: Duration,
    pub label: String,
    pub blink: bool,
    pub expired: bool,
}
