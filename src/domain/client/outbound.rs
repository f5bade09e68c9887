//! Ports through which the client reaches its daemon.

use std::error::Error as StdError;

use chrono::{DateTime, Utc};
use snafu::prelude::*;

pub use crate::domain::daemon::inbound::QueryResponse;

/// Starts the daemon in the background.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait InitPort: Send + Sync + 'static {
    /// Launch the daemon and wait until it has detached.
    ///
    /// # Errors
    ///
    /// This function will return an error if an instance is already alive
    /// or the daemon could not be launched.
    async fn init(&self) -> Result<(), InitDaemonError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SetPort: Send + Sync + 'static {
    /// Ask the daemon to count down from `start` to `end`.
    ///
    /// # Errors
    ///
    /// This function will return an error if the daemon could not be reached
    /// or rejected the request.
    async fn set(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), RequestDaemonError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ClearPort: Send + Sync + 'static {
    /// Ask the daemon to forget the countdown.
    ///
    /// # Errors
    ///
    /// This function will return an error if the daemon could not be reached.
    async fn clear(&self) -> Result<(), RequestDaemonError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait QueryPort: Send + Sync + 'static {
    /// Fetch a snapshot of the countdown as the daemon sees it now.
    ///
    /// # Errors
    ///
    /// This function will return an error if the daemon could not be reached.
    async fn query(&self) -> Result<QueryResponse, RequestDaemonError>;
}

/// Why the daemon could not be launched.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub))]
pub enum InitDaemonError {
    #[snafu(display("Daemon executable does not exist"))]
    NotFound,
    #[snafu(display("Another daemon instance is alive"))]
    AlreadyRunning,
    #[snafu(whatever, display("Could not launch daemon: {message}"))]
    Unknown {
        message: String,
        #[snafu(source(from(Box<dyn StdError>, Some)))]
        source: Option<Box<dyn StdError>>,
    },
}

/// Why a request did not get an answer.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub))]
pub enum RequestDaemonError {
    #[snafu(display("No daemon is listening on {endpoint}"))]
    Unavailable { endpoint: String },
    #[snafu(display("Daemon answered with an unexpected response"))]
    BadResponse,
    #[snafu(whatever, display("Request failed: {message}"))]
    Unknown {
        message: String,
        #[snafu(source(from(Box<dyn StdError>, Some)))]
        source: Option<Box<dyn StdError>>,
    },
}
