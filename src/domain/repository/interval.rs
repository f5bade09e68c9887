use std::error::Error as StdError;

use snafu::prelude::*;

use crate::domain::entity::interval::{CountdownInterval, ParseTimestampError};

/// An abstract interface for persisting the [`CountdownInterval`].
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait IntervalRepository: Send + Sync + 'static {
    /// Load the persisted interval. `None` is returned if any part of it is
    /// missing.
    ///
    /// # Errors
    ///
    /// This function will return an error if the stored data is broken or the
    /// storage is not readable.
    async fn load(&self) -> Result<Option<CountdownInterval>, LoadIntervalError>;

    /// Persist both timestamps of the interval at once.
    ///
    /// # Errors
    ///
    /// This function will return an error if the storage is not writable.
    async fn save(&self, interval: &CountdownInterval) -> Result<(), StoreIntervalError>;

    /// Wipe everything this repository has stored.
    ///
    /// # Errors
    ///
    /// This function will return an error if the storage is not writable.
    async fn clear(&self) -> Result<(), StoreIntervalError>;
}

/// An error type of loading a [`CountdownInterval`].
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub))]
pub enum LoadIntervalError {
    #[snafu(display("Stored value of {key} is malformed"))]
    #[non_exhaustive]
    Malformed {
        key: String,
        source: ParseTimestampError,
    },
    #[snafu(whatever, display("Load interval failed: {message}"))]
    #[non_exhaustive]
    Unknown {
        message: String,
        #[snafu(source(from(Box<dyn StdError>, Some)))]
        source: Option<Box<dyn StdError>>,
    },
}

/// An error type of writing to the repository of [`CountdownInterval`]s.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum StoreIntervalError {
    #[snafu(whatever, display("Store interval failed: {message}"))]
    #[non_exhaustive]
    Unknown {
        message: String,
        #[snafu(source(from(Box<dyn StdError>, Some)))]
        source: Option<Box<dyn StdError>>,
    },
}
