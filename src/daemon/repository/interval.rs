use snafu::prelude::*;

use crate::daemon::repository::storage::KeyValueStore;
use crate::domain::entity::interval::{format_timestamp, parse_timestamp};
use crate::domain::entity::CountdownInterval;
use crate::domain::repository::interval::{
    LoadIntervalError, MalformedSnafu, StoreIntervalError,
};
use crate::domain::repository::IntervalRepository;

pub const START_KEY: &str = "start-of-countdown";
pub const END_KEY: &str = "end-of-countdown";

/// An [`IntervalRepository`] implementation which keeps both timestamps in a
/// [`KeyValueStore`].
pub struct IntervalStorage {
    store: KeyValueStore,
}

impl IntervalStorage {
    /// Creates a new [`IntervalStorage`].
    pub fn new(store: KeyValueStore) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl IntervalRepository for IntervalStorage {
    async fn load(&self) -> Result<Option<CountdownInterval>, LoadIntervalError> {
        let mut entries = whatever!(self.store.entries().await, "Could not read stored interval");

        let (Some(start), Some(end)) = (entries.remove(START_KEY), entries.remove(END_KEY)) else {
            return Ok(None);
        };
        let start = parse_timestamp(&start).context(MalformedSnafu { key: START_KEY })?;
        let end = parse_timestamp(&end).context(MalformedSnafu { key: END_KEY })?;

        Ok(Some(CountdownInterval::new(start, end)))
    }

    async fn save(&self, interval: &CountdownInterval) -> Result<(), StoreIntervalError> {
        let pairs = [
            (START_KEY, format_timestamp(&interval.start())),
            (END_KEY, format_timestamp(&interval.end())),
        ];
        whatever!(
            self.store.set_all(pairs).await,
            "Could not write interval to {}",
            self.store.path().display()
        );
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreIntervalError> {
        whatever!(self.store.clear().await, "Could not remove stored interval");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_fs::prelude::*;
    use assert_fs::TempDir;
    use chrono::{TimeZone, Utc};
    use predicates::path as path_pred;

    #[tokio::test]
    async fn interval_storage_save_load() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let storage = IntervalStorage::new(KeyValueStore::new(tmp.child("state.toml").path()));
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let interval =
            CountdownInterval::new(start, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());

        assert_eq!(storage.load().await.unwrap(), None);
        storage.save(&interval).await.unwrap();
        assert_eq!(storage.load().await.unwrap(), Some(interval));
    }

    #[tokio::test]
    async fn interval_storage_load_partial() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let file = tmp.child("state.toml");
        file.write_str("end-of-countdown = \"2024-05-01T12:00:00Z\"\n")
            .unwrap();
        let storage = IntervalStorage::new(KeyValueStore::new(file.path()));

        assert_eq!(storage.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn interval_storage_load_malformed() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let file = tmp.child("state.toml");
        file.write_str(
            "start-of-countdown = \"yesterday\"\nend-of-countdown = \"2024-05-01T12:00:00Z\"\n",
        )
        .unwrap();
        let storage = IntervalStorage::new(KeyValueStore::new(file.path()));

        assert!(matches!(
            storage.load().await,
            Err(LoadIntervalError::Malformed { ref key, .. }) if key == START_KEY
        ));
    }

    #[tokio::test]
    async fn interval_storage_clear() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let file = tmp.child("state.toml");
        let storage = IntervalStorage::new(KeyValueStore::new(file.path()));
        let interval = CountdownInterval::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        );

        storage.save(&interval).await.unwrap();
        file.assert(predicates::str::contains(START_KEY));
        storage.clear().await.unwrap();
        file.assert(path_pred::missing());
        assert_eq!(storage.load().await.unwrap(), None);
    }
}
