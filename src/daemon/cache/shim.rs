use std::sync::Arc;

use snafu::prelude::*;

use super::{Asset, CacheError, CacheStorage, Fetch, FetchError};
use crate::tracing_report;

/// Serves assets from a [`CacheStorage`] first and falls back to the origin.
pub struct OfflineCache {
    storage: CacheStorage,
    origin: Arc<dyn Fetch>,
}

impl OfflineCache {
    /// Creates a new [`OfflineCache`].
    pub fn new(storage: CacheStorage, origin: Arc<dyn Fetch>) -> Self {
        Self { storage, origin }
    }

    /// Populate the cache with every path of `manifest` unless it exists
    /// already. All paths are fetched before anything is stored, so a single
    /// failure leaves the cache absent and the next start tries again.
    ///
    /// # Errors
    ///
    /// This function will return an error if any path could not be fetched
    /// or the cache could not be written.
    pub async fn install(&self, manifest: &[String]) -> Result<(), InstallCacheError> {
        if self.storage.exists().await.context(StoreSnafu)? {
            tracing::debug!(cache = self.storage.name(), "Offline cache already installed");
            return Ok(());
        }

        let mut entries = Vec::with_capacity(manifest.len());
        for path in manifest {
            let asset = self
                .origin
                .fetch(path)
                .await
                .context(FetchSnafu { path: path.as_str() })?;
            entries.push((path.clone(), asset));
        }

        self.storage.put_all(&entries).await.context(StoreSnafu)?;
        tracing::info!(
            cache = self.storage.name(),
            entries = entries.len(),
            "Installed offline cache"
        );
        Ok(())
    }

    /// Answer a request for `path`: the cached asset if there is one,
    /// otherwise whatever the origin returns.
    ///
    /// # Errors
    ///
    /// This function will return the origin's error unchanged if the asset is
    /// not cached and the origin fails.
    pub async fn fetch(&self, path: &str) -> Result<Asset, FetchError> {
        match self.storage.match_path(path).await {
            Ok(Some(asset)) => return Ok(asset),
            Ok(None) => {}
            Err(err) => tracing_report!(err, path, "Could not read offline cache"),
        }
        self.origin.fetch(path).await
    }
}

/// An error type of installing an [`OfflineCache`].
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum InstallCacheError {
    #[snafu(display("Could not fetch {path} for the offline cache"))]
    Fetch { path: String, source: FetchError },
    #[snafu(display("Could not store the offline cache"))]
    Store { source: CacheError },
}
