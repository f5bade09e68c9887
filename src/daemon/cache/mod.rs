//! Cache-first access to the static assets of the web page. The assets are
//! fetched from an origin once, stored in a named cache directory, and served
//! from there afterwards so the page keeps working when the origin is gone.

mod origin;
mod shim;
mod storage;

pub use origin::{DirectoryOrigin, Fetch, FetchError};
pub use shim::{InstallCacheError, OfflineCache};
pub use storage::{CacheError, CacheStorage};

#[cfg(test)]
pub use origin::MockFetch;

use bytes::Bytes;

/// A fetched or cached static asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub content_type: String,
    pub body: Bytes,
}

impl Asset {
    /// Creates a new [`Asset`].
    pub fn new<T: Into<String>, B: Into<Bytes>>(content_type: T, body: B) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }
}
