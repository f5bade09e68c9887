use std::fmt::Write as _;
use std::io::{Error as IoError, ErrorKind};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use super::Asset;

/// A named cache on disk. Every entry is kept as two files named after the
/// hex encoded request path:
/// - `<key>.body` holds the raw asset,
/// - `<key>.json` holds the request path and the content type.
#[derive(Debug, Clone)]
pub struct CacheStorage {
    name: String,
    dir: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    path: String,
    content_type: String,
}

impl CacheStorage {
    /// Open the cache called `name` below `base`. Nothing is created until
    /// [`CacheStorage::put_all`] is called.
    pub fn open<P: AsRef<Path>>(base: P, name: &str) -> Self {
        Self {
            name: name.to_owned(),
            dir: base.as_ref().join(name),
        }
    }

    /// Returns the name of this [`CacheStorage`].
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if the cache has been created.
    ///
    /// # Errors
    ///
    /// This function will return an error if the file system could not be
    /// queried.
    pub async fn exists(&self) -> Result<bool, CacheError> {
        tokio::fs::try_exists(&self.dir)
            .await
            .context(FileSystemSnafu {
                when: "Checking cache directory",
            })
    }

    /// Look up the asset stored for the request `path`.
    ///
    /// # Errors
    ///
    /// This function will return an error if the entry exists but could not
    /// be read.
    pub async fn match_path(&self, path: &str) -> Result<Option<Asset>, CacheError> {
        let key = entry_key(path);

        let meta = match tokio::fs::read(self.dir.join(format!("{key}.json"))).await {
            Ok(meta) => meta,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).context(FileSystemSnafu {
                    when: "Reading entry metadata",
                })
            }
        };
        let meta: EntryMeta = serde_json::from_slice(&meta).context(MetadataSnafu)?;

        let body = tokio::fs::read(self.dir.join(format!("{key}.body")))
            .await
            .context(FileSystemSnafu {
                when: "Reading entry body",
            })?;

        Ok(Some(Asset::new(meta.content_type, body)))
    }

    /// Store every entry at once. The entries are written to a staging
    /// directory which then replaces the cache, so either all of them become
    /// visible or none.
    ///
    /// # Errors
    ///
    /// This function will return an error if writing any entry fails.
    pub async fn put_all(&self, entries: &[(String, Asset)]) -> Result<(), CacheError> {
        let mut staging = self.dir.clone().into_os_string();
        staging.push(".staging");
        let staging = PathBuf::from(staging);

        let res = Self::write_entries(&staging, entries).await;
        let res = match res {
            Ok(()) => tokio::fs::rename(&staging, &self.dir)
                .await
                .context(FileSystemSnafu {
                    when: "Publishing cache directory",
                }),
            Err(err) => Err(err),
        };

        if res.is_err() {
            // Leftovers would only be overwritten by the next attempt.
            let _ = tokio::fs::remove_dir_all(&staging).await;
        }
        res
    }

    async fn write_entries(dir: &Path, entries: &[(String, Asset)]) -> Result<(), CacheError> {
        tokio::fs::create_dir_all(dir)
            .await
            .context(FileSystemSnafu {
                when: "Creating cache directory",
            })?;

        for (path, asset) in entries {
            let key = entry_key(path);
            let meta = EntryMeta {
                path: path.clone(),
                content_type: asset.content_type.clone(),
            };
            let meta = serde_json::to_vec(&meta).context(MetadataSnafu)?;

            tokio::fs::write(dir.join(format!("{key}.body")), &asset.body)
                .await
                .context(FileSystemSnafu {
                    when: "Writing entry body",
                })?;
            tokio::fs::write(dir.join(format!("{key}.json")), meta)
                .await
                .context(FileSystemSnafu {
                    when: "Writing entry metadata",
                })?;
        }

        Ok(())
    }
}

fn entry_key(path: &str) -> String {
    path.bytes().fold(String::with_capacity(path.len() * 2), |mut key, byte| {
        let _ = write!(key, "{byte:02x}");
        key
    })
}

/// An error type of accessing a [`CacheStorage`].
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum CacheError {
    #[snafu(display("Could not access cache: {when}"))]
    FileSystem { when: String, source: IoError },
    #[snafu(display("Cache entry metadata is malformed"))]
    Metadata { source: serde_json::Error },
}
