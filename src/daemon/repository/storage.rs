use std::collections::BTreeMap;
use std::io::{Error as IoError, ErrorKind};
use std::path::{Path, PathBuf};

use snafu::prelude::*;

/// A flat string to string store kept in one TOML file. Every write replaces
/// the whole file, so readers never observe a partially written state.
#[derive(Debug, Clone)]
pub struct KeyValueStore {
    path: PathBuf,
}

impl KeyValueStore {
    /// Creates a new [`KeyValueStore`] backed by the file at `path`. The file
    /// is not touched until the first write.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all entries. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// This function will return an error if the file is not readable or not
    /// a table of strings.
    pub async fn entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => toml::from_str(&content).context(ParseSnafu {
                path: self.path.clone(),
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err).context(FileSystemSnafu {
                when: "Reading state file",
            }),
        }
    }

    /// Insert all pairs in one file replacement.
    ///
    /// # Errors
    ///
    /// This function will return an error if the file is not readable or
    /// writable.
    pub async fn set_all<'a, I>(&self, pairs: I) -> Result<(), StorageError>
    where
        I: IntoIterator<Item = (&'a str, String)>,
    {
        let mut entries = self.entries().await?;
        for (key, value) in pairs {
            entries.insert(key.to_owned(), value);
        }
        self.replace(&entries).await
    }

    /// Remove every entry along with the backing file.
    ///
    /// # Errors
    ///
    /// This function will return an error if the file exists but could not be
    /// removed.
    pub async fn clear(&self) -> Result<(), StorageError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).context(FileSystemSnafu {
                when: "Removing state file",
            }),
        }
    }

    async fn replace(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let content = toml::to_string(entries).context(SerializeSnafu)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context(FileSystemSnafu {
                    when: "Creating state directory",
                })?;
        }

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        tokio::fs::write(&staging, content)
            .await
            .context(FileSystemSnafu {
                when: "Writing staged state file",
            })?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .context(FileSystemSnafu {
                when: "Replacing state file",
            })?;

        Ok(())
    }
}

/// An error type of accessing a [`KeyValueStore`].
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum StorageError {
    #[snafu(display("Could not access state file: {when}"))]
    FileSystem { when: String, source: IoError },
    #[snafu(display("State file {} is malformed", path.display()))]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[snafu(display("Could not serialize state"))]
    Serialize { source: toml::ser::Error },
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_fs::prelude::*;
    use assert_fs::TempDir;
    use predicates::path as path_pred;

    #[tokio::test]
    async fn key_value_store_missing_file() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let store = KeyValueStore::new(tmp.child("state.toml").path());

        assert!(store.entries().await.unwrap().is_empty());
        assert!(store.clear().await.is_ok());
    }

    #[tokio::test]
    async fn key_value_store_set_all() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let file = tmp.child("nested/state.toml");
        let store = KeyValueStore::new(file.path());

        store
            .set_all([("a", "1".to_owned()), ("b", "2".to_owned())])
            .await
            .unwrap();
        store.set_all([("b", "3".to_owned())]).await.unwrap();

        file.assert(path_pred::is_file());
        tmp.child("nested/state.toml.tmp").assert(path_pred::missing());
        let entries = store.entries().await.unwrap();
        assert_eq!(entries.get("a").map(String::as_str), Some("1"));
        assert_eq!(entries.get("b").map(String::as_str), Some("3"));
    }

    #[tokio::test]
    async fn key_value_store_clear() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let file = tmp.child("state.toml");
        file.write_str("a = \"1\"\n").unwrap();
        let store = KeyValueStore::new(file.path());

        store.clear().await.unwrap();

        file.assert(path_pred::missing());
        assert!(store.entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn key_value_store_malformed() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let file = tmp.child("state.toml");
        file.write_str("a = [1, 2]\n").unwrap();
        let store = KeyValueStore::new(file.path());

        assert!(matches!(
            store.entries().await,
            Err(StorageError::Parse { .. })
        ));
    }
}
