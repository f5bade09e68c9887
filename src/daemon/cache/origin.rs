use std::error::Error as StdError;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use snafu::prelude::*;

use super::Asset;

/// Where assets come from when they are not cached yet.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Fetch: Send + Sync + 'static {
    /// Fetch the asset at the request `path`.
    ///
    /// # Errors
    ///
    /// This function will return an error if the asset does not exist or
    /// could not be retrieved.
    async fn fetch(&self, path: &str) -> Result<Asset, FetchError>;
}

/// An error type of fetching an [`Asset`].
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub))]
pub enum FetchError {
    #[snafu(display("Asset {path} is not found"))]
    NotFound { path: String },
    #[snafu(whatever, display("Could not fetch asset: {message}"))]
    Unknown {
        message: String,
        #[snafu(source(from(Box<dyn StdError>, Some)))]
        source: Option<Box<dyn StdError>>,
    },
}

/// A [`Fetch`] implementation which reads files below a web root directory.
#[derive(Debug, Clone)]
pub struct DirectoryOrigin {
    root: PathBuf,
}

impl DirectoryOrigin {
    /// Creates a new [`DirectoryOrigin`] serving files below `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Map a request path to a file below the root. `None` is returned for
    /// paths that try to leave it.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = if path.is_empty() || path == "/" {
            "/index.html"
        } else {
            path
        };

        let mut resolved = self.root.clone();
        for component in Path::new(path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(resolved)
    }
}

#[async_trait::async_trait]
impl Fetch for DirectoryOrigin {
    async fn fetch(&self, path: &str) -> Result<Asset, FetchError> {
        let file = self.resolve(path).context(NotFoundSnafu { path })?;

        match tokio::fs::metadata(&file).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return NotFoundSnafu { path }.fail(),
            Err(err) if err.kind() == ErrorKind::NotFound => return NotFoundSnafu { path }.fail(),
            Err(err) => {
                return Err(err)
                    .with_whatever_context(|_| format!("Could not inspect {}", file.display()))
            }
        }

        let body = tokio::fs::read(&file)
            .await
            .with_whatever_context(|_| format!("Could not read {}", file.display()))?;
        Ok(Asset::new(content_type(&file), body))
    }
}

fn content_type(file: &Path) -> &'static str {
    let extension = file
        .extension()
        .and_then(|extension| extension.to_str())
        .unwrap_or_default();
    match extension {
        "html" => "text/html; charset=utf-8",
        "js" => "text/javascript; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "json" | "webmanifest" => "application/json",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    #[tokio::test]
    async fn directory_origin_fetch() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        tmp.child("index.html").write_str("<html></html>").unwrap();
        tmp.child("styles/base.css").write_str("body {}").unwrap();
        let origin = DirectoryOrigin::new(tmp.path());

        let index = origin.fetch("/").await.unwrap();
        assert_eq!(index.content_type, "text/html; charset=utf-8");
        assert_eq!(&index.body[..], b"<html></html>");

        let style = origin.fetch("/styles/base.css?v=2").await.unwrap();
        assert_eq!(style.content_type, "text/css; charset=utf-8");
        assert_eq!(&style.body[..], b"body {}");
    }

    #[tokio::test]
    async fn directory_origin_fetch_not_found() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        tmp.child("styles").create_dir_all().unwrap();
        let origin = DirectoryOrigin::new(tmp.child("root").path());

        assert!(matches!(
            origin.fetch("/main.js").await,
            Err(FetchError::NotFound { .. })
        ));
        assert!(matches!(
            DirectoryOrigin::new(tmp.path()).fetch("/styles").await,
            Err(FetchError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn directory_origin_fetch_escape() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        tmp.child("secret").write_str("secret").unwrap();
        let origin = DirectoryOrigin::new(tmp.child("root").path());

        assert!(matches!(
            origin.fetch("/../secret").await,
            Err(FetchError::NotFound { .. })
        ));
    }

    #[test]
    fn content_type_by_extension() {
        assert_eq!(content_type(Path::new("a/manifest.json")), "application/json");
        assert_eq!(content_type(Path::new("favicon.ico")), "image/x-icon");
        assert_eq!(content_type(Path::new("LICENSE")), "application/octet-stream");
    }
}
