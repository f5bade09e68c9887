use std::fs::File;
use std::io::{Error as IoError, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use snafu::prelude::*;

pub const DEFAULT_CONTENT: &str = r#"
# This configuration file is generated automatically. Feel free to do some
# modification.

# The `notification` section controls desktop notifications. Both messages may
# use the `{remaining}` placeholder for the remaining time label and `{end}`
# for the end of the countdown as HH:MM. `body` is optional.
[notification]
enabled = true

# Shown when the remaining time reaches a full quarter of an hour, or 10, 5
# and 1 minutes in the last hour.
[notification.remaining]
summary = "{remaining} left"
body = "The countdown ends at {end}."

# Shown once when the countdown is over.
[notification.expired]
summary = "Time is up"
body = "The countdown to {end} has finished."

# The `web` section enables the local web page. It is served only when
# `address` is set. `root` is the directory of static assets, `cache` names the
# offline cache and `manifest` lists the paths stored in it on first start.
# [web]
# address = "127.0.0.1:8080"
# root = "/path/to/web/root"
# cache = "countdown-pwa"

# The `runtime` section specifies the paths to some runtime files. Leave
# them empty to use default settings. Currently environment variables is not
# supported.
# [runtime]
# socket = "/path/to/unix/socket"
# pid = "/path/to/pid/file"
# state = "/path/to/state/file"
"#;

/// Reads the configuration file, optionally writing [`DEFAULT_CONTENT`] to it
/// first when it does not exist.
pub struct ContentReader {
    path: PathBuf,
    template: bool,
}

impl ContentReader {
    /// A reader for a file that has to exist.
    pub fn existing<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            template: false,
        }
    }

    /// A reader that writes the template if the file is missing.
    pub fn or_template<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            template: true,
        }
    }

    /// Read the whole file.
    ///
    /// # Errors
    ///
    /// This function will return an error if the file is missing and no
    /// template may be written, or on any I/O failure.
    pub fn read(self) -> Result<String, ReadContentError> {
        let err = match std::fs::read_to_string(&self.path) {
            Ok(content) => return Ok(content),
            Err(err) => err,
        };

        if err.kind() != ErrorKind::NotFound {
            return Err(err).context(FileSystemSnafu {
                when: "Reading configuration",
            });
        }
        ensure!(self.template, NotFoundSnafu { path: self.path });

        write_template(&self.path)?;
        Ok(DEFAULT_CONTENT.to_owned())
    }
}

/// Write the template to `path`. An existing file is left untouched.
fn write_template(path: &Path) -> Result<(), ReadContentError> {
    tracing::info!(path = %path.display(), "Writing default configuration");

    File::options()
        .write(true)
        .create_new(true)
        .open(path)
        .and_then(|mut file| file.write_all(DEFAULT_CONTENT.as_bytes()))
        .context(FileSystemSnafu {
            when: "Writing default configuration",
        })
}

/// An error type for reading the configuration file.
#[derive(Debug, Snafu, Clone)]
#[non_exhaustive]
pub enum ReadContentError {
    #[snafu(display("Configuration file {} does not exist", path.display()))]
    NotFound { path: PathBuf },
    #[snafu(display("Could not access configuration: {when}"))]
    FileSystem {
        when: String,
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
}
