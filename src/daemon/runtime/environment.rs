use std::fs::{self, Permissions};
use std::io::{Error as IoError, ErrorKind};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use snafu::prelude::*;

/// Helper for setting up the daemon's running environment.
#[derive(Debug, Default)]
pub struct Environment {
    directories: Vec<(PathBuf, Option<u32>)>,
    stale_files: Vec<PathBuf>,
}

impl Environment {
    /// Creates a new [`Environment`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a directory that needs to exist, optionally with the given
    /// permission bits.
    pub fn register_directory<P: AsRef<Path>>(&mut self, directory: P, permission: Option<u32>) {
        self.directories
            .push((directory.as_ref().to_path_buf(), permission));
    }

    /// Register a file left behind by a previous run, such as the socket.
    pub fn register_stale_file<P: AsRef<Path>>(&mut self, path: P) {
        self.stale_files.push(path.as_ref().to_path_buf());
    }

    /// Setup the environment.
    ///
    /// # Errors
    ///
    /// This function will return an error if any system error occurs.
    pub fn setup(self) -> Result<(), SetupEnvironmentError> {
        for (dir, permission) in &self.directories {
            fs::create_dir_all(dir).context(CreateDirectorySnafu { dir })?;
            if let Some(permission) = permission {
                Self::set_permission(dir, *permission)?;
            }
        }

        for path in &self.stale_files {
            match fs::remove_file(path) {
                Ok(()) => tracing::debug!(path = %path.display(), "Removed stale file"),
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err).context(RemoveStaleSnafu { path }),
            }
        }

        Ok(())
    }

    fn set_permission(path: &Path, permission: u32) -> Result<(), SetupEnvironmentError> {
        let metadata = fs::metadata(path).context(SetPermissionSnafu { path, permission })?;
        if metadata.permissions().mode() & 0o777 != permission {
            fs::set_permissions(path, Permissions::from_mode(permission))
                .context(SetPermissionSnafu { path, permission })?;
        }
        Ok(())
    }
}

/// An error for setting up the running environment.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum SetupEnvironmentError {
    #[snafu(display("Could not create directory {}", dir.display()))]
    CreateDirectory { dir: PathBuf, source: IoError },
    #[snafu(display("Could not set {}'s permission to {permission:o}", path.display()))]
    SetPermission {
        path: PathBuf,
        permission: u32,
        source: IoError,
    },
    #[snafu(display("Could not remove stale file {}", path.display()))]
    RemoveStale { path: PathBuf, source: IoError },
}
