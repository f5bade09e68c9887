use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use std::path::{Path, PathBuf};

use daemonize::{Daemonize, Error as DaemonizeError};
use snafu::prelude::*;
use sysinfo::{Pid, System};

/// A process manager responsible for daemonization and preventing multiple
/// running instance.
#[derive(Debug)]
pub struct ProcessController {
    app_name: String,
    pid_file: PathBuf,
    daemonize: bool,
}

impl ProcessController {
    /// Creates a new [`ProcessController`].
    pub fn new(app_name: String, pid_file: PathBuf, daemonize: bool) -> Self {
        Self {
            app_name,
            pid_file,
            daemonize,
        }
    }

    /// Make sure no other instance is running, then record this process in
    /// the PID file, detaching from the terminal first if requested.
    ///
    /// # Errors
    ///
    /// This function will return an error if another daemon is running or the
    /// PID file could not be written.
    pub fn start(&self) -> Result<(), ControlProcessError> {
        let system = System::new_all();
        Self::detect_instance(&system, &self.pid_file, &self.app_name)?;

        if self.daemonize {
            Daemonize::new()
                .pid_file(&self.pid_file)
                .start()
                .context(DaemonizeSnafu)?;
        } else {
            let pid =
                sysinfo::get_current_pid().map_err(|err| GetPidSnafu { message: err }.build())?;
            Self::write_pid(&self.pid_file, pid)?;
        }

        tracing::info!(pid_file = %self.pid_file.display(), "Recorded daemon process");
        Ok(())
    }

    /// Remove the PID file written by [`ProcessController::start`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the file exists but could not be
    /// removed.
    pub fn release(&self) -> Result<(), ControlProcessError> {
        match std::fs::remove_file(&self.pid_file) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == IoErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).context(FileSystemSnafu {
                message: "Could not remove PID file",
            }),
        }
    }

    /// Fail if the PID file names a live process whose name contains
    /// `app_name`. A stale PID file is ignored.
    ///
    /// # Errors
    ///
    /// This function will return an error if the file is unreadable, broken,
    /// or points to another running daemon.
    pub fn detect_instance<P: AsRef<Path>>(
        system: &System,
        pid_file: P,
        app_name: &str,
    ) -> Result<(), ControlProcessError> {
        let content = match std::fs::read_to_string(pid_file) {
            Ok(content) => content,
            Err(err) if err.kind() == IoErrorKind::NotFound => return Ok(()),
            Err(err) => {
                return Err(err).context(FileSystemSnafu {
                    message: "Could not read PID file",
                })
            }
        };

        let pid = content
            .trim()
            .parse::<Pid>()
            .map_err(|_| InvalidPidFileSnafu.build())?;

        let running = system
            .process(pid)
            .is_some_and(|proc| same_program(&proc.name().to_string_lossy(), app_name));
        ensure!(!running, MultipleProcessesSnafu { pid: pid.as_u32() });
        Ok(())
    }

    fn write_pid<P: AsRef<Path>>(pid_file: P, pid: Pid) -> Result<(), ControlProcessError> {
        std::fs::write(pid_file, pid.to_string()).context(FileSystemSnafu {
            message: "Could not write PID",
        })
    }
}

/// Length Linux truncates process names to.
const TRUNCATED_NAME_LEN: usize = 15;

/// Linux truncates process names to 15 bytes, so a prefix of `app_name` of
/// exactly that length counts as a match too.
fn same_program(name: &str, app_name: &str) -> bool {
    !name.is_empty()
        && (name.contains(app_name)
            || (name.len() == TRUNCATED_NAME_LEN && app_name.starts_with(name)))
}

/// An error type of controlling the daemon process.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ControlProcessError {
    #[snafu(display("File system error: {message}"))]
    FileSystem { message: String, source: IoError },
    #[snafu(display("Daemon is already running as process {pid}"))]
    MultipleProcesses { pid: u32 },
    #[snafu(display("Could not ensure process uniqueness with invalid PID file"))]
    InvalidPidFile,
    #[snafu(display("Failed to get PID: {message}"))]
    GetPid { message: String },
    #[snafu(display("Could not daemonize the process"))]
    Daemonize { source: DaemonizeError },
}
