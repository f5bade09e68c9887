use std::path::PathBuf;
use std::process::Stdio;

use snafu::prelude::*;
use sysinfo::System;
use tokio::process::Command;
use tracing::Level;

use crate::daemon::runtime::{ControlProcessError, ProcessController};
use crate::domain::client::outbound::{InitDaemonError, InitPort, NotFoundSnafu};

/// An [`InitPort`] implementation which launches the daemon executable with
/// `--daemonize` and waits for the parent process to exit.
#[derive(Debug)]
pub struct InitService {
    executable: Option<PathBuf>,
    pid_file: PathBuf,
    daemon_name: String,
    config: Option<PathBuf>,
    verbosity: Level,
}

impl InitService {
    pub fn new(
        executable: Option<PathBuf>,
        pid_file: PathBuf,
        daemon_name: String,
        config: Option<PathBuf>,
        verbosity: Level,
    ) -> Self {
        Self {
            executable,
            pid_file,
            daemon_name,
            config,
            verbosity,
        }
    }

    fn detect_instance(&self) -> Result<(), InitDaemonError> {
        let system = System::new_all();
        match ProcessController::detect_instance(&system, &self.pid_file, &self.daemon_name) {
            Ok(()) => Ok(()),
            Err(ControlProcessError::MultipleProcesses { pid }) => {
                tracing::debug!(pid, "Found running daemon");
                Err(InitDaemonError::AlreadyRunning)
            }
            Err(err) => Err(err).whatever_context("Could not detect daemon"),
        }
    }

    fn command(&self) -> Command {
        let mut command = match &self.executable {
            Some(executable) => Command::new(executable),
            None => Command::new(&self.daemon_name),
        };
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .arg("--verbosity")
            .arg(self.verbosity.to_string())
            .arg("--daemonize");

        if let Some(path) = &self.config {
            command.arg("--config").arg(path);
        }
        command
    }
}

#[async_trait::async_trait]
impl InitPort for InitService {
    async fn init(&self) -> Result<(), InitDaemonError> {
        self.detect_instance()?;

        let child = match self.command().spawn() {
            Ok(child) => child,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return NotFoundSnafu.fail();
            }
            Err(err) => return Err(err).whatever_context("Could not spawn daemon process"),
        };

        let output = child
            .wait_with_output()
            .await
            .whatever_context("Could not get daemon status")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            whatever!("Daemon exited abnormally: {}", stderr.trim());
        }
        Ok(())
    }
}
