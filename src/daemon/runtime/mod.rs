//! Process lifecycle of the daemon: runtime directories, the PID file and
//! detaching from the terminal.

mod environment;
mod process;

pub use environment::{Environment, SetupEnvironmentError};
pub use process::{ControlProcessError, ProcessController};
