use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use std::path::{Path, PathBuf};

use snafu::prelude::*;
use tokio::io::DuplexStream;
use tokio::net::UnixStream;
use tokio::sync::mpsc::{self, Receiver, Sender};

use crate::utils::stream::Stream;

/// Opens a fresh stream to the daemon for every request.
#[async_trait::async_trait]
pub trait Connector: Send + Sync + 'static {
    /// # Errors
    ///
    /// This function will return [`ConnectError::Unavailable`] if no daemon
    /// is listening, or [`ConnectError::System`] on any other failure.
    async fn connect(&self) -> Result<Box<dyn Stream>, ConnectError>;
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ConnectError {
    #[snafu(display("No daemon is listening on {endpoint}"))]
    Unavailable { endpoint: String },
    #[snafu(display("Could not open a connection to the daemon"))]
    System { source: IoError },
}

/// Connects to the daemon's UNIX socket.
#[derive(Debug, Clone)]
pub struct UnixConnector {
    socket: PathBuf,
}

impl UnixConnector {
    pub fn new<P: Into<PathBuf>>(socket: P) -> Self {
        Self {
            socket: socket.into(),
        }
    }

    fn endpoint(&self) -> String {
        self.socket.display().to_string()
    }
}

#[async_trait::async_trait]
impl Connector for UnixConnector {
    async fn connect(&self) -> Result<Box<dyn Stream>, ConnectError> {
        let err = match UnixStream::connect(&self.socket).await {
            Ok(stream) => return Ok(Box::new(stream)),
            Err(err) => err,
        };

        // A socket file left behind by a dead daemon refuses connections.
        match err.kind() {
            IoErrorKind::NotFound | IoErrorKind::ConnectionRefused => UnavailableSnafu {
                endpoint: self.endpoint(),
            }
            .fail(),
            _ => Err(err).context(SystemSnafu),
        }
    }
}

/// Connects to whoever holds the [`Receiver`] returned by
/// [`DuplexConnector::new`]. Every connection hands one in-memory stream
/// end over the channel.
#[derive(Debug, Clone)]
pub struct DuplexConnector {
    daemon: Sender<DuplexStream>,
    capacity: usize,
}

impl DuplexConnector {
    pub fn new(capacity: usize) -> (Self, Receiver<DuplexStream>) {
        let (daemon, accepted) = mpsc::channel(1);
        (Self { daemon, capacity }, accepted)
    }
}

#[async_trait::async_trait]
impl Connector for DuplexConnector {
    async fn connect(&self) -> Result<Box<dyn Stream>, ConnectError> {
        let (client, daemon) = tokio::io::duplex(self.capacity);
        self.daemon
            .send(daemon)
            .await
            .ok()
            .context(UnavailableSnafu {
                endpoint: "in-memory daemon",
            })?;
        Ok(Box::new(client))
    }
}
