use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use std::path::Path;

use snafu::prelude::*;
use tokio::io::DuplexStream;
use tokio::net::UnixListener as TokioUnixListener;
use tokio::sync::mpsc::{self, Receiver, Sender};

use crate::utils::stream::Stream;

/// Source of client connections. Every accepted stream carries one request.
#[async_trait::async_trait]
pub trait Listener: Send + Sync {
    /// Wait for the next client and return its stream.
    ///
    /// # Errors
    ///
    /// This function will return an error if no more connections can be
    /// accepted.
    async fn accept(&self) -> Result<Box<dyn Stream>, ListenError>;
}

/// An error for listening procedure.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ListenError {
    #[snafu(display("Could not bind to occupied endpoint {endpoint}"))]
    InUse { endpoint: String },
    #[snafu(display("Could not bind to {endpoint}"))]
    Bind { endpoint: String, source: IoError },
    #[snafu(display("Could not accept connection"))]
    Accept { source: IoError },
    #[snafu(display("Listener is closed"))]
    Closed,
}

/// A [`Listener`] on a UNIX socket.
#[derive(Debug)]
pub struct UnixListener {
    listener: TokioUnixListener,
}

impl UnixListener {
    /// Bind a [`UnixListener`] to `path`. The socket file must not exist.
    ///
    /// # Errors
    ///
    /// This function will return an error if it fails to bind to the socket.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ListenError> {
        let endpoint = path.as_ref().to_string_lossy();
        match TokioUnixListener::bind(path.as_ref()) {
            Ok(listener) => Ok(Self { listener }),
            Err(err) if err.kind() == IoErrorKind::AddrInUse => InUseSnafu { endpoint }.fail(),
            Err(err) => Err(err).context(BindSnafu { endpoint }),
        }
    }
}

#[async_trait::async_trait]
impl Listener for UnixListener {
    async fn accept(&self) -> Result<Box<dyn Stream>, ListenError> {
        let (stream, _) = self.listener.accept().await.context(AcceptSnafu)?;
        Ok(Box::new(stream))
    }
}

/// An in-memory [`Listener`] whose client ends are handed out through a
/// channel. Used by tests.
#[derive(Debug)]
pub struct DuplexListener {
    peer: Sender<DuplexStream>,
    buffer_size: usize,
}

impl DuplexListener {
    pub fn new(buffer_size: usize) -> (Self, Receiver<DuplexStream>) {
        let (peer, receiver) = mpsc::channel(1);
        (Self { peer, buffer_size }, receiver)
    }
}

#[async_trait::async_trait]
impl Listener for DuplexListener {
    async fn accept(&self) -> Result<Box<dyn Stream>, ListenError> {
        let (local, peer) = tokio::io::duplex(self.buffer_size);
        if self.peer.send(peer).await.is_err() {
            return ClosedSnafu.fail();
        }
        Ok(Box::new(local))
    }
}
