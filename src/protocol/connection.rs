use std::io::Error as IoError;

use bytes::{Buf, BytesMut};
use snafu::prelude::*;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::frame::{Frame, ParseFrameError, WriteFrameError};

/// Frames on top of a byte stream, typically a socket. Bytes read past the
/// end of a frame stay buffered for the next [`Connection::receive`].
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Encode `frame` and write it to the stream.
    ///
    /// # Errors
    ///
    /// This function will return an error if encoding or writing fails.
    pub async fn send(&mut self, frame: Frame) -> Result<(), SendFrameError> {
        let mut encoded = BytesMut::new();
        frame.encode(&mut encoded).context(EncodeSnafu)?;

        self.stream.write_all(&encoded).await.context(WriteSnafu)?;
        self.stream.flush().await.context(WriteSnafu)
    }

    /// Read from the stream until one whole frame is buffered and decode it.
    ///
    /// # Errors
    ///
    /// This function will return an error if the bytes are not a valid frame
    /// or the peer closes the stream first.
    pub async fn receive(&mut self) -> Result<Frame, ReceiveFrameError> {
        loop {
            if let Some((frame, consumed)) = Frame::decode(&self.buffer).context(DecodeSnafu)? {
                self.buffer.advance(consumed);
                return Ok(frame);
            }

            let read = self
                .stream
                .read_buf(&mut self.buffer)
                .await
                .context(ReadSnafu)?;
            if read == 0 {
                return ClosedSnafu {
                    pending: self.buffer.len(),
                }
                .fail();
            }
        }
    }
}

impl<S> From<S> for Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    fn from(stream: S) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(1024),
        }
    }
}

/// An error type for sending a [`Frame`] through a [`Connection`].
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum SendFrameError {
    #[snafu(display("Could not encode frame"))]
    Encode { source: WriteFrameError },
    #[snafu(display("Could not write to the stream"))]
    Write { source: IoError },
}

/// An error type for receiving a [`Frame`] from a [`Connection`].
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ReceiveFrameError {
    #[snafu(display("Could not decode frame"))]
    Decode { source: ParseFrameError },
    #[snafu(display("Connection is closed by the peer with {pending} bytes pending"))]
    Closed { pending: usize },
    #[snafu(display("Could not read from the stream"))]
    Read { source: IoError },
}
