use bytes::{BufMut, BytesMut};
use serde_json::Error as SerdeError;
use snafu::prelude::*;

use crate::protocol::data::Protocol;

const START: u8 = b'+';
const HEADER_LEN: usize = 1 + std::mem::size_of::<u64>();
/// Upper bound of a payload. Real requests and responses are a few hundred
/// bytes, anything near this is a corrupted length.
const MAX_PAYLOAD_LEN: u64 = 1 << 20;

/// One [`Protocol`] message on the wire:
/// `b'+'`, the payload length as a big-endian `u64`, then the JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    payload: Protocol,
}

impl Frame {
    /// Decode the frame at the front of `src`. `Ok(None)` means `src` does not
    /// hold a whole frame yet. On success the number of consumed bytes is
    /// returned along with the frame.
    ///
    /// # Errors
    ///
    /// This function will return an error if the header or the payload is
    /// broken.
    pub fn decode(src: &[u8]) -> Result<Option<(Self, usize)>, ParseFrameError> {
        let Some((&start, rest)) = src.split_first() else {
            return Ok(None);
        };
        ensure!(start == START, InvalidStartSnafu { found: start });

        let Some(len) = rest.get(..8) else {
            return Ok(None);
        };
        let mut len_bytes = [0; 8];
        len_bytes.copy_from_slice(len);
        let len = u64::from_be_bytes(len_bytes);
        ensure!(
            len > 0 && len <= MAX_PAYLOAD_LEN,
            InvalidLengthSnafu { len }
        );

        // Bounded by MAX_PAYLOAD_LEN above.
        let end = HEADER_LEN + len as usize;
        let Some(payload) = src.get(HEADER_LEN..end) else {
            return Ok(None);
        };
        let payload = serde_json::from_slice(payload).context(DeserializationSnafu)?;
        Ok(Some((Self { payload }, end)))
    }

    /// Append the encoded frame to `dst`.
    ///
    /// # Errors
    ///
    /// This function will return an error if the payload could not be
    /// serialized.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<(), WriteFrameError> {
        let payload = serde_json::to_vec(&self.payload).context(SerializationSnafu)?;
        dst.reserve(HEADER_LEN + payload.len());
        dst.put_u8(START);
        dst.put_u64(payload.len() as u64);
        dst.put_slice(&payload);
        Ok(())
    }
}

impl From<Protocol> for Frame {
    fn from(payload: Protocol) -> Self {
        Self { payload }
    }
}

impl From<Frame> for Protocol {
    fn from(frame: Frame) -> Self {
        frame.payload
    }
}

/// An error type for decoding a [`Frame`].
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ParseFrameError {
    #[snafu(display("Frame starts with {found:#04x} instead of '+'"))]
    InvalidStart { found: u8 },
    #[snafu(display("Frame payload length {len} is out of range"))]
    InvalidLength { len: u64 },
    #[snafu(display("Could not deserialize frame payload"))]
    Deserialization { source: SerdeError },
}

/// An error type for encoding a [`Frame`].
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum WriteFrameError {
    #[snafu(display("Could not serialize frame payload"))]
    Serialization { source: SerdeError },
}
