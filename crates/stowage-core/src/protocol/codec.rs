//! Wire codec for stowage messages.
//!
//! Format: 4-byte little-endian length prefix + bincode-encoded `Message`.
//! Partial frames decode to `Ok(None)` and leave the buffer untouched.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::constants::MAX_MESSAGE_SIZE;
use crate::error::{Error, Result};
use crate::protocol::Message;

/// Length of the frame header (4 bytes, little-endian u32).
pub const FRAME_HEADER_LEN: usize = 4;

/// Codec for length-prefixed bincode encoding of messages.
pub struct Codec;

impl Codec {
    /// Encode a message to a frame, header included.
    pub fn encode(msg: &Message) -> Result<Bytes> {
        let payload = bincode::serialize(msg).map_err(|e| Error::Codec {
            message: format!("serialization failed: {}", e),
        })?;

        if payload.len() > MAX_MESSAGE_SIZE {
            return Err(Error::Codec {
                message: format!(
                    "message too large: {} bytes (max {})",
                    payload.len(),
                    MAX_MESSAGE_SIZE
                ),
            });
        }

        let mut buf = BytesMut::with_capacity(FRAME_HEADER_LEN + payload.len());
        buf.put_u32_le(payload.len() as u32);
        buf.put_slice(&payload);

        Ok(buf.freeze())
    }

    /// Decode one message from the front of `buf`.
    ///
    /// Returns:
    /// - Ok(Some(msg)) if a complete frame was decoded (buffer is advanced)
    /// - Ok(None) if more data is needed (buffer unchanged)
    /// - Err if the frame is oversized or malformed
    pub fn decode(buf: &mut BytesMut) -> Result<Option<Message>> {
        if buf.len() < FRAME_HEADER_LEN {
            return Ok(None);
        }

        let len = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;

        // Reject oversized frames before waiting for the rest
        if len > MAX_MESSAGE_SIZE {
            return Err(Error::Codec {
                message: format!(
                    "message length {} exceeds maximum {}",
                    len, MAX_MESSAGE_SIZE
                ),
            });
        }

        if buf.len() < FRAME_HEADER_LEN + len {
            return Ok(None);
        }

        buf.advance(FRAME_HEADER_LEN);
        let payload = buf.split_to(len);
        let msg = bincode::deserialize(&payload).map_err(|e| Error::Codec {
            message: format!("deserialization failed: {}", e),
        })?;

        Ok(Some(msg))
    }

    /// Decode from a slice (convenience for testing).
    pub fn decode_slice(data: &[u8]) -> Result<Option<Message>> {
        let mut buf = BytesMut::from(data);
        Self::decode(&mut buf)
    }
}
