//! Outbound path from the engine to the authority.

use bytes::Bytes;
use tokio::sync::mpsc;

use stowage_core::protocol::{Codec, Message};
use stowage_core::{Error, Result};

/// Destination for change requests.
///
/// `send` must not block: the engine calls it from the dispatch loop.
pub trait RequestSink {
    fn send(&mut self, message: Message) -> Result<()>;
}

/// Collects messages in memory.
impl RequestSink for Vec<Message> {
    fn send(&mut self, message: Message) -> Result<()> {
        self.push(message);
        Ok(())
    }
}

impl RequestSink for mpsc::UnboundedSender<Message> {
    fn send(&mut self, message: Message) -> Result<()> {
        mpsc::UnboundedSender::send(self, message).map_err(|_| Error::ConnectionClosed)
    }
}

/// Encodes messages into wire frames for a byte-oriented transport.
#[derive(Debug, Clone)]
pub struct FrameSink {
    tx: mpsc::UnboundedSender<Bytes>,
    bytes_sent: u64,
}

impl FrameSink {
    pub fn new(tx: mpsc::UnboundedSender<Bytes>) -> Self {
        Self { tx, bytes_sent: 0 }
    }

    /// Total framed bytes handed to the transport.
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }
}

impl RequestSink for FrameSink {
    fn send(&mut self, message: Message) -> Result<()> {
        let frame = Codec::encode(&message)?;
        let len = frame.len() as u64;
        self.tx.send(frame).map_err(|_| Error::ConnectionClosed)?;
        self.bytes_sent += len;
        Ok(())
    }
}
