//! Protocol module for the stowage wire format.
//!
//! This module provides:
//! - Message types and payloads
//! - Length-prefixed bincode codec

mod codec;
mod message;

#[cfg(test)]
mod proptest;

pub use codec::{Codec, FRAME_HEADER_LEN};
pub use message::*;
