//! Client-side overlays built on the prediction engine.
//!
//! Provides:
//! - Transfer-slot parking across save boundaries

mod transfer_slot;

pub use transfer_slot::{HeldStack, TransferSlotOverlay};
