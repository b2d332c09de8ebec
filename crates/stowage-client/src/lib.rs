//! stowage-client: optimistic inventory prediction for stowage clients.
//!
//! This crate provides:
//! - `PredictionEngine`: apply locally, record, send, reconcile on acknowledgment
//! - `PendingLedger`: the insertion-ordered record of unconfirmed changes
//! - `PredictedInventory`: confirmed replica plus predicted view
//! - `TransferSlotOverlay`: parks a held stack across save boundaries
//! - `ClientSession`: single-task driver over UI commands and inbound messages

pub mod config;
pub mod overlay;
pub mod prediction;
pub mod session;

pub use config::EngineConfig;
pub use overlay::{HeldStack, TransferSlotOverlay};
pub use prediction::{
    FrameSink, MoveRequest, PendingLedger, PendingMove, PredictedInventory, PredictionEngine,
    RequestSink, SpeculativeSet,
};
pub use session::{ClientSession, SessionCommand, SessionSnapshot};
