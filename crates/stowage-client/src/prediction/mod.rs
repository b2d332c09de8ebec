//! Prediction engine for inventory changes.
//!
//! Applies each change to the local view immediately, records it in the
//! pending ledger together with the items the prediction spawned, and
//! rebuilds every still-pending prediction on top of confirmed state
//! whenever the authority acknowledges a change.

mod engine;
mod ledger;
mod replica;
mod request;
mod sink;

pub use engine::PredictionEngine;
pub use ledger::{PendingLedger, PendingMove};
pub use replica::PredictedInventory;
pub use request::{MoveRequest, SpeculativeSet};
pub use sink::{FrameSink, RequestSink};
