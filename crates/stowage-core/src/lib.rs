//! stowage-core: Shared library for stowage inventories and wire protocol.
//!
//! This crate provides:
//! - Entity, container and stack types
//! - The `InventoryState` collaborator trait and the reference slot primitives
//! - Protocol message definitions and wire format codec
//! - Error type, logging and prediction statistics

pub mod constants;
pub mod error;
pub mod inventory;
pub mod logging;
pub mod protocol;
pub mod stats;

pub use error::{Error, Result};
pub use inventory::{
    ChangeId, EntityId, Inventory, InventoryConfig, InventoryState, ItemRecord, ResourceKind,
};
pub use logging::{LogFormat, init_logging};
pub use stats::PredictionStats;
