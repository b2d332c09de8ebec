//! Inventory model for stowage.
//!
//! This module provides:
//! - Entity, change and stack identifier types
//! - The `InventoryState` trait the prediction engine is written against
//! - `Inventory`, the reference in-memory container store and slot primitives

mod config;
mod state;
mod store;
mod types;

pub use config::InventoryConfig;
pub use state::InventoryState;
pub use store::Inventory;
pub use types::*;
