//! Inventory configuration.

use crate::constants::{DEFAULT_MAX_STACK_SIZE, FIRST_AUTHORITATIVE_ITEM_ID};

/// Configuration of an in-memory [`Inventory`](super::Inventory).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryConfig {
    /// Maximum units per stack.
    pub max_stack_size: u32,
    /// First id handed out to items spawned by the slot primitives.
    pub first_item_id: u64,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            max_stack_size: DEFAULT_MAX_STACK_SIZE,
            first_item_id: FIRST_AUTHORITATIVE_ITEM_ID,
        }
    }
}

impl InventoryConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum stack size (clamped to at least 1).
    pub fn with_max_stack_size(mut self, max: u32) -> Self {
        self.max_stack_size = max.max(1);
        self
    }

    /// Set the first id handed out to spawned items.
    pub fn with_first_item_id(mut self, id: u64) -> Self {
        self.first_item_id = id;
        self
    }
}
