//! Prediction engine configuration.

use stowage_core::InventoryConfig;
use stowage_core::constants::{PENDING_WARN_THRESHOLD, SPECULATIVE_ID_BASE};

/// Configuration for a [`PredictionEngine`](crate::PredictionEngine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Rules for the local inventory replica.
    pub inventory: InventoryConfig,
    /// First id used for items spawned by local prediction.
    ///
    /// Must lie above every id the authority hands out.
    pub speculative_id_base: u64,
    /// Ledger size above which each submit logs a warning.
    pub pending_warn_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            inventory: InventoryConfig::default(),
            speculative_id_base: SPECULATIVE_ID_BASE,
            pending_warn_threshold: PENDING_WARN_THRESHOLD,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inventory rules.
    pub fn with_inventory(mut self, inventory: InventoryConfig) -> Self {
        self.inventory = inventory;
        self
    }

    /// Set the base of the speculative id range.
    pub fn with_speculative_id_base(mut self, base: u64) -> Self {
        self.speculative_id_base = base;
        self
    }

    /// Set the pending-ledger warning threshold.
    pub fn with_pending_warn_threshold(mut self, threshold: usize) -> Self {
        self.pending_warn_threshold = threshold;
        self
    }

    /// Whether `id` falls in the speculative range.
    pub fn is_speculative_id(&self, id: u64) -> bool {
        id >= self.speculative_id_base
    }
}
