//! Prediction statistics.
//!
//! Counters describing how a client's optimistic predictions fared:
//! - submissions accepted and rejected locally
//! - acknowledgments, including ones for unknown changes
//! - reconciliation passes and predictions that no longer apply

use serde::{Deserialize, Serialize};

/// Counters kept by a prediction engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionStats {
    /// Operations applied locally and sent.
    pub submitted: u64,
    /// Operations the local primitives refused.
    pub rejected: u64,
    /// Acknowledgments that retired a pending entry.
    pub acknowledged: u64,
    /// Acknowledgments for change ids the ledger did not hold.
    pub unknown_acks: u64,
    /// Reconciliation passes run.
    pub reconciliations: u64,
    /// Replays whose primitive refused against the confirmed state.
    pub replay_failures: u64,
    /// Speculative objects destroyed.
    pub speculative_destroyed: u64,
    /// Outbound sends that failed.
    pub send_failures: u64,
}

impl PredictionStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of submissions (accepted or not) the local primitives refused.
    pub fn rejection_rate(&self) -> f64 {
        let total = self.submitted + self.rejected;
        if total == 0 {
            return 0.0;
        }
        self.rejected as f64 / total as f64
    }

    /// Operations sent but not yet acknowledged, as far as counters can tell.
    pub fn outstanding(&self) -> u64 {
        self.submitted.saturating_sub(self.acknowledged)
    }

    /// Reset all counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
