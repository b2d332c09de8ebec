//! Protocol and configuration constants for stowage.

// =============================================================================
// Protocol Constants
// =============================================================================

/// Maximum message payload size (1 MiB).
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

// =============================================================================
// Inventory Constants
// =============================================================================

/// Default maximum number of units a single stack may hold.
pub const DEFAULT_MAX_STACK_SIZE: u32 = 99;

/// First id handed out by an authoritative inventory.
pub const FIRST_AUTHORITATIVE_ITEM_ID: u64 = 1;

/// Base of the id range reserved for client-side speculative items.
///
/// Authoritative ids must stay below this value.
pub const SPECULATIVE_ID_BASE: u64 = 1 << 48;

/// Slot index of the single-slot transfer (held item) container.
pub const TRANSFER_SLOT: usize = 0;

// =============================================================================
// Prediction Constants
// =============================================================================

/// Ledger size above which the engine starts warning about missing acks.
pub const PENDING_WARN_THRESHOLD: usize = 256;
