//! Inventory change requests and their optimistic application.

use std::collections::BTreeSet;

use stowage_core::protocol::{
    Message, MoveItemAmountPayload, MoveItemPayload, MoveItemToSlotsPayload,
};
use stowage_core::{ChangeId, EntityId, Error, InventoryState, Result};

/// Items that exist locally only because a prediction spawned them.
pub type SpeculativeSet = BTreeSet<EntityId>;

/// One inventory change, as submitted by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveRequest {
    /// Exchange the contents of two slots.
    Swap {
        instigator: EntityId,
        from: EntityId,
        from_slot: usize,
        to: EntityId,
        to_slot: usize,
    },
    /// Move up to `count` units into another slot.
    Amount {
        instigator: EntityId,
        from: EntityId,
        from_slot: usize,
        to: EntityId,
        to_slot: usize,
        count: u32,
    },
    /// Spread a whole stack over `to_slots` in order.
    FanOut {
        instigator: EntityId,
        from: EntityId,
        from_slot: usize,
        to: EntityId,
        to_slots: Vec<usize>,
    },
}

impl MoveRequest {
    pub fn swap(
        instigator: EntityId,
        from: EntityId,
        from_slot: usize,
        to: EntityId,
        to_slot: usize,
    ) -> Self {
        MoveRequest::Swap {
            instigator,
            from,
            from_slot,
            to,
            to_slot,
        }
    }

    pub fn amount(
        instigator: EntityId,
        from: EntityId,
        from_slot: usize,
        to: EntityId,
        to_slot: usize,
        count: u32,
    ) -> Self {
        MoveRequest::Amount {
            instigator,
            from,
            from_slot,
            to,
            to_slot,
            count,
        }
    }

    pub fn fan_out(
        instigator: EntityId,
        from: EntityId,
        from_slot: usize,
        to: EntityId,
        to_slots: Vec<usize>,
    ) -> Self {
        MoveRequest::FanOut {
            instigator,
            from,
            from_slot,
            to,
            to_slots,
        }
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            MoveRequest::Swap { .. } => "swap",
            MoveRequest::Amount { .. } => "amount",
            MoveRequest::FanOut { .. } => "fan_out",
        }
    }

    /// Apply this change to `state` through its slot primitive.
    ///
    /// Returns `None` if the primitive refused. Otherwise returns the items
    /// now occupying destination slots that were empty beforehand; a stack
    /// merged into an existing one contributes nothing.
    pub fn apply<I: InventoryState + ?Sized>(&self, state: &mut I) -> Option<SpeculativeSet> {
        let mut spawned = SpeculativeSet::new();

        match self {
            MoveRequest::Swap {
                instigator,
                from,
                from_slot,
                to,
                to_slot,
            } => {
                // A swap fills whichever side was empty.
                let from_was_empty = state.item_at(*from, *from_slot).is_none();
                let to_was_empty = state.item_at(*to, *to_slot).is_none();
                if !state.try_swap(*instigator, *from, *from_slot, *to, *to_slot) {
                    return None;
                }
                if from_was_empty {
                    spawned.extend(state.item_at(*from, *from_slot));
                }
                if to_was_empty {
                    spawned.extend(state.item_at(*to, *to_slot));
                }
            }
            MoveRequest::Amount {
                instigator,
                from,
                from_slot,
                to,
                to_slot,
                count,
            } => {
                let to_was_empty = state.item_at(*to, *to_slot).is_none();
                if !state.try_amount_transfer(*instigator, *from, *from_slot, *to, *to_slot, *count)
                {
                    return None;
                }
                if to_was_empty {
                    spawned.extend(state.item_at(*to, *to_slot));
                }
            }
            MoveRequest::FanOut {
                instigator,
                from,
                from_slot,
                to,
                to_slots,
            } => {
                let empty_before: BTreeSet<usize> = to_slots
                    .iter()
                    .copied()
                    .filter(|&slot| state.item_at(*to, slot).is_none())
                    .collect();
                if !state.try_fan_out_transfer(*instigator, *from, *from_slot, *to, to_slots) {
                    return None;
                }
                spawned.extend(
                    empty_before
                        .into_iter()
                        .filter_map(|slot| state.item_at(*to, slot)),
                );
            }
        }

        Some(spawned)
    }

    /// Wire message for this change.
    ///
    /// Fails with [`Error::InvalidSlot`] if a slot index does not fit the
    /// wire's 32-bit slot field.
    pub fn to_message(&self, change_id: ChangeId) -> Result<Message> {
        let message = match self {
            MoveRequest::Swap {
                instigator,
                from,
                from_slot,
                to,
                to_slot,
            } => Message::MoveItem(MoveItemPayload {
                instigator: *instigator,
                from: *from,
                from_slot: wire_slot(*from, *from_slot)?,
                to: *to,
                to_slot: wire_slot(*to, *to_slot)?,
                change_id,
            }),
            MoveRequest::Amount {
                instigator,
                from,
                from_slot,
                to,
                to_slot,
                count,
            } => Message::MoveItemAmount(MoveItemAmountPayload {
                instigator: *instigator,
                from: *from,
                from_slot: wire_slot(*from, *from_slot)?,
                to: *to,
                to_slot: wire_slot(*to, *to_slot)?,
                count: *count,
                change_id,
            }),
            MoveRequest::FanOut {
                instigator,
                from,
                from_slot,
                to,
                to_slots,
            } => Message::MoveItemToSlots(MoveItemToSlotsPayload {
                instigator: *instigator,
                from: *from,
                from_slot: wire_slot(*from, *from_slot)?,
                to: *to,
                to_slots: to_slots
                    .iter()
                    .map(|&slot| wire_slot(*to, slot))
                    .collect::<Result<_>>()?,
                change_id,
            }),
        };
        Ok(message)
    }
}

fn wire_slot(container: EntityId, slot: usize) -> Result<u32> {
    u32::try_from(slot).map_err(|_| Error::InvalidSlot { container, slot })
}
