//! Transfer-slot overlay.
//!
//! While the user drags a stack it sits in a single-slot holding container
//! that is not part of any saved inventory. Before a save boundary the stack
//! is spread into real slots so it is persisted; afterwards it is pulled back
//! into the holding slot.

use tracing::{debug, trace, warn};

use stowage_core::constants::TRANSFER_SLOT;
use stowage_core::{EntityId, ResourceKind};

use crate::prediction::{PredictionEngine, RequestSink};

/// Stack parked in real slots during a save boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeldStack {
    /// Resource kind of the parked stack.
    pub kind: ResourceKind,
    /// Units to pull back.
    pub count: u32,
    /// Container the stack was spread into.
    pub target: EntityId,
}

/// Parks the held stack around save boundaries.
#[derive(Debug, Clone)]
pub struct TransferSlotOverlay {
    character: EntityId,
    holding: EntityId,
    held: Option<HeldStack>,
}

impl TransferSlotOverlay {
    /// Overlay for `character`, whose dragged stack lives in `holding`.
    pub fn new(character: EntityId, holding: EntityId) -> Self {
        Self {
            character,
            holding,
            held: None,
        }
    }

    pub fn character(&self) -> EntityId {
        self.character
    }

    pub fn holding(&self) -> EntityId {
        self.holding
    }

    /// The stack currently parked, if any.
    pub fn held(&self) -> Option<&HeldStack> {
        self.held.as_ref()
    }

    pub fn is_holding(&self) -> bool {
        self.held.is_some()
    }

    /// Units still to be pulled back.
    pub fn held_count(&self) -> u32 {
        self.held.as_ref().map_or(0, |held| held.count)
    }

    /// Spread the holding slot's stack into the target container.
    ///
    /// The target is `interaction_target` when it is a known container with
    /// slots, the character's own container otherwise. Returns `true` if a
    /// stack was parked.
    pub fn extract<S: RequestSink>(
        &mut self,
        engine: &mut PredictionEngine<S>,
        interaction_target: Option<EntityId>,
    ) -> bool {
        if let Some(held) = &self.held {
            warn!(
                container = %held.target,
                count = held.count,
                "extract while a stack is already parked"
            );
            return false;
        }

        let Some(item) = engine.item_in_slot(self.holding, TRANSFER_SLOT) else {
            trace!(holding = %self.holding, "nothing held");
            return false;
        };
        let Some(kind) = engine.item_kind(item).cloned() else {
            return false;
        };
        let count = engine.stack_size(item);

        let target = interaction_target
            .filter(|&container| engine.slot_count(container) > 0)
            .unwrap_or(self.character);
        let to_slots: Vec<usize> = (0..engine.slot_count(target)).collect();

        if !engine.submit_fan_out_transfer(
            self.character,
            self.holding,
            TRANSFER_SLOT,
            target,
            to_slots,
        ) {
            debug!(container = %target, %kind, count, "no room to park held stack");
            return false;
        }

        // A full target leaves the rest of the stack in the holding slot
        let parked = count.saturating_sub(self.holding_units(engine));
        debug!(container = %target, %kind, count, parked, "parked held stack");
        self.held = Some(HeldStack {
            kind,
            count: parked,
            target,
        });
        true
    }

    /// Pull the parked stack back into the holding slot.
    ///
    /// Scans the target from its last slot backwards. Returns the number of
    /// units moved back; fewer than parked if the target lost some meanwhile.
    pub fn restore<S: RequestSink>(&mut self, engine: &mut PredictionEngine<S>) -> u32 {
        let Some(held) = self.held.take() else {
            return 0;
        };

        let mut remaining = held.count;
        for slot in (0..engine.slot_count(held.target)).rev() {
            if remaining == 0 {
                break;
            }
            let Some(item) = engine.item_in_slot(held.target, slot) else {
                continue;
            };
            if engine.item_kind(item) != Some(&held.kind) {
                continue;
            }

            let units = remaining.min(engine.stack_size(item));
            let before = self.holding_units(engine);
            if engine.submit_amount_transfer(
                self.character,
                held.target,
                slot,
                self.holding,
                TRANSFER_SLOT,
                units,
            ) {
                remaining -= self.holding_units(engine).saturating_sub(before).min(remaining);
            }
        }

        let restored = held.count - remaining;
        if remaining > 0 {
            warn!(
                container = %held.target,
                kind = %held.kind,
                remaining,
                "could not restore whole held stack"
            );
        } else {
            debug!(container = %held.target, restored, "restored held stack");
        }
        restored
    }

    fn holding_units<S: RequestSink>(&self, engine: &PredictionEngine<S>) -> u32 {
        engine
            .item_in_slot(self.holding, TRANSFER_SLOT)
            .map_or(0, |item| engine.stack_size(item))
    }
}
