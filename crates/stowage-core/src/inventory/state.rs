//! The collaborator interface the prediction engine is written against.

use super::types::{EntityId, ResourceKind};

/// Read access and slot primitives over local container state.
///
/// Queries are pure functions of the current state. The `try_*` primitives
/// either apply the whole mutation and return `true`, or leave the state
/// untouched and return `false`; compatibility and capacity rules are theirs
/// alone. The instigator is carried for authorization on the authoritative
/// side and may be ignored locally.
pub trait InventoryState {
    /// Item occupying `slot` of `container`, if any.
    fn item_at(&self, container: EntityId, slot: usize) -> Option<EntityId>;

    /// Number of slots of `container` (0 if unknown).
    fn slot_count(&self, container: EntityId) -> usize;

    /// Units held by `item` (0 if it does not exist).
    fn stack_size(&self, item: EntityId) -> u32;

    /// Resource kind of `item`.
    fn item_kind(&self, item: EntityId) -> Option<&ResourceKind>;

    /// Whether `item` currently exists.
    fn exists(&self, item: EntityId) -> bool;

    /// Destroy `item`, emptying any slot that holds it.
    ///
    /// Returns false if the item did not exist.
    fn destroy(&mut self, item: EntityId) -> bool;

    /// Swap the contents of two slots.
    fn try_swap(
        &mut self,
        instigator: EntityId,
        from: EntityId,
        from_slot: usize,
        to: EntityId,
        to_slot: usize,
    ) -> bool;

    /// Move up to `count` units from one slot into another.
    fn try_amount_transfer(
        &mut self,
        instigator: EntityId,
        from: EntityId,
        from_slot: usize,
        to: EntityId,
        to_slot: usize,
        count: u32,
    ) -> bool;

    /// Distribute the whole stack at `(from, from_slot)` over `to_slots` of `to`.
    fn try_fan_out_transfer(
        &mut self,
        instigator: EntityId,
        from: EntityId,
        from_slot: usize,
        to: EntityId,
        to_slots: &[usize],
    ) -> bool;

    /// Whether two items could share a stack.
    fn can_stack_together(&self, a: EntityId, b: EntityId) -> bool {
        match (self.item_kind(a), self.item_kind(b)) {
            (Some(ka), Some(kb)) => ka == kb,
            _ => false,
        }
    }

    /// First slot of `container` holding `item`.
    fn find_slot_with_item(&self, container: EntityId, item: EntityId) -> Option<usize> {
        (0..self.slot_count(container)).find(|&slot| self.item_at(container, slot) == Some(item))
    }
}
