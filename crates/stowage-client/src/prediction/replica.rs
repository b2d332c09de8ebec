//! Local inventory replica with a confirmed layer and a predicted view.

use stowage_core::{EntityId, Inventory, InventoryState, ItemRecord, ResourceKind, Result};
use tracing::trace;

use crate::config::EngineConfig;

/// Client copy of container state.
///
/// `confirmed` only ever changes through replication from the authority.
/// `view` is what the UI sees: confirmed contents with pending predictions
/// applied on top. Items spawned in the view get ids from the speculative
/// range, so they can never collide with authoritative ids.
#[derive(Debug, Clone)]
pub struct PredictedInventory {
    confirmed: Inventory,
    view: Inventory,
    speculative_id_base: u64,
}

impl PredictedInventory {
    pub fn new(config: &EngineConfig) -> Self {
        let confirmed = Inventory::new(config.inventory.clone());
        let mut view = confirmed.clone();
        view.reset_item_ids(config.speculative_id_base);
        Self {
            confirmed,
            view,
            speculative_id_base: config.speculative_id_base,
        }
    }

    /// Last authoritative contents.
    pub fn confirmed(&self) -> &Inventory {
        &self.confirmed
    }

    /// Contents as currently predicted.
    pub fn view(&self) -> &Inventory {
        &self.view
    }

    /// Overwrite one container with authoritative contents.
    ///
    /// Only the confirmed layer changes; the view catches up on the next
    /// rewind.
    pub fn apply_sync(&mut self, container: EntityId, slots: &[Option<ItemRecord>]) -> Result<()> {
        self.confirmed.apply_sync(container, slots)?;
        let pruned = self.confirmed.prune_unreferenced();
        trace!(%container, slots = slots.len(), pruned, "applied container sync");
        Ok(())
    }

    /// Reset the view to confirmed contents.
    ///
    /// Every speculative item disappears and speculative id allocation
    /// restarts, so replaying the same changes yields the same ids.
    pub fn rewind(&mut self) {
        self.view = self.confirmed.clone();
        self.view.reset_item_ids(self.speculative_id_base);
    }

    /// Whether the view matches confirmed contents slot for slot.
    pub fn is_settled(&self) -> bool {
        self.confirmed
            .container_ids()
            .all(|container| self.confirmed.contents(container) == self.view.contents(container))
    }
}

impl InventoryState for PredictedInventory {
    fn item_at(&self, container: EntityId, slot: usize) -> Option<EntityId> {
        self.view.item_at(container, slot)
    }

    fn slot_count(&self, container: EntityId) -> usize {
        self.view.slot_count(container)
    }

    fn stack_size(&self, item: EntityId) -> u32 {
        self.view.stack_size(item)
    }

    fn item_kind(&self, item: EntityId) -> Option<&ResourceKind> {
        self.view.item_kind(item)
    }

    fn exists(&self, item: EntityId) -> bool {
        self.view.exists(item)
    }

    fn destroy(&mut self, item: EntityId) -> bool {
        self.view.destroy(item)
    }

    fn try_swap(
        &mut self,
        instigator: EntityId,
        from: EntityId,
        from_slot: usize,
        to: EntityId,
        to_slot: usize,
    ) -> bool {
        self.view.try_swap(instigator, from, from_slot, to, to_slot)
    }

    fn try_amount_transfer(
        &mut self,
        instigator: EntityId,
        from: EntityId,
        from_slot: usize,
        to: EntityId,
        to_slot: usize,
        count: u32,
    ) -> bool {
        self.view
            .try_amount_transfer(instigator, from, from_slot, to, to_slot, count)
    }

    fn try_fan_out_transfer(
        &mut self,
        instigator: EntityId,
        from: EntityId,
        from_slot: usize,
        to: EntityId,
        to_slots: &[usize],
    ) -> bool {
        self.view
            .try_fan_out_transfer(instigator, from, from_slot, to, to_slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BAG: EntityId = EntityId(100);

    fn replica() -> PredictedInventory {
        let config = EngineConfig::new().with_speculative_id_base(1_000);
        let mut replica = PredictedInventory::new(&config);
        replica
            .apply_sync(BAG, &[Some(ItemRecord::new(EntityId(5), "wood", 5)), None])
            .unwrap();
        replica.rewind();
        replica
    }

    #[test]
    fn predictions_use_speculative_ids() {
        let mut replica = replica();
        assert!(replica.try_amount_transfer(EntityId(1), BAG, 0, BAG, 1, 2));
        assert_eq!(replica.item_at(BAG, 1), Some(EntityId(1_000)));
        assert!(replica.confirmed().item_at(BAG, 1).is_none());
        assert!(!replica.is_settled());
    }

    #[test]
    fn rewind_restores_confirmed_and_id_allocation() {
        let mut replica = replica();
        assert!(replica.try_amount_transfer(EntityId(1), BAG, 0, BAG, 1, 2));
        replica.rewind();
        assert!(replica.is_settled());
        assert_eq!(replica.stack_size(EntityId(5)), 5);

        assert!(replica.try_amount_transfer(EntityId(1), BAG, 0, BAG, 1, 2));
        assert_eq!(replica.item_at(BAG, 1), Some(EntityId(1_000)));
    }

    #[test]
    fn sync_lands_in_confirmed_until_rewind() {
        let mut replica = replica();
        assert!(replica.try_amount_transfer(EntityId(1), BAG, 0, BAG, 1, 2));

        replica
            .apply_sync(
                BAG,
                &[
                    Some(ItemRecord::new(EntityId(5), "wood", 3)),
                    Some(ItemRecord::new(EntityId(6), "wood", 2)),
                ],
            )
            .unwrap();
        assert_eq!(replica.confirmed().item_at(BAG, 1), Some(EntityId(6)));
        assert_eq!(replica.item_at(BAG, 1), Some(EntityId(1_000)));

        replica.rewind();
        assert_eq!(replica.item_at(BAG, 1), Some(EntityId(6)));
        assert!(!replica.exists(EntityId(1_000)));
        assert!(replica.is_settled());
    }
}
