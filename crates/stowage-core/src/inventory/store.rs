//! In-memory container store with the reference slot primitives.
//!
//! Rules shared by every primitive:
//! - a stack landing in a previously empty slot is always a newly spawned item
//! - a source stack that is emptied by a move is destroyed
//! - validation happens before any mutation, so a rejected call leaves the
//!   store untouched
//! - two items stack together when they hold the same resource kind

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use super::config::InventoryConfig;
use super::state::InventoryState;
use super::types::{EntityId, ItemRecord, ResourceKind};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Stack {
    kind: ResourceKind,
    count: u32,
}

/// One step of a planned fan-out.
#[derive(Debug, Clone, Copy)]
enum Placement {
    Merge { slot: usize, item: EntityId, units: u32 },
    Spawn { slot: usize, units: u32 },
}

/// Containers and the items they hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    config: InventoryConfig,
    containers: BTreeMap<EntityId, Vec<Option<EntityId>>>,
    items: BTreeMap<EntityId, Stack>,
    next_item_id: u64,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new(InventoryConfig::default())
    }
}

impl Inventory {
    /// Create an empty store.
    pub fn new(config: InventoryConfig) -> Self {
        let next_item_id = config.first_item_id;
        Self {
            config,
            containers: BTreeMap::new(),
            items: BTreeMap::new(),
            next_item_id,
        }
    }

    /// Get the store configuration.
    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    /// Create a container with `slots` empty slots.
    ///
    /// Re-creating an existing container with the same slot count is a no-op.
    pub fn create_container(&mut self, container: EntityId, slots: usize) -> Result<()> {
        if let Some(existing) = self.containers.get(&container) {
            if existing.len() != slots {
                return Err(Error::SlotCountMismatch {
                    container,
                    expected: existing.len(),
                    actual: slots,
                });
            }
            return Ok(());
        }
        self.containers.insert(container, vec![None; slots]);
        Ok(())
    }

    /// Whether `container` is known.
    pub fn has_container(&self, container: EntityId) -> bool {
        self.containers.contains_key(&container)
    }

    /// Spawn a stack of `count` units of `kind` into an empty slot.
    pub fn place(
        &mut self,
        container: EntityId,
        slot: usize,
        kind: impl Into<ResourceKind>,
        count: u32,
    ) -> Result<EntityId> {
        match self.slot(container, slot) {
            None if !self.has_container(container) => Err(Error::UnknownContainer(container)),
            None => Err(Error::InvalidSlot { container, slot }),
            Some(Some(_)) => Err(Error::Protocol {
                message: format!("slot {} of container {} is occupied", slot, container),
            }),
            Some(None) => {
                let id = self.spawn(kind.into(), count);
                self.set_slot(container, slot, Some(id));
                Ok(id)
            }
        }
    }

    /// Snapshot of one item.
    pub fn item(&self, item: EntityId) -> Option<ItemRecord> {
        self.items.get(&item).map(|stack| ItemRecord {
            id: item,
            kind: stack.kind.clone(),
            count: stack.count,
        })
    }

    /// Ids of every live item.
    pub fn item_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.items.keys().copied()
    }

    /// Ids of every known container.
    pub fn container_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.containers.keys().copied()
    }

    /// Full contents of a container, slot by slot.
    pub fn contents(&self, container: EntityId) -> Option<Vec<Option<ItemRecord>>> {
        self.containers.get(&container).map(|slots| {
            slots
                .iter()
                .map(|slot| slot.and_then(|id| self.item(id)))
                .collect()
        })
    }

    /// Overwrite a container with replicated authoritative contents.
    ///
    /// Creates the container on first sight. Items named in `slots` are
    /// inserted or updated in place.
    pub fn apply_sync(&mut self, container: EntityId, slots: &[Option<ItemRecord>]) -> Result<()> {
        self.create_container(container, slots.len())?;

        let mut layout = Vec::with_capacity(slots.len());
        for record in slots {
            layout.push(record.as_ref().map(|record| {
                self.items.insert(
                    record.id,
                    Stack {
                        kind: record.kind.clone(),
                        count: record.count,
                    },
                );
                record.id
            }));
        }
        self.containers.insert(container, layout);
        Ok(())
    }

    /// Drop items that no slot references any more.
    ///
    /// Returns the number of items removed.
    pub fn prune_unreferenced(&mut self) -> usize {
        let referenced: BTreeSet<EntityId> = self
            .containers
            .values()
            .flatten()
            .flatten()
            .copied()
            .collect();
        let before = self.items.len();
        self.items.retain(|id, _| referenced.contains(id));
        before - self.items.len()
    }

    /// Id the next spawned item will receive.
    pub fn next_item_id(&self) -> u64 {
        self.next_item_id
    }

    /// Restart item id allocation at `next`.
    pub fn reset_item_ids(&mut self, next: u64) {
        self.next_item_id = next;
    }

    fn spawn(&mut self, kind: ResourceKind, count: u32) -> EntityId {
        let id = EntityId(self.next_item_id);
        self.next_item_id += 1;
        self.items.insert(id, Stack { kind, count });
        trace!(item = %id, count, "spawned item");
        id
    }

    /// Replace `item` by a fresh item with the same stack.
    fn respawn(&mut self, item: EntityId) -> Option<EntityId> {
        let stack = self.items.remove(&item)?;
        Some(self.spawn(stack.kind, stack.count))
    }

    /// `None` if the slot does not exist, `Some(occupant)` otherwise.
    fn slot(&self, container: EntityId, slot: usize) -> Option<Option<EntityId>> {
        self.containers.get(&container)?.get(slot).copied()
    }

    fn set_slot(&mut self, container: EntityId, slot: usize, item: Option<EntityId>) {
        if let Some(cell) = self
            .containers
            .get_mut(&container)
            .and_then(|slots| slots.get_mut(slot))
        {
            *cell = item;
        }
    }

    fn room_in(&self, item: EntityId) -> u32 {
        self.config
            .max_stack_size
            .saturating_sub(self.stack_size(item))
    }

    fn plan_fan_out(
        &self,
        from: EntityId,
        from_slot: usize,
        to: EntityId,
        to_slots: &[usize],
        kind: &ResourceKind,
        mut remaining: u32,
    ) -> Vec<Placement> {
        let mut plan = Vec::new();
        let mut visited = BTreeSet::new();

        for &slot in to_slots {
            if remaining == 0 {
                break;
            }
            if (to == from && slot == from_slot) || !visited.insert(slot) {
                continue;
            }
            let placement = match self.slot(to, slot).flatten() {
                Some(item) if self.item_kind(item) == Some(kind) => {
                    let units = remaining.min(self.room_in(item));
                    (units > 0).then_some(Placement::Merge { slot, item, units })
                }
                Some(_) => None,
                None => Some(Placement::Spawn {
                    slot,
                    units: remaining.min(self.config.max_stack_size),
                }),
            };
            if let Some(placement) = placement {
                remaining -= match placement {
                    Placement::Merge { units, .. } | Placement::Spawn { units, .. } => units,
                };
                plan.push(placement);
            }
        }

        plan
    }

    /// Take `units` off the stack at `(container, slot)`, destroying it when emptied.
    fn drain(&mut self, container: EntityId, slot: usize, item: EntityId, units: u32) {
        let emptied = match self.items.get_mut(&item) {
            Some(stack) => {
                stack.count -= units;
                stack.count == 0
            }
            None => false,
        };
        if emptied {
            self.items.remove(&item);
            self.set_slot(container, slot, None);
        }
    }
}

impl InventoryState for Inventory {
    fn item_at(&self, container: EntityId, slot: usize) -> Option<EntityId> {
        self.slot(container, slot).flatten()
    }

    fn slot_count(&self, container: EntityId) -> usize {
        self.containers.get(&container).map_or(0, Vec::len)
    }

    fn stack_size(&self, item: EntityId) -> u32 {
        self.items.get(&item).map_or(0, |stack| stack.count)
    }

    fn item_kind(&self, item: EntityId) -> Option<&ResourceKind> {
        self.items.get(&item).map(|stack| &stack.kind)
    }

    fn exists(&self, item: EntityId) -> bool {
        self.items.contains_key(&item)
    }

    fn destroy(&mut self, item: EntityId) -> bool {
        if self.items.remove(&item).is_none() {
            return false;
        }
        for cell in self.containers.values_mut().flatten() {
            if *cell == Some(item) {
                *cell = None;
            }
        }
        trace!(item = %item, "destroyed item");
        true
    }

    fn try_swap(
        &mut self,
        _instigator: EntityId,
        from: EntityId,
        from_slot: usize,
        to: EntityId,
        to_slot: usize,
    ) -> bool {
        if from == to && from_slot == to_slot {
            return false;
        }
        let (Some(source), Some(target)) = (self.slot(from, from_slot), self.slot(to, to_slot))
        else {
            return false;
        };

        let (source, target) = match (source, target) {
            (None, None) => return false,
            (Some(a), Some(b)) => (Some(b), Some(a)),
            (Some(a), None) => (None, self.respawn(a)),
            (None, Some(b)) => (self.respawn(b), None),
        };
        self.set_slot(from, from_slot, source);
        self.set_slot(to, to_slot, target);
        true
    }

    fn try_amount_transfer(
        &mut self,
        _instigator: EntityId,
        from: EntityId,
        from_slot: usize,
        to: EntityId,
        to_slot: usize,
        count: u32,
    ) -> bool {
        if count == 0 || (from == to && from_slot == to_slot) {
            return false;
        }
        let Some(Some(source)) = self.slot(from, from_slot) else {
            return false;
        };
        let Some(target) = self.slot(to, to_slot) else {
            return false;
        };
        let Some(kind) = self.item_kind(source).cloned() else {
            return false;
        };
        let available = self.stack_size(source);

        match target {
            None => {
                let units = count.min(available).min(self.config.max_stack_size);
                let spawned = self.spawn(kind, units);
                self.drain(from, from_slot, source, units);
                self.set_slot(to, to_slot, Some(spawned));
            }
            Some(existing) => {
                if self.item_kind(existing) != Some(&kind) {
                    return false;
                }
                let units = count.min(available).min(self.room_in(existing));
                if units == 0 {
                    return false;
                }
                if let Some(stack) = self.items.get_mut(&existing) {
                    stack.count += units;
                }
                self.drain(from, from_slot, source, units);
            }
        }
        true
    }

    fn try_fan_out_transfer(
        &mut self,
        _instigator: EntityId,
        from: EntityId,
        from_slot: usize,
        to: EntityId,
        to_slots: &[usize],
    ) -> bool {
        let Some(Some(source)) = self.slot(from, from_slot) else {
            return false;
        };
        let slot_count = self.slot_count(to);
        if slot_count == 0 || to_slots.iter().any(|&slot| slot >= slot_count) {
            return false;
        }
        let Some(kind) = self.item_kind(source).cloned() else {
            return false;
        };

        let plan = self.plan_fan_out(from, from_slot, to, to_slots, &kind, self.stack_size(source));
        if plan.is_empty() {
            return false;
        }

        for placement in plan {
            match placement {
                Placement::Merge { item, units, .. } => {
                    if let Some(stack) = self.items.get_mut(&item) {
                        stack.count += units;
                    }
                    self.drain(from, from_slot, source, units);
                }
                Placement::Spawn { slot, units } => {
                    let spawned = self.spawn(kind.clone(), units);
                    self.set_slot(to, slot, Some(spawned));
                    self.drain(from, from_slot, source, units);
                }
            }
        }
        true
    }
}

// =============================================================================
// Tests
// =============================================================================
