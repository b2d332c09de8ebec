//! Fake authoritative collaborator.
//!
//! Holds the authoritative inventory and answers every change request the
//! way the real authority does: apply the primitive, replicate the touched
//! containers, then acknowledge the change id. Rejected requests are still
//! replicated and acknowledged.

use tracing::{debug, trace};

use stowage_core::protocol::{ChangeAckPayload, ContainerSyncPayload, Message};
use stowage_core::{
    ChangeId, EntityId, Inventory, InventoryConfig, InventoryState, ResourceKind, Result,
};

/// In-memory authority over a set of containers.
#[derive(Debug, Clone)]
pub struct FakeAuthority {
    inventory: Inventory,
    /// Refuse every change while set.
    refusing: bool,
    applied: u64,
    refused: u64,
}

impl Default for FakeAuthority {
    fn default() -> Self {
        Self::new(InventoryConfig::default())
    }
}

impl FakeAuthority {
    pub fn new(config: InventoryConfig) -> Self {
        Self {
            inventory: Inventory::new(config),
            refusing: false,
            applied: 0,
            refused: 0,
        }
    }

    /// Add an empty container.
    pub fn create_container(&mut self, container: EntityId, slots: usize) -> Result<()> {
        self.inventory.create_container(container, slots)
    }

    /// Spawn a stack into an empty slot.
    pub fn place(
        &mut self,
        container: EntityId,
        slot: usize,
        kind: impl Into<ResourceKind>,
        count: u32,
    ) -> Result<EntityId> {
        self.inventory.place(container, slot, kind, count)
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    /// Refuse (but still acknowledge) every change while `refusing` is set.
    pub fn set_refusing(&mut self, refusing: bool) {
        self.refusing = refusing;
    }

    /// Number of changes applied.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    /// Number of changes refused.
    pub fn refused(&self) -> u64 {
        self.refused
    }

    /// Replication of one container.
    pub fn sync(&self, container: EntityId) -> Option<Message> {
        let slots = self.inventory.contents(container)?;
        Some(Message::ContainerSync(ContainerSyncPayload { container, slots }))
    }

    /// Replication of every container, as sent when a client joins.
    pub fn snapshot_messages(&self) -> Vec<Message> {
        self.inventory
            .container_ids()
            .filter_map(|container| self.sync(container))
            .collect()
    }

    /// Handle one message from a client.
    ///
    /// Returns the replies in delivery order. Messages that are not change
    /// requests get no reply.
    pub fn process(&mut self, message: Message) -> Vec<Message> {
        let (change_id, from, to, accepted) = match message {
            Message::MoveItem(p) => {
                let accepted = !self.refusing
                    && self.inventory.try_swap(
                        p.instigator,
                        p.from,
                        p.from_slot as usize,
                        p.to,
                        p.to_slot as usize,
                    );
                (p.change_id, p.from, p.to, accepted)
            }
            Message::MoveItemAmount(p) => {
                let accepted = !self.refusing
                    && self.inventory.try_amount_transfer(
                        p.instigator,
                        p.from,
                        p.from_slot as usize,
                        p.to,
                        p.to_slot as usize,
                        p.count,
                    );
                (p.change_id, p.from, p.to, accepted)
            }
            Message::MoveItemToSlots(p) => {
                let to_slots: Vec<usize> = p.to_slots.iter().map(|&slot| slot as usize).collect();
                let accepted = !self.refusing
                    && self.inventory.try_fan_out_transfer(
                        p.instigator,
                        p.from,
                        p.from_slot as usize,
                        p.to,
                        &to_slots,
                    );
                (p.change_id, p.from, p.to, accepted)
            }
            other => {
                trace!(kind = other.kind(), "ignoring non-request message");
                return Vec::new();
            }
        };

        if accepted {
            self.applied += 1;
        } else {
            self.refused += 1;
        }
        debug!(%change_id, accepted, "processed change");
        self.replies(change_id, from, to)
    }

    /// Process a batch of messages, concatenating the replies.
    pub fn process_all(&mut self, messages: impl IntoIterator<Item = Message>) -> Vec<Message> {
        messages
            .into_iter()
            .flat_map(|message| self.process(message))
            .collect()
    }

    fn replies(&self, change_id: ChangeId, from: EntityId, to: EntityId) -> Vec<Message> {
        let mut replies: Vec<Message> = self.sync(from).into_iter().collect();
        if to != from {
            replies.extend(self.sync(to));
        }
        replies.push(Message::ChangeAck(ChangeAckPayload { change_id }));
        replies
    }
}
