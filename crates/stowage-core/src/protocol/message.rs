//! Protocol message types for the stowage wire protocol.
//!
//! Client to authority: the three inventory change requests, each tagged
//! with the client's change id. Authority to client: replicated container
//! contents and the acknowledgment echoing the change id.

use serde::{Deserialize, Serialize};

use crate::inventory::{ChangeId, EntityId, ItemRecord};

/// Top-level protocol message type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    // Client -> authority
    /// Swap the contents of two slots.
    MoveItem(MoveItemPayload),
    /// Move part of a stack into another slot.
    MoveItemAmount(MoveItemAmountPayload),
    /// Distribute a whole stack over a list of slots.
    MoveItemToSlots(MoveItemToSlotsPayload),

    // Authority -> client
    /// Authoritative contents of one container.
    ContainerSync(ContainerSyncPayload),
    /// The authority has processed the given change.
    ChangeAck(ChangeAckPayload),
}

impl Message {
    /// Change id carried by requests and acknowledgments.
    pub fn change_id(&self) -> Option<ChangeId> {
        match self {
            Message::MoveItem(p) => Some(p.change_id),
            Message::MoveItemAmount(p) => Some(p.change_id),
            Message::MoveItemToSlots(p) => Some(p.change_id),
            Message::ChangeAck(p) => Some(p.change_id),
            Message::ContainerSync(_) => None,
        }
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::MoveItem(_) => "MoveItem",
            Message::MoveItemAmount(_) => "MoveItemAmount",
            Message::MoveItemToSlots(_) => "MoveItemToSlots",
            Message::ContainerSync(_) => "ContainerSync",
            Message::ChangeAck(_) => "ChangeAck",
        }
    }
}

/// Swap request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveItemPayload {
    /// Entity credited with the change.
    pub instigator: EntityId,
    /// Source container.
    pub from: EntityId,
    /// Source slot.
    pub from_slot: u32,
    /// Destination container.
    pub to: EntityId,
    /// Destination slot.
    pub to_slot: u32,
    /// Client change id.
    pub change_id: ChangeId,
}

/// Amount transfer request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveItemAmountPayload {
    pub instigator: EntityId,
    pub from: EntityId,
    pub from_slot: u32,
    pub to: EntityId,
    pub to_slot: u32,
    /// Maximum units to move.
    pub count: u32,
    pub change_id: ChangeId,
}

/// Fan-out transfer request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveItemToSlotsPayload {
    pub instigator: EntityId,
    pub from: EntityId,
    pub from_slot: u32,
    pub to: EntityId,
    /// Destination slots, filled in order.
    pub to_slots: Vec<u32>,
    pub change_id: ChangeId,
}

/// Replicated container contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSyncPayload {
    /// Container being replicated.
    pub container: EntityId,
    /// Every slot of the container, in order.
    pub slots: Vec<Option<ItemRecord>>,
}

/// Acknowledgment of a processed change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeAckPayload {
    /// Change id echoed from the request.
    pub change_id: ChangeId,
}
