//! Shared harness for client integration tests.

#![allow(dead_code)]

use std::collections::BTreeSet;

use stowage_client::{EngineConfig, PredictionEngine};
use stowage_core::protocol::Message;
use stowage_core::{EntityId, InventoryConfig, InventoryState};
use stowage_test_utils::FakeAuthority;

pub const ME: EntityId = EntityId(1);

pub type Client = PredictionEngine<Vec<Message>>;

/// Client engine replicating every container of `authority`.
pub fn client(authority: &FakeAuthority) -> Client {
    stowage_core::logging::init_test_logging();
    let inventory: InventoryConfig = authority.inventory().config().clone();
    let config = EngineConfig::new().with_inventory(inventory);
    let mut engine = PredictionEngine::new(config, Vec::new());
    for message in authority.snapshot_messages() {
        engine.handle_message(message).unwrap();
    }
    engine
}

/// Hand every request the client sent so far to the authority.
///
/// Returns one reply batch per request, in submission order.
pub fn exchange(engine: &mut Client, authority: &mut FakeAuthority) -> Vec<Vec<Message>> {
    engine
        .sink_mut()
        .drain(..)
        .map(|request| authority.process(request))
        .collect()
}

/// Deliver replies to the client in the given order.
pub fn deliver(engine: &mut Client, replies: impl IntoIterator<Item = Message>) {
    for reply in replies {
        engine.handle_message(reply).unwrap();
    }
}

/// Whether the predicted view shows exactly the authority's contents.
pub fn view_matches(engine: &Client, authority: &FakeAuthority) -> bool {
    authority
        .inventory()
        .container_ids()
        .all(|container| engine.contents(container) == authority.inventory().contents(container))
}

/// Every speculative item visible in the view is owned by a pending entry.
pub fn assert_no_leaks(engine: &Client) {
    let owned: BTreeSet<EntityId> = engine.ledger().speculative_objects().collect();
    let view = engine.inventory().view();
    for container in view.container_ids() {
        for slot in 0..view.slot_count(container) {
            if let Some(item) = view.item_at(container, slot) {
                if engine.config().is_speculative_id(item.0) {
                    assert!(
                        owned.contains(&item),
                        "{item} in {container} is not owned by any pending change"
                    );
                }
            }
        }
    }
    for item in &owned {
        assert!(engine.config().is_speculative_id(item.0));
    }
}
