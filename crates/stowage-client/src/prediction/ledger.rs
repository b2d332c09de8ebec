//! Pending change ledger.
//!
//! Maps change ids to the change that was applied locally and the items its
//! prediction spawned. Lookups go through a hash map; a queue of ids keeps
//! insertion order for replay. Removal leaves a tombstone in the queue that
//! is dropped once it reaches the front, so both insert and remove are O(1).

use std::collections::{HashMap, VecDeque};
use std::mem;

use stowage_core::{ChangeId, EntityId, Error, Result};

use super::request::{MoveRequest, SpeculativeSet};

/// A change applied locally but not yet acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMove {
    change_id: ChangeId,
    request: MoveRequest,
    speculative: SpeculativeSet,
}

impl PendingMove {
    pub fn new(change_id: ChangeId, request: MoveRequest, speculative: SpeculativeSet) -> Self {
        Self {
            change_id,
            request,
            speculative,
        }
    }

    pub fn change_id(&self) -> ChangeId {
        self.change_id
    }

    pub fn request(&self) -> &MoveRequest {
        &self.request
    }

    /// Items this entry's prediction spawned.
    pub fn speculative(&self) -> &SpeculativeSet {
        &self.speculative
    }

    /// Install a fresh speculative set, handing back the previous one.
    pub fn replace_speculative(&mut self, fresh: SpeculativeSet) -> SpeculativeSet {
        mem::replace(&mut self.speculative, fresh)
    }

    /// Take the speculative set out, leaving it empty.
    pub fn take_speculative(&mut self) -> SpeculativeSet {
        mem::take(&mut self.speculative)
    }
}

/// Insertion-ordered ledger of pending changes.
#[derive(Debug, Default)]
pub struct PendingLedger {
    entries: HashMap<ChangeId, PendingMove>,
    order: VecDeque<ChangeId>,
}

impl PendingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly applied change.
    ///
    /// Fails if the change id is already pending.
    pub fn insert(&mut self, entry: PendingMove) -> Result<()> {
        let change_id = entry.change_id;
        if self.entries.contains_key(&change_id) {
            return Err(Error::DuplicateChange(change_id));
        }
        self.entries.insert(change_id, entry);
        self.order.push_back(change_id);
        Ok(())
    }

    /// Retire a change.
    pub fn remove(&mut self, change_id: ChangeId) -> Option<PendingMove> {
        let removed = self.entries.remove(&change_id)?;
        while let Some(front) = self.order.front() {
            if self.entries.contains_key(front) {
                break;
            }
            self.order.pop_front();
        }
        // Out-of-order acks strand tombstones behind a live front entry.
        if self.order.len() > 2 * self.entries.len() + 32 {
            let entries = &self.entries;
            self.order.retain(|id| entries.contains_key(id));
        }
        Some(removed)
    }

    pub fn get(&self, change_id: ChangeId) -> Option<&PendingMove> {
        self.entries.get(&change_id)
    }

    pub fn get_mut(&mut self, change_id: ChangeId) -> Option<&mut PendingMove> {
        self.entries.get_mut(&change_id)
    }

    pub fn contains(&self, change_id: ChangeId) -> bool {
        self.entries.contains_key(&change_id)
    }

    /// Pending entries in the order they were inserted.
    pub fn values_in_order(&self) -> impl Iterator<Item = &PendingMove> + '_ {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Pending change ids in the order they were inserted.
    pub fn ids_in_order(&self) -> Vec<ChangeId> {
        self.values_in_order().map(|entry| entry.change_id).collect()
    }

    /// Every speculative item tracked by any pending entry.
    pub fn speculative_objects(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.values_in_order()
            .flat_map(|entry| entry.speculative.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64) -> PendingMove {
        let request = MoveRequest::amount(EntityId(1), EntityId(10), 0, EntityId(10), 1, 1);
        PendingMove::new(ChangeId(id), request, SpeculativeSet::from([EntityId(1000 + id)]))
    }

    #[test]
    fn insert_rejects_duplicates() {
        let mut ledger = PendingLedger::new();
        ledger.insert(entry(0)).unwrap();
        assert!(matches!(
            ledger.insert(entry(0)),
            Err(Error::DuplicateChange(ChangeId(0)))
        ));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn values_follow_insertion_order() {
        let mut ledger = PendingLedger::new();
        for id in [3, 1, 2] {
            ledger.insert(entry(id)).unwrap();
        }
        assert_eq!(ledger.ids_in_order(), vec![ChangeId(3), ChangeId(1), ChangeId(2)]);
    }

    #[test]
    fn remove_out_of_order_preserves_order() {
        let mut ledger = PendingLedger::new();
        for id in 0..4 {
            ledger.insert(entry(id)).unwrap();
        }

        assert!(ledger.remove(ChangeId(2)).is_some());
        assert!(ledger.remove(ChangeId(2)).is_none());
        assert_eq!(ledger.ids_in_order(), vec![ChangeId(0), ChangeId(1), ChangeId(3)]);

        assert!(ledger.remove(ChangeId(0)).is_some());
        assert_eq!(ledger.ids_in_order(), vec![ChangeId(1), ChangeId(3)]);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn tombstones_are_compacted() {
        let mut ledger = PendingLedger::new();
        for id in 0..200 {
            ledger.insert(entry(id)).unwrap();
        }
        // Keep the front alive so tombstones cannot drain from the front
        for id in 1..200 {
            ledger.remove(ChangeId(id));
        }
        assert_eq!(ledger.len(), 1);
        assert!(ledger.order.len() <= 2 * ledger.len() + 32);
        assert_eq!(ledger.ids_in_order(), vec![ChangeId(0)]);
    }

    #[test]
    fn replace_speculative_returns_previous_set() {
        let mut pending = entry(5);
        let old = pending.replace_speculative(SpeculativeSet::from([EntityId(9)]));
        assert_eq!(old, SpeculativeSet::from([EntityId(1005)]));
        assert_eq!(pending.speculative(), &SpeculativeSet::from([EntityId(9)]));
        assert_eq!(pending.take_speculative().len(), 1);
        assert!(pending.speculative().is_empty());
    }

    #[test]
    fn speculative_objects_spans_entries() {
        let mut ledger = PendingLedger::new();
        ledger.insert(entry(0)).unwrap();
        ledger.insert(entry(1)).unwrap();
        let all: Vec<_> = ledger.speculative_objects().collect();
        assert_eq!(all, vec![EntityId(1000), EntityId(1001)]);
    }
}
