//! Core prediction engine implementation.

use tracing::{debug, error, trace, warn};

use stowage_core::protocol::{ContainerSyncPayload, Message};
use stowage_core::{
    ChangeId, EntityId, Error, InventoryState, ItemRecord, PredictionStats, ResourceKind, Result,
};

use super::ledger::{PendingLedger, PendingMove};
use super::replica::PredictedInventory;
use super::request::{MoveRequest, SpeculativeSet};
use super::sink::RequestSink;
use crate::config::EngineConfig;

/// Engine for optimistic inventory changes.
///
/// One engine per connected session. All mutation of the local replica and
/// the ledger goes through `submit*`, `on_acknowledged` and `apply_sync`.
#[derive(Debug)]
pub struct PredictionEngine<S> {
    config: EngineConfig,
    /// Local replica; the UI reads its view.
    inventory: PredictedInventory,
    /// Changes applied locally and not yet acknowledged.
    ledger: PendingLedger,
    /// Next change id to assign.
    next_change: ChangeId,
    /// Outbound path to the authority.
    sink: S,
    stats: PredictionStats,
}

impl<S: RequestSink> PredictionEngine<S> {
    /// Create an engine with an empty replica.
    pub fn new(config: EngineConfig, sink: S) -> Self {
        let inventory = PredictedInventory::new(&config);
        Self {
            config,
            inventory,
            ledger: PendingLedger::new(),
            next_change: ChangeId(0),
            sink,
            stats: PredictionStats::new(),
        }
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Apply `request` locally and send it to the authority.
    ///
    /// Returns `false` if the change does not fit the wire format, the local
    /// primitive refused it, or it could not be sent; the view and the
    /// ledger are then unchanged. `true` means
    /// the view already shows the change and the request is on its way.
    pub fn submit(&mut self, request: MoveRequest) -> bool {
        let message = match request.to_message(self.next_change) {
            Ok(message) => message,
            Err(e) => {
                self.stats.rejected += 1;
                debug!(kind = request.kind(), error = %e, "change not encodable");
                return false;
            }
        };
        let Some(speculative) = request.apply(&mut self.inventory) else {
            self.stats.rejected += 1;
            trace!(kind = request.kind(), "change refused locally");
            return false;
        };

        let change_id = self.next_change.post_increment();
        debug!(
            %change_id,
            kind = request.kind(),
            spawned = speculative.len(),
            "applied change locally"
        );

        if let Err(e) = self
            .ledger
            .insert(PendingMove::new(change_id, request, speculative))
        {
            error!(%change_id, error = %e, "ledger refused change");
            self.reconcile_all();
            return false;
        }

        if let Err(e) = self.sink.send(message) {
            warn!(%change_id, error = %e, "failed to send change, rolling back");
            self.stats.send_failures += 1;
            if let Some(entry) = self.ledger.remove(change_id) {
                self.destroy_speculative(entry.speculative());
            }
            self.reconcile_all();
            return false;
        }

        self.stats.submitted += 1;
        if self.ledger.len() > self.config.pending_warn_threshold {
            warn!(
                pending = self.ledger.len(),
                threshold = self.config.pending_warn_threshold,
                "pending changes piling up, acknowledgments may be lost"
            );
        }
        true
    }

    /// Swap the contents of two slots.
    pub fn submit_swap(
        &mut self,
        instigator: EntityId,
        from: EntityId,
        from_slot: usize,
        to: EntityId,
        to_slot: usize,
    ) -> bool {
        self.submit(MoveRequest::swap(instigator, from, from_slot, to, to_slot))
    }

    /// Move up to `count` units of a stack into another slot.
    pub fn submit_amount_transfer(
        &mut self,
        instigator: EntityId,
        from: EntityId,
        from_slot: usize,
        to: EntityId,
        to_slot: usize,
        count: u32,
    ) -> bool {
        self.submit(MoveRequest::amount(
            instigator, from, from_slot, to, to_slot, count,
        ))
    }

    /// Spread a whole stack over `to_slots` of `to`, in order.
    pub fn submit_fan_out_transfer(
        &mut self,
        instigator: EntityId,
        from: EntityId,
        from_slot: usize,
        to: EntityId,
        to_slots: Vec<usize>,
    ) -> bool {
        self.submit(MoveRequest::fan_out(instigator, from, from_slot, to, to_slots))
    }

    // =========================================================================
    // Acknowledgment and reconciliation
    // =========================================================================

    /// The authority has processed `change_id`.
    ///
    /// Unknown ids are tolerated (duplicate ack, or a change confirmed after
    /// a reconnect); reconciliation runs either way.
    pub fn on_acknowledged(&mut self, change_id: ChangeId) {
        match self.ledger.remove(change_id) {
            Some(entry) => {
                self.stats.acknowledged += 1;
                debug!(%change_id, remaining = self.ledger.len(), "change acknowledged");
                self.destroy_speculative(entry.speculative());
            }
            None => {
                self.stats.unknown_acks += 1;
                warn!(%change_id, "acknowledgment for unknown change");
            }
        }
        self.reconcile_all();
    }

    /// Rebuild every pending prediction on top of confirmed contents.
    ///
    /// Entries replay in insertion order, each against the state left by
    /// the ones before it. Nothing is sent.
    pub fn reconcile_all(&mut self) {
        self.stats.reconciliations += 1;
        self.replay();
    }

    fn replay(&mut self) {
        let order = self.ledger.ids_in_order();

        for &change_id in &order {
            if let Some(entry) = self.ledger.get_mut(change_id) {
                let stale = entry.take_speculative();
                Self::destroy_objects(&mut self.inventory, &mut self.stats, &stale);
            }
        }

        self.inventory.rewind();

        for &change_id in &order {
            let Some(entry) = self.ledger.get_mut(change_id) else {
                continue;
            };
            let fresh = match entry.request().apply(&mut self.inventory) {
                Some(spawned) => spawned,
                None => {
                    self.stats.replay_failures += 1;
                    warn!(
                        %change_id,
                        kind = entry.request().kind(),
                        "pending change no longer applies"
                    );
                    SpeculativeSet::new()
                }
            };
            entry.replace_speculative(fresh);
        }

        trace!(
            pending = order.len(),
            speculative = self.ledger.speculative_objects().count(),
            "reconciled"
        );
    }

    /// Apply replicated authoritative contents of one container.
    ///
    /// Pending changes are replayed on top, so a sync that arrives ahead of
    /// its acknowledgment never hides predictions still in flight.
    pub fn apply_sync(&mut self, payload: &ContainerSyncPayload) -> Result<()> {
        self.inventory.apply_sync(payload.container, &payload.slots)?;
        self.replay();
        Ok(())
    }

    /// Dispatch one inbound message from the authority.
    pub fn handle_message(&mut self, message: Message) -> Result<()> {
        match message {
            Message::ChangeAck(ack) => {
                self.on_acknowledged(ack.change_id);
                Ok(())
            }
            Message::ContainerSync(sync) => self.apply_sync(&sync),
            other => Err(Error::Protocol {
                message: format!("unexpected {} from authority", other.kind()),
            }),
        }
    }

    fn destroy_speculative(&mut self, objects: &SpeculativeSet) {
        Self::destroy_objects(&mut self.inventory, &mut self.stats, objects);
    }

    fn destroy_objects(
        inventory: &mut PredictedInventory,
        stats: &mut PredictionStats,
        objects: &SpeculativeSet,
    ) {
        for &item in objects {
            // A later prediction may already have consumed it.
            if inventory.exists(item) && inventory.destroy(item) {
                stats.speculative_destroyed += 1;
            }
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Units held by `item`.
    pub fn stack_size(&self, item: EntityId) -> u32 {
        self.inventory.stack_size(item)
    }

    /// Item in `slot` of `container`.
    pub fn item_in_slot(&self, container: EntityId, slot: usize) -> Option<EntityId> {
        self.inventory.item_at(container, slot)
    }

    /// Number of slots of `container`.
    pub fn slot_count(&self, container: EntityId) -> usize {
        self.inventory.slot_count(container)
    }

    /// First slot of `container` holding `item`.
    pub fn find_slot_with_item(&self, container: EntityId, item: EntityId) -> Option<usize> {
        self.inventory.find_slot_with_item(container, item)
    }

    /// Whether two items could share a stack.
    pub fn can_stack_together(&self, a: EntityId, b: EntityId) -> bool {
        self.inventory.can_stack_together(a, b)
    }

    /// Resource kind of `item`.
    pub fn item_kind(&self, item: EntityId) -> Option<&ResourceKind> {
        self.inventory.item_kind(item)
    }

    /// Predicted contents of `container`.
    pub fn contents(&self, container: EntityId) -> Option<Vec<Option<ItemRecord>>> {
        self.inventory.view().contents(container)
    }

    // =========================================================================
    // Authority-only operations
    // =========================================================================

    /// Put `item` into the first free slot. Authority only.
    pub fn give_item(
        &mut self,
        inventory: EntityId,
        instigator: EntityId,
        item: EntityId,
    ) -> Result<bool> {
        Self::authority_only("give_item", inventory, instigator, item)
    }

    /// Put `item` into one of `slots`. Authority only.
    pub fn give_item_to_slots(
        &mut self,
        inventory: EntityId,
        instigator: EntityId,
        item: EntityId,
        _slots: &[usize],
    ) -> Result<bool> {
        Self::authority_only("give_item_to_slots", inventory, instigator, item)
    }

    /// Take up to `count` units of `item` out. Authority only.
    pub fn remove_item(
        &mut self,
        inventory: EntityId,
        instigator: EntityId,
        item: EntityId,
        _count: u32,
    ) -> Result<Option<EntityId>> {
        Self::authority_only("remove_item", inventory, instigator, item)
    }

    fn authority_only<T>(
        operation: &'static str,
        inventory: EntityId,
        instigator: EntityId,
        item: EntityId,
    ) -> Result<T> {
        error!(
            operation,
            %inventory,
            %instigator,
            %item,
            "authoritative operation invoked on client"
        );
        Err(Error::NotAuthoritative { operation })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn inventory(&self) -> &PredictedInventory {
        &self.inventory
    }

    pub fn ledger(&self) -> &PendingLedger {
        &self.ledger
    }

    /// Number of changes awaiting acknowledgment.
    pub fn pending_count(&self) -> usize {
        self.ledger.len()
    }

    /// The id the next accepted change will receive.
    pub fn next_change_id(&self) -> ChangeId {
        self.next_change
    }

    pub fn stats(&self) -> &PredictionStats {
        &self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

// =============================================================================
// Tests
// =============================================================================
