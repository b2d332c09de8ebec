//! Client session driver.
//!
//! A single task owns the prediction engine and the transfer-slot overlay.
//! UI commands and inbound authority messages are multiplexed with
//! `select!`, so every ledger mutation happens on that one task and no
//! locking is needed.

use std::collections::BTreeMap;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use stowage_core::protocol::Message;
use stowage_core::{EntityId, Error, ItemRecord, PredictionStats, Result};

use crate::overlay::TransferSlotOverlay;
use crate::prediction::{MoveRequest, PredictionEngine, RequestSink};

/// Commands from the UI layer.
#[derive(Debug)]
pub enum SessionCommand {
    /// Submit a change; replies with the result of `submit`.
    Submit {
        request: MoveRequest,
        reply: oneshot::Sender<bool>,
    },
    /// A save boundary begins: park the held stack.
    BeginSave {
        interaction_target: Option<EntityId>,
        reply: oneshot::Sender<bool>,
    },
    /// The save boundary ended: pull the held stack back.
    EndSave { reply: oneshot::Sender<u32> },
    /// Report the current predicted state.
    Snapshot { reply: oneshot::Sender<SessionSnapshot> },
    /// Stop the driver.
    Shutdown,
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// Changes awaiting acknowledgment.
    pub pending: usize,
    pub stats: PredictionStats,
    /// Predicted contents of every known container.
    pub contents: BTreeMap<EntityId, Vec<Option<ItemRecord>>>,
}

/// Owns one engine and drives it from channels.
#[derive(Debug)]
pub struct ClientSession<S> {
    engine: PredictionEngine<S>,
    overlay: TransferSlotOverlay,
}

impl<S: RequestSink> ClientSession<S> {
    pub fn new(engine: PredictionEngine<S>, overlay: TransferSlotOverlay) -> Self {
        Self { engine, overlay }
    }

    pub fn engine(&self) -> &PredictionEngine<S> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut PredictionEngine<S> {
        &mut self.engine
    }

    pub fn overlay(&self) -> &TransferSlotOverlay {
        &self.overlay
    }

    pub fn into_engine(self) -> PredictionEngine<S> {
        self.engine
    }

    /// Run until shutdown.
    ///
    /// Returns `Ok` when the command channel closes or `Shutdown` arrives,
    /// and `Error::ConnectionClosed` if the inbound link goes away first.
    pub async fn run(
        &mut self,
        mut commands: mpsc::Receiver<SessionCommand>,
        mut inbound: mpsc::Receiver<Message>,
    ) -> Result<()> {
        info!(character = %self.overlay.character(), "session started");

        loop {
            tokio::select! {
                biased;

                // Authority messages first so acks settle before new input
                message = inbound.recv() => {
                    let Some(message) = message else {
                        info!("inbound link closed");
                        return Err(Error::ConnectionClosed);
                    };
                    self.dispatch(message);
                }

                command = commands.recv() => {
                    match command {
                        Some(SessionCommand::Shutdown) | None => {
                            info!(pending = self.engine.pending_count(), "session shutting down");
                            return Ok(());
                        }
                        Some(command) => self.execute(command),
                    }
                }
            }
        }
    }

    /// Handle one inbound message.
    pub fn dispatch(&mut self, message: Message) {
        let kind = message.kind();
        if let Err(e) = self.engine.handle_message(message) {
            warn!(kind, error = %e, "dropping inbound message");
        }
    }

    fn execute(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Submit { request, reply } => {
                let accepted = self.engine.submit(request);
                let _ = reply.send(accepted);
            }
            SessionCommand::BeginSave {
                interaction_target,
                reply,
            } => {
                let parked = self.overlay.extract(&mut self.engine, interaction_target);
                debug!(parked, "save boundary entered");
                let _ = reply.send(parked);
            }
            SessionCommand::EndSave { reply } => {
                let restored = self.overlay.restore(&mut self.engine);
                debug!(restored, "save boundary left");
                let _ = reply.send(restored);
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            SessionCommand::Shutdown => {}
        }
    }

    /// Capture the current predicted state.
    pub fn snapshot(&self) -> SessionSnapshot {
        let view = self.engine.inventory().view();
        let contents = view
            .container_ids()
            .filter_map(|container| Some((container, view.contents(container)?)))
            .collect();
        SessionSnapshot {
            pending: self.engine.pending_count(),
            stats: self.engine.stats().clone(),
            contents,
        }
    }

    /// Units currently in `slot` of `container` in the predicted view.
    pub fn units_at(&self, container: EntityId, slot: usize) -> u32 {
        self.engine
            .item_in_slot(container, slot)
            .map_or(0, |item| self.engine.stack_size(item))
    }
}
