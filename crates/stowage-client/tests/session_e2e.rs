//! Session driver end to end over an in-memory link.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use stowage_client::{
    ClientSession, EngineConfig, MoveRequest, PredictionEngine, SessionCommand, SessionSnapshot,
    TransferSlotOverlay,
};
use stowage_core::{EntityId, InventoryConfig};
use stowage_test_utils::{FakeAuthority, mock_link_pair};

const CHARACTER: EntityId = EntityId(10);
const HOLDING: EntityId = EntityId(11);
const CHEST: EntityId = EntityId(12);

fn authority() -> FakeAuthority {
    let mut authority = FakeAuthority::new(InventoryConfig::new().with_max_stack_size(20));
    authority.create_container(CHARACTER, 4).unwrap();
    authority.create_container(HOLDING, 1).unwrap();
    authority.create_container(CHEST, 2).unwrap();
    authority.place(CHARACTER, 0, "wood", 12).unwrap();
    authority.place(CHARACTER, 3, "stone", 4).unwrap();
    authority
}

async fn snapshot(commands: &mpsc::Sender<SessionCommand>) -> SessionSnapshot {
    let (reply, rx) = oneshot::channel();
    commands.send(SessionCommand::Snapshot { reply }).await.unwrap();
    rx.await.unwrap()
}

async fn submit(commands: &mpsc::Sender<SessionCommand>, request: MoveRequest) -> bool {
    let (reply, rx) = oneshot::channel();
    commands
        .send(SessionCommand::Submit { request, reply })
        .await
        .unwrap();
    rx.await.unwrap()
}

/// Poll snapshots until nothing is pending.
async fn settle(commands: &mpsc::Sender<SessionCommand>) -> SessionSnapshot {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let snap = snapshot(commands).await;
            if snap.pending == 0 {
                return snap;
            }
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("session did not settle")
}

#[tokio::test]
async fn test_session_converges_with_authority() {
    let authority = authority();
    let (link, server) = mock_link_pair(64);
    let server = tokio::spawn(server.serve(authority));

    let config = EngineConfig::new().with_inventory(InventoryConfig::new().with_max_stack_size(20));
    let engine = PredictionEngine::new(config, link.outbound);
    let mut session = ClientSession::new(engine, TransferSlotOverlay::new(CHARACTER, HOLDING));

    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let inbound = link.inbound;
    let driver = tokio::spawn(async move {
        let result = session.run(cmd_rx, inbound).await;
        (session, result)
    });

    // Wait for the initial replication
    tokio::time::timeout(Duration::from_secs(5), async {
        while snapshot(&cmd_tx).await.contents.len() < 3 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("no initial replication");

    let accepted = [
        MoveRequest::amount(CHARACTER, CHARACTER, 0, CHARACTER, 1, 5),
        MoveRequest::fan_out(CHARACTER, CHARACTER, 1, CHEST, vec![0, 1]),
        MoveRequest::swap(CHARACTER, CHARACTER, 3, CHARACTER, 2),
    ];
    for request in accepted {
        assert!(submit(&cmd_tx, request).await);
    }
    let refused = MoveRequest::amount(CHARACTER, CHEST, 1, CHARACTER, 0, 1);
    assert!(!submit(&cmd_tx, refused).await);

    let snap = settle(&cmd_tx).await;
    assert_eq!(snap.stats.submitted, 3);
    assert_eq!(snap.stats.rejected, 1);

    cmd_tx.send(SessionCommand::Shutdown).await.unwrap();
    let (session, result) = driver.await.unwrap();
    assert!(result.is_ok());

    drop(session.into_engine());
    let authority = server.await.unwrap();
    assert_eq!(authority.applied(), 3);
    for (container, contents) in &snap.contents {
        assert_eq!(Some(contents.clone()), authority.inventory().contents(*container));
    }
}

#[tokio::test]
async fn test_held_stack_survives_save_boundary() {
    let mut authority = authority();
    authority.place(HOLDING, 0, "wood", 6).unwrap();
    let (link, server) = mock_link_pair(64);
    let server = tokio::spawn(server.serve(authority));

    let config = EngineConfig::new().with_inventory(InventoryConfig::new().with_max_stack_size(20));
    let engine = PredictionEngine::new(config, link.outbound);
    let mut session = ClientSession::new(engine, TransferSlotOverlay::new(CHARACTER, HOLDING));

    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let inbound = link.inbound;
    let driver = tokio::spawn(async move {
        let result = session.run(cmd_rx, inbound).await;
        (session, result)
    });

    tokio::time::timeout(Duration::from_secs(5), async {
        while snapshot(&cmd_tx).await.contents.len() < 3 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("no initial replication");

    let (reply, parked) = oneshot::channel();
    cmd_tx
        .send(SessionCommand::BeginSave {
            interaction_target: None,
            reply,
        })
        .await
        .unwrap();
    assert!(parked.await.unwrap());

    let during = settle(&cmd_tx).await;
    assert!(during.contents[&HOLDING][0].is_none());

    let (reply, restored) = oneshot::channel();
    cmd_tx.send(SessionCommand::EndSave { reply }).await.unwrap();
    assert_eq!(restored.await.unwrap(), 6);

    let after = settle(&cmd_tx).await;
    assert_eq!(after.contents[&HOLDING][0].as_ref().map(|r| r.count), Some(6));

    let character_units: u32 = after.contents[&CHARACTER]
        .iter()
        .flatten()
        .filter(|record| record.kind.as_str() == "wood")
        .map(|record| record.count)
        .sum();
    assert_eq!(character_units, 12);

    cmd_tx.send(SessionCommand::Shutdown).await.unwrap();
    let (session, result) = driver.await.unwrap();
    assert!(result.is_ok());
    drop(session);
    server.await.unwrap();
}
