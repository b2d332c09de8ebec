//! In-memory link between a client session and a fake authority.
//!
//! Requests travel over an unbounded channel, matching the non-blocking
//! sink the engine expects; replies travel over a bounded channel, as the
//! session's inbound receiver does.

use tokio::sync::mpsc;
use tracing::debug;

use stowage_core::protocol::Message;
use stowage_core::{Error, Result};

use crate::FakeAuthority;

/// Client half: hand `outbound` to the engine, `inbound` to the session.
#[derive(Debug)]
pub struct ClientLink {
    pub outbound: mpsc::UnboundedSender<Message>,
    pub inbound: mpsc::Receiver<Message>,
}

/// Authority half.
#[derive(Debug)]
pub struct AuthorityLink {
    requests: mpsc::UnboundedReceiver<Message>,
    replies: mpsc::Sender<Message>,
    delivered: u64,
}

impl AuthorityLink {
    /// Receive the next request.
    pub async fn recv(&mut self) -> Result<Message> {
        self.requests.recv().await.ok_or(Error::ConnectionClosed)
    }

    /// Send a reply to the client.
    pub async fn send(&mut self, message: Message) -> Result<()> {
        self.replies
            .send(message)
            .await
            .map_err(|_| Error::ConnectionClosed)?;
        self.delivered += 1;
        Ok(())
    }

    /// Replies delivered so far.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Answer requests with `authority` until either side hangs up.
    ///
    /// Starts by replicating every container. Hands the authority back so
    /// tests can inspect its final state.
    pub async fn serve(mut self, mut authority: FakeAuthority) -> FakeAuthority {
        for message in authority.snapshot_messages() {
            if self.send(message).await.is_err() {
                return authority;
            }
        }

        while let Ok(request) = self.recv().await {
            for reply in authority.process(request) {
                if self.send(reply).await.is_err() {
                    debug!("client hung up");
                    return authority;
                }
            }
        }
        debug!(delivered = self.delivered, "request channel closed");
        authority
    }
}

/// Create a connected pair of link halves.
pub fn mock_link_pair(capacity: usize) -> (ClientLink, AuthorityLink) {
    let (outbound, requests) = mpsc::unbounded_channel();
    let (replies, inbound) = mpsc::channel(capacity.max(1));
    (
        ClientLink { outbound, inbound },
        AuthorityLink {
            requests,
            replies,
            delivered: 0,
        },
    )
}
