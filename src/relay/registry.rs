//! Connected relay peers and their subscriptions.
//!
//! Thread-safe, shared by every peer task of one relay.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::protocol::{HandFrame, Subscription};

// ============================================================================
// PeerId
// ============================================================================

/// Identifier of one relay connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId(Uuid);

impl PeerId {
    /// Generates a new random identifier.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Registry
// ============================================================================

struct Peer {
    subscription: Option<Subscription>,
    outbound: mpsc::UnboundedSender<Message>,
}

/// Peers keyed by [`PeerId`].
pub struct Registry {
    peers: RwLock<FxHashMap<PeerId, Peer>>,
    /// Number of peers with a subscription.
    subscribed: watch::Sender<usize>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            peers: RwLock::new(FxHashMap::default()),
            subscribed: watch::Sender::new(0),
        }
    }
}

impl Registry {
    /// Adds a peer with no subscription.
    pub fn register(&self, id: PeerId, outbound: mpsc::UnboundedSender<Message>) {
        self.peers.write().insert(
            id,
            Peer {
                subscription: None,
                outbound,
            },
        );
        debug!(%id, "Peer registered");
    }

    /// Sets or replaces a peer's subscription.
    ///
    /// Returns `false` if the peer is unknown.
    pub fn subscribe(&self, id: PeerId, subscription: Subscription) -> bool {
        let updated = match self.peers.write().get_mut(&id) {
            Some(peer) => {
                peer.subscription = Some(subscription);
                true
            }
            None => false,
        };

        if updated {
            debug!(%id, %subscription, "Peer subscribed");
            self.publish_subscribed();
        }
        updated
    }

    /// Removes a peer.
    pub fn remove(&self, id: PeerId) {
        if self.peers.write().remove(&id).is_some() {
            debug!(%id, "Peer removed");
            self.publish_subscribed();
        }
    }

    /// Number of connected peers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    /// Returns `true` if no peer is connected.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.peers.read().is_empty()
    }

    /// Number of peers with a subscription.
    #[inline]
    #[must_use]
    pub fn subscribed_count(&self) -> usize {
        *self.subscribed.borrow()
    }

    /// Watches the number of subscribed peers.
    #[must_use]
    pub fn watch_subscribed(&self) -> watch::Receiver<usize> {
        self.subscribed.subscribe()
    }

    /// Sends `frame` to every subscribed peer except `from`, filtered per
    /// subscription.
    ///
    /// Returns the number of peers the frame was queued for.
    pub fn broadcast(&self, from: PeerId, frame: &HandFrame) -> usize {
        let peers = self.peers.read();
        let mut delivered = 0;

        for (id, peer) in peers.iter() {
            if *id == from {
                continue;
            }
            let Some(subscription) = peer.subscription else {
                continue;
            };

            let json = match frame.filter(&subscription).to_json() {
                Ok(json) => json,
                Err(e) => {
                    warn!(%id, error = %e, "Failed to serialize filtered frame");
                    continue;
                }
            };

            if peer.outbound.send(Message::text(json)).is_ok() {
                delivered += 1;
            }
        }

        delivered
    }

    fn publish_subscribed(&self) {
        let count = self
            .peers
            .read()
            .values()
            .filter(|peer| peer.subscription.is_some())
            .count();
        self.subscribed.send_replace(count);
    }
}

// ============================================================================
// Tests
// ============================================================================
