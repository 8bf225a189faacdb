//! Relay WebSocket server.
//!
//! Binds the port the tracker and its clients meet on and fans hand frames
//! out to subscribed peers.
//!
//! # Peer Flow
//!
//! 1. Peer connects and is registered without a subscription
//! 2. Peer sends `:<flags>` to subscribe. The handshake is accepted on any
//!    message, not only the first: a later `:<flags>` replaces the current
//!    subscription and a malformed one is logged and ignored
//! 3. `ping` text is answered with a pong frame
//! 4. Any other text is parsed as a hand frame and broadcast to every other
//!    subscribed peer, filtered per subscription
//! 5. Peer is removed when its stream ends

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::protocol::{HandFrame, Subscription};

use super::registry::{PeerId, Registry};

// ============================================================================
// Constants
// ============================================================================

/// Port the hand tracking relay listens on.
pub const DEFAULT_RELAY_PORT: u16 = 8765;

/// Keepalive text answered with a pong frame.
const PING_TEXT: &str = "ping";

// ============================================================================
// RelayServer
// ============================================================================

/// A relay that is bound but not yet accepting.
///
/// # Example
///
/// ```ignore
/// use std::net::{IpAddr, Ipv4Addr};
/// use handtrack_socket::relay::RelayServer;
///
/// let server = RelayServer::bind(IpAddr::V4(Ipv4Addr::LOCALHOST), 0).await?;
/// let handle = server.spawn();
/// println!("relay at {}", handle.ws_url());
/// ```
pub struct RelayServer {
    /// TCP listener for incoming connections.
    listener: TcpListener,
    /// Port the server is bound to.
    port: u16,
}

impl RelayServer {
    /// Binds the relay to the specified address and port.
    ///
    /// Use port 0 to let the OS assign a random available port.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if binding fails.
    pub async fn bind(ip: IpAddr, port: u16) -> Result<Self> {
        let listener = TcpListener::bind(SocketAddr::new(ip, port)).await?;
        let actual_port = listener.local_addr()?.port();

        debug!(port = actual_port, "Relay bound");

        Ok(Self {
            listener,
            port: actual_port,
        })
    }

    /// Binds to `localhost:8765`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if binding fails.
    pub async fn bind_default() -> Result<Self> {
        Self::bind(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_RELAY_PORT).await
    }

    /// Returns the port the server is bound to.
    #[inline]
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the WebSocket URL for this server.
    ///
    /// Format: `ws://127.0.0.1:{port}`
    #[inline]
    #[must_use]
    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}", self.port)
    }

    /// Starts the accept loop on the current runtime.
    #[must_use]
    pub fn spawn(self) -> RelayHandle {
        let registry = Arc::new(Registry::default());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let port = self.port;

        let task = tokio::spawn(accept_loop(
            self.listener,
            Arc::clone(&registry),
            shutdown_rx,
        ));

        info!(port, "Relay started");

        RelayHandle {
            port,
            registry,
            shutdown_tx: Some(shutdown_tx),
            task,
        }
    }
}

// ============================================================================
// RelayHandle
// ============================================================================

/// Handle to a running relay.
///
/// Dropping the handle also stops accepting new peers.
pub struct RelayHandle {
    port: u16,
    registry: Arc<Registry>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl RelayHandle {
    /// Returns the port the relay is bound to.
    #[inline]
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the WebSocket URL of the relay.
    #[inline]
    #[must_use]
    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}", self.port)
    }

    /// Number of connected peers.
    #[inline]
    #[must_use]
    pub fn peer_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of peers with a subscription.
    #[inline]
    #[must_use]
    pub fn subscribed_count(&self) -> usize {
        self.registry.subscribed_count()
    }

    /// Waits until at least `count` peers are subscribed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionTimeout`] if that does not happen within
    /// `wait`.
    pub async fn wait_for_subscribers(&self, count: usize, wait: Duration) -> Result<()> {
        let mut rx = self.registry.watch_subscribed();

        match timeout(wait, rx.wait_for(|n| *n >= count)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => Err(Error::connection_timeout_after(wait)),
        }
    }

    /// Stops accepting, drops every peer and waits for the relay to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            warn!(error = %e, "Relay task failed");
        }
        info!(port = self.port, "Relay stopped");
    }
}

// ============================================================================
// Accept Loop
// ============================================================================

async fn accept_loop(
    listener: TcpListener,
    registry: Arc<Registry>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut peers = JoinSet::new();

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, addr)) => {
                        debug!(?addr, "TCP connection accepted");
                        let registry = Arc::clone(&registry);
                        peers.spawn(async move {
                            if let Err(e) = serve_peer(stream, addr, registry).await {
                                debug!(?addr, error = %e, "Peer ended with error");
                            }
                        });
                    }
                    Err(e) => warn!(error = %e, "Accept failed"),
                }
            }

            // Reap finished peers so the set does not grow
            Some(_) = peers.join_next(), if !peers.is_empty() => {}

            _ = &mut shutdown_rx => {
                debug!("Relay shutdown requested");
                break;
            }
        }
    }

    peers.shutdown().await;
}

// ============================================================================
// Peer
// ============================================================================

async fn serve_peer(stream: TcpStream, addr: SocketAddr, registry: Arc<Registry>) -> Result<()> {
    let ws_stream = tokio_tungstenite::accept_async(stream)
        .await
        .map_err(|e| Error::connect(addr.to_string(), format!("WebSocket upgrade failed: {e}")))?;

    let (mut write, mut read) = ws_stream.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    let id = PeerId::generate();
    registry.register(id, outbound_tx.clone());

    let writer = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if let Err(e) = write.send(message).await {
                debug!(error = %e, "Peer write failed");
                break;
            }
        }
    });

    while let Some(message) = read.next().await {
        match message {
            Ok(Message::Text(text)) => {
                handle_text(id, text.as_str(), &registry, &outbound_tx);
            }

            // Keep reading so tungstenite completes the close handshake
            Ok(Message::Close(_)) => debug!(%id, "Peer sent close"),

            Ok(_) => {}

            Err(e) => {
                debug!(%id, error = %e, "Peer read failed");
                break;
            }
        }
    }

    registry.remove(id);
    drop(outbound_tx);
    let _ = writer.await;

    debug!(%id, ?addr, "Peer disconnected");
    Ok(())
}

fn handle_text(
    id: PeerId,
    text: &str,
    registry: &Registry,
    outbound: &mpsc::UnboundedSender<Message>,
) {
    match Subscription::from_handshake(text) {
        Ok(Some(subscription)) => {
            registry.subscribe(id, subscription);
            return;
        }
        Ok(None) => {}
        Err(e) => {
            warn!(%id, error = %e, "Rejected handshake");
            return;
        }
    }

    if text == PING_TEXT {
        let _ = outbound.send(Message::Pong(Vec::new().into()));
        trace!(%id, "Sent pong");
        return;
    }

    match HandFrame::parse(text) {
        Ok(frame) => {
            let delivered = registry.broadcast(id, &frame);
            trace!(%id, delivered, "Frame relayed");
        }
        Err(e) => warn!(%id, error = %e, "Skipped unparseable frame"),
    }
}

// ============================================================================
// Tests
// ============================================================================
