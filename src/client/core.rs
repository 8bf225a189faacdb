//! Non-blocking WebSocket client.
//!
//! The host calls [`poll_receive`](NonBlockingSocketClient::poll_receive)
//! once per tick. A tick either starts exactly one receive on the client's
//! runtime or, if a receive is still outstanding, returns at once. Nothing
//! on the tick path waits on the network.
//!
//! # Lifecycle
//!
//! ```text
//! Disconnected ──connect()──► Connecting ──► Connected ──close()──► Closing ──► Closed
//!       │                          │              │                               ▲
//!       └────────close()───────────┴──────────────┴──── peer close ───────────────┘
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{Mutex as AsyncMutex, watch};
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::transport::{self, FrameSink, FrameSource, NORMAL_CLOSURE};

use super::builder::ClientBuilder;
use super::guard::{ReceiveGuard, ReceiveLease};
use super::options::ClientOptions;
use super::stats::{PollOutcome, PollSnapshot, PollStats};

// ============================================================================
// ConnectionState
// ============================================================================

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Created, `connect` not called yet.
    Disconnected,
    /// `connect` in progress.
    Connecting,
    /// Ready to receive.
    Connected,
    /// Close frame being sent.
    Closing,
    /// Closed by us or by the peer. Terminal.
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Closing => "closing",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

// ============================================================================
// InboundMessage
// ============================================================================

/// Latest decoded text frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Decoded payload.
    pub text: Arc<str>,
    /// 1 for the first published message, incremented per message.
    pub sequence: u64,
}

impl InboundMessage {
    /// Returns the payload.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

// ============================================================================
// Shared
// ============================================================================

/// State shared between the client and its receive tasks.
struct Shared {
    state: Mutex<ConnectionState>,
    inbound: watch::Sender<Option<InboundMessage>>,
    stats: PollStats,
    sequence: AtomicU64,
}

impl Shared {
    fn new(state: ConnectionState) -> Self {
        let (inbound, _) = watch::channel(None);
        Self {
            state: Mutex::new(state),
            inbound,
            stats: PollStats::default(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Moves to `to` if the current state is `from`.
    fn transition(&self, from: ConnectionState, to: ConnectionState) -> bool {
        let mut state = self.state.lock();
        if *state == from {
            *state = to;
            true
        } else {
            false
        }
    }

    /// Overwrites the latest message.
    fn publish(&self, text: &str) {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        self.inbound.send_replace(Some(InboundMessage {
            text: Arc::from(text),
            sequence,
        }));
        trace!(sequence, len = text.len(), "Inbound message published");
    }
}

// ============================================================================
// NonBlockingSocketClient
// ============================================================================

/// Single-connection WebSocket client polled once per host tick.
///
/// # Thread Safety
///
/// `NonBlockingSocketClient` is `Send + Sync`. [`poll_receive`](Self::poll_receive)
/// is synchronous and may be called from a thread outside the tokio runtime;
/// receives run on the runtime that performed `connect`.
pub struct NonBlockingSocketClient {
    /// Validated options.
    options: ClientOptions,
    /// State shared with receive tasks.
    shared: Arc<Shared>,
    /// Owns the read half and the receive buffer.
    guard: ReceiveGuard,
    /// Write half, taken by `close`.
    sink: AsyncMutex<Option<Box<dyn FrameSink>>>,
    /// Runtime receives are spawned on.
    runtime: Mutex<Option<Handle>>,
}

// ============================================================================
// NonBlockingSocketClient - Constructors
// ============================================================================

impl NonBlockingSocketClient {
    /// Creates a builder with default options.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a disconnected client.
    ///
    /// `options` are checked by [`connect`](Self::connect).
    #[must_use]
    pub fn new(options: ClientOptions) -> Self {
        Self {
            options,
            shared: Arc::new(Shared::new(ConnectionState::Disconnected)),
            guard: ReceiveGuard::empty(),
            sink: AsyncMutex::new(None),
            runtime: Mutex::new(None),
        }
    }

    /// Creates a connected client over an existing transport.
    ///
    /// Receives are spawned on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if called outside a tokio runtime
    /// - [`Error::Config`] if `options` fail [`ClientOptions::validate`]
    pub fn from_parts(
        options: ClientOptions,
        source: impl FrameSource + 'static,
        sink: impl FrameSink + 'static,
    ) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|_| Error::config("from_parts must be called within a tokio runtime"))?;

        options.validate()?;

        let guard = ReceiveGuard::with_source(Box::new(source), options.buffer_size);

        Ok(Self {
            options,
            shared: Arc::new(Shared::new(ConnectionState::Connected)),
            guard,
            sink: AsyncMutex::new(Some(Box::new(sink))),
            runtime: Mutex::new(Some(runtime)),
        })
    }
}

// ============================================================================
// NonBlockingSocketClient - Lifecycle
// ============================================================================

impl NonBlockingSocketClient {
    /// Connects to the configured endpoint.
    ///
    /// Sends the subscription handshake if one is configured. Failures are
    /// returned as-is and never retried.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the client is not [`ConnectionState::Disconnected`]
    /// - [`Error::Config`] if the options fail [`ClientOptions::validate`]
    /// - [`Error::Connect`] / [`Error::ConnectionTimeout`] if the connection fails
    /// - [`Error::ConnectionClosed`] if `close` ran while connecting
    pub async fn connect(&self) -> Result<()> {
        self.options.validate()?;

        if !self
            .shared
            .transition(ConnectionState::Disconnected, ConnectionState::Connecting)
        {
            return Err(Error::config(format!(
                "connect called on a {} client",
                self.state()
            )));
        }

        let result = self.establish().await;
        if result.is_err() {
            self.shared
                .transition(ConnectionState::Connecting, ConnectionState::Disconnected);
        }
        result
    }

    async fn establish(&self) -> Result<()> {
        let endpoint = &self.options.endpoint;
        let (source, mut sink) = transport::connect(endpoint, self.options.connect_timeout).await?;

        if let Some(subscription) = self.options.subscription {
            sink.send_text(&subscription.handshake())
                .await
                .map_err(|e| {
                    Error::connect(endpoint.as_str(), format!("subscription handshake failed: {e}"))
                })?;
            debug!(%subscription, "Subscription handshake sent");
        }

        self.guard
            .install(Box::new(source), self.options.buffer_size)
            .await;
        *self.sink.lock().await = Some(Box::new(sink));
        *self.runtime.lock() = Some(Handle::current());

        if !self
            .shared
            .transition(ConnectionState::Connecting, ConnectionState::Connected)
        {
            debug!("Closed while connecting");
            if let Some(mut sink) = self.sink.lock().await.take() {
                let _ = sink.close(NORMAL_CLOSURE, &self.options.close_reason).await;
            }
            return Err(Error::ConnectionClosed);
        }

        info!(%endpoint, buffer_size = self.options.buffer_size, "Client connected");
        Ok(())
    }

    /// Attempts one receive for this tick.
    ///
    /// Never blocks. If the previous receive is still outstanding the tick
    /// is skipped, not queued. A started receive publishes its message to
    /// [`latest`](Self::latest) and releases the guard when it finishes, on
    /// success and failure alike.
    pub fn poll_receive(&self) -> PollOutcome {
        match self.state() {
            ConnectionState::Disconnected | ConnectionState::Connecting => {
                return PollOutcome::NotConnected;
            }
            ConnectionState::Closing | ConnectionState::Closed => return PollOutcome::Closed,
            ConnectionState::Connected => {}
        }

        let Some(lease) = self.guard.try_acquire() else {
            self.shared.stats.record_skipped();
            trace!("Receive in flight, tick skipped");
            return PollOutcome::Skipped;
        };

        let Some(runtime) = self.runtime.lock().clone() else {
            return PollOutcome::NotConnected;
        };

        self.shared.stats.record_started();
        runtime.spawn(receive_once(Arc::clone(&self.shared), lease));

        PollOutcome::Started
    }

    /// Sends a normal-closure close frame with `reason`.
    ///
    /// Does nothing if already closing or closed. Close failures are logged.
    /// An outstanding receive observes the closure and releases the guard.
    pub async fn close(&self, reason: &str) {
        let previous = {
            let mut state = self.shared.state.lock();
            let previous = *state;
            *state = match previous {
                ConnectionState::Connected => ConnectionState::Closing,
                ConnectionState::Disconnected | ConnectionState::Connecting => {
                    ConnectionState::Closed
                }
                other => other,
            };
            previous
        };

        if previous != ConnectionState::Connected {
            debug!(state = %previous, "Close without open connection");
            return;
        }

        let sink = self.sink.lock().await.take();
        if let Some(mut sink) = sink
            && let Err(e) = sink.close(NORMAL_CLOSURE, reason).await
        {
            warn!(error = %e, "Close handshake failed");
        }

        *self.shared.state.lock() = ConnectionState::Closed;
        info!(endpoint = %self.options.endpoint, reason, "Client closed");
    }

    /// Closes with the configured close reason.
    pub async fn shutdown(&self) {
        self.close(&self.options.close_reason).await;
    }

    /// Waits until no receive is outstanding.
    pub async fn wait_idle(&self) {
        self.guard.released().await;
    }
}

// ============================================================================
// NonBlockingSocketClient - Accessors
// ============================================================================

impl NonBlockingSocketClient {
    /// Returns the latest message, if any was received.
    #[inline]
    #[must_use]
    pub fn latest(&self) -> Option<InboundMessage> {
        self.shared.inbound.borrow().clone()
    }

    /// Subscribes to changes of the latest message.
    ///
    /// Only the newest value is kept; a slow reader skips intermediate ones.
    #[inline]
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<InboundMessage>> {
        self.shared.inbound.subscribe()
    }

    /// Returns the connection state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.shared.state.lock()
    }

    /// Returns a snapshot of the poll counters.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> PollSnapshot {
        self.shared.stats.snapshot()
    }

    /// Returns `true` while a receive holds the guard.
    ///
    /// When this is `false` the next [`poll_receive`](Self::poll_receive)
    /// is not skipped.
    #[inline]
    #[must_use]
    pub fn is_receive_in_flight(&self) -> bool {
        self.guard.is_held()
    }

    /// Returns the endpoint.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.options.endpoint
    }

    /// Returns the options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }
}

impl fmt::Debug for NonBlockingSocketClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonBlockingSocketClient")
            .field("endpoint", &self.options.endpoint.as_str())
            .field("state", &self.state())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Receive Task
// ============================================================================

/// Performs one receive while holding `lease`, then releases it.
async fn receive_once(shared: Arc<Shared>, mut lease: ReceiveLease) {
    match lease.receive().await {
        Ok(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => {
                shared.publish(text);
                shared.stats.record_completed();
            }
            Err(e) => {
                let err = Error::decode(bytes.len(), e);
                warn!(error = %err, "Dropped undecodable message");
                shared.stats.record_failed();
            }
        },

        Err(Error::ConnectionClosed) => {
            if shared.transition(ConnectionState::Connected, ConnectionState::Closed) {
                info!("Connection closed by peer");
            } else {
                debug!("Receive observed local close");
            }
            shared.stats.record_failed();
        }

        Err(e) => {
            warn!(error = %e, "Receive failed");
            shared.stats.record_failed();
        }
    }

    drop(lease);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use crate::transport::frame::copy_truncated;

    /// Yields queued payloads, reports closure when the queue is dropped.
    struct QueueSource(mpsc::UnboundedReceiver<Vec<u8>>);

    #[async_trait]
    impl FrameSource for QueueSource {
        async fn receive(&mut self, buffer: &mut [u8]) -> Result<usize> {
            match self.0.recv().await {
                Some(payload) => Ok(copy_truncated(&payload, buffer)),
                None => Err(Error::ConnectionClosed),
            }
        }
    }

    struct NullSink;

    #[async_trait]
    impl FrameSink for NullSink {
        async fn send_text(&mut self, _text: &str) -> Result<()> {
            Ok(())
        }

        async fn close(&mut self, _code: u16, _reason: &str) -> Result<()> {
            Ok(())
        }
    }

    fn queued_client() -> (NonBlockingSocketClient, mpsc::UnboundedSender<Vec<u8>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let client =
            NonBlockingSocketClient::from_parts(ClientOptions::new(), QueueSource(rx), NullSink)
                .expect("inside runtime");
        (client, tx)
    }

    #[test]
    fn test_from_parts_outside_runtime_fails() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let result =
            NonBlockingSocketClient::from_parts(ClientOptions::new(), QueueSource(rx), NullSink);
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[tokio::test]
    async fn test_new_client_is_disconnected() {
        let client = NonBlockingSocketClient::new(ClientOptions::new());
        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert_eq!(client.poll_receive(), PollOutcome::NotConnected);
        assert!(client.latest().is_none());
    }

    #[tokio::test]
    async fn test_poll_publishes_message() {
        let (client, tx) = queued_client();
        tx.send(b"{\"x\":1}".to_vec()).unwrap();

        assert_eq!(client.poll_receive(), PollOutcome::Started);
        client.wait_idle().await;

        let latest = client.latest().unwrap();
        assert_eq!(latest.as_str(), "{\"x\":1}");
        assert_eq!(latest.sequence, 1);
    }

    #[tokio::test]
    async fn test_connect_rejects_zero_buffer() {
        let client = NonBlockingSocketClient::new(ClientOptions::new().with_buffer_size(0));

        let err = client.connect().await.unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert_eq!(client.poll_receive(), PollOutcome::NotConnected);
    }

    #[tokio::test]
    async fn test_connect_rejects_zero_timeout() {
        let options = ClientOptions::new().with_connect_timeout(std::time::Duration::ZERO);
        let client = NonBlockingSocketClient::new(options);

        let err = client.connect().await.unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert_eq!(client.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_from_parts_rejects_zero_buffer() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let options = ClientOptions::new().with_buffer_size(0);
        let result = NonBlockingSocketClient::from_parts(options, QueueSource(rx), NullSink);
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[tokio::test]
    async fn test_in_flight_follows_guard() {
        let (client, tx) = queued_client();
        assert!(!client.is_receive_in_flight());

        assert_eq!(client.poll_receive(), PollOutcome::Started);
        assert!(client.is_receive_in_flight());

        tx.send(b"done".to_vec()).unwrap();
        client.wait_idle().await;
        assert!(!client.is_receive_in_flight());
        assert_eq!(client.poll_receive(), PollOutcome::Started);
    }

    #[tokio::test]
    async fn test_close_before_connect_is_terminal() {
        let client = NonBlockingSocketClient::new(ClientOptions::new());
        client.close("bye").await;
        assert_eq!(client.state(), ConnectionState::Closed);
        assert!(client.connect().await.is_err());
    }

    #[tokio::test]
    async fn test_peer_close_moves_to_closed() {
        let (client, tx) = queued_client();
        drop(tx);

        assert_eq!(client.poll_receive(), PollOutcome::Started);
        client.wait_idle().await;

        assert_eq!(client.state(), ConnectionState::Closed);
        assert_eq!(client.poll_receive(), PollOutcome::Closed);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ConnectionState::Connected.to_string(), "connected");
        assert_eq!(ConnectionState::Closing.to_string(), "closing");
    }
}
