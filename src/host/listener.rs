//! Socket listener component.
//!
//! Wires a [`NonBlockingSocketClient`] into the host lifecycle: connect on
//! `init`, poll on every tick, close on `shutdown`. Each new message is
//! handed to a callback once, on the tick that first sees it.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::client::{InboundMessage, NonBlockingSocketClient, PollOutcome};
use crate::error::Result;

use super::lifecycle::Lifecycle;

// ============================================================================
// Types
// ============================================================================

/// Callback invoked with each new message.
pub type MessageHandler = Box<dyn FnMut(&InboundMessage) + Send>;

// ============================================================================
// SocketListener
// ============================================================================

/// Host component that keeps the client polled.
pub struct SocketListener {
    client: Arc<NonBlockingSocketClient>,
    handler: MessageHandler,
    last_sequence: u64,
}

impl SocketListener {
    /// Creates a listener that logs each message at debug level.
    #[must_use]
    pub fn new(client: Arc<NonBlockingSocketClient>) -> Self {
        Self::with_handler(
            client,
            Box::new(|message: &InboundMessage| {
                debug!(sequence = message.sequence, text = %message.text, "Message");
            }),
        )
    }

    /// Creates a listener that calls `handler` for each message.
    #[must_use]
    pub fn with_handler(client: Arc<NonBlockingSocketClient>, handler: MessageHandler) -> Self {
        Self {
            client,
            handler,
            last_sequence: 0,
        }
    }

    /// Returns the client.
    #[inline]
    #[must_use]
    pub fn client(&self) -> &Arc<NonBlockingSocketClient> {
        &self.client
    }

    /// Polls the client and dispatches a message not seen before.
    ///
    /// Returns what the poll did.
    pub fn tick(&mut self) -> PollOutcome {
        let outcome = self.client.poll_receive();

        if let Some(message) = self.client.latest()
            && message.sequence > self.last_sequence
        {
            self.last_sequence = message.sequence;
            (self.handler)(&message);
        }

        outcome
    }
}

#[async_trait]
impl Lifecycle for SocketListener {
    async fn init(&mut self) -> Result<()> {
        self.client.connect().await
    }

    fn on_tick(&mut self) {
        self.tick();
    }

    async fn shutdown(&mut self) {
        self.client.shutdown().await;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use parking_lot::Mutex;
    use tokio::sync::mpsc;

    use crate::client::{ClientOptions, ConnectionState};
    use crate::error::Error;
    use crate::transport::frame::copy_truncated;
    use crate::transport::{FrameSink, FrameSource};

    struct QueueSource(mpsc::UnboundedReceiver<&'static str>);

    #[async_trait]
    impl FrameSource for QueueSource {
        async fn receive(&mut self, buffer: &mut [u8]) -> Result<usize> {
            match self.0.recv().await {
                Some(text) => Ok(copy_truncated(text.as_bytes(), buffer)),
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

    #[tokio::test]
    async fn test_each_message_dispatched_once() {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = Arc::new(
            NonBlockingSocketClient::from_parts(ClientOptions::new(), QueueSource(rx), NullSink)
                .unwrap(),
        );

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut listener = SocketListener::with_handler(
            Arc::clone(&client),
            Box::new(move |message: &InboundMessage| {
                sink.lock().push(message.as_str().to_string());
            }),
        );

        tx.send("one").unwrap();
        assert_eq!(listener.tick(), PollOutcome::Started);
        client.wait_idle().await;

        // Dispatches "one"; no new data so the started receive stays pending
        listener.tick();
        listener.tick();
        assert_eq!(*seen.lock(), vec!["one".to_string()]);

        tx.send("two").unwrap();
        client.wait_idle().await;
        listener.tick();
        assert_eq!(*seen.lock(), vec!["one".to_string(), "two".to_string()]);
    }

    #[tokio::test]
    async fn test_shutdown_closes_client() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let client = Arc::new(
            NonBlockingSocketClient::from_parts(ClientOptions::new(), QueueSource(rx), NullSink)
                .unwrap(),
        );
        let mut listener = SocketListener::new(Arc::clone(&client));

        Lifecycle::shutdown(&mut listener).await;
        assert_eq!(client.state(), ConnectionState::Closed);
    }
}
