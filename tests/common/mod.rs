//! Shared helpers for integration tests.

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use handtrack_socket::{Error, FrameSink, FrameSource, Result};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Logging
// ============================================================================

/// Installs a test subscriber once. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Scripted Transport
// ============================================================================

/// What the next receive produces.
#[derive(Debug, Clone)]
pub enum Step {
    /// Deliver these bytes.
    Data(Vec<u8>),
    /// Fail with a receive error.
    Fail,
    /// Report closure.
    Close,
}

/// Concurrency probe shared with a [`ScriptedSource`].
#[derive(Debug, Default)]
pub struct Probe {
    pub calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl Probe {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Frame source fed from a channel, optionally slow.
pub struct ScriptedSource {
    steps: mpsc::UnboundedReceiver<Step>,
    delay: Duration,
    probe: Arc<Probe>,
}

#[async_trait]
impl FrameSource for ScriptedSource {
    async fn receive(&mut self, buffer: &mut [u8]) -> Result<usize> {
        self.probe.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.probe.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.probe.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let result = match self.steps.recv().await {
            Some(Step::Data(payload)) => {
                let len = payload.len().min(buffer.len());
                buffer[..len].copy_from_slice(&payload[..len]);
                Ok(len)
            }
            Some(Step::Fail) => Err(Error::receive("scripted failure")),
            Some(Step::Close) | None => Err(Error::ConnectionClosed),
        };

        self.probe.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Frame sink that records sends and feeds a close into the source.
pub struct RecordingSink {
    steps: mpsc::UnboundedSender<Step>,
    pub log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl FrameSink for RecordingSink {
    async fn send_text(&mut self, text: &str) -> Result<()> {
        self.log.lock().push(format!("text:{text}"));
        Ok(())
    }

    async fn close(&mut self, code: u16, reason: &str) -> Result<()> {
        self.log.lock().push(format!("close:{code}:{reason}"));
        let _ = self.steps.send(Step::Close);
        Ok(())
    }
}

/// A scripted transport pair plus the handles a test drives it with.
pub struct Script {
    pub steps: mpsc::UnboundedSender<Step>,
    pub probe: Arc<Probe>,
    pub log: Arc<Mutex<Vec<String>>>,
}

impl Script {
    pub fn data(&self, payload: impl Into<Vec<u8>>) {
        self.steps.send(Step::Data(payload.into())).expect("source alive");
    }

    pub fn fail(&self) {
        self.steps.send(Step::Fail).expect("source alive");
    }
}

/// Builds a scripted source/sink pair.
pub fn scripted(delay: Duration) -> (ScriptedSource, RecordingSink, Script) {
    let (tx, rx) = mpsc::unbounded_channel();
    let probe = Arc::new(Probe::default());
    let log = Arc::new(Mutex::new(Vec::new()));

    let source = ScriptedSource {
        steps: rx,
        delay,
        probe: Arc::clone(&probe),
    };
    let sink = RecordingSink {
        steps: tx.clone(),
        log: Arc::clone(&log),
    };

    (source, sink, Script { steps: tx, probe, log })
}

// ============================================================================
// Test Servers
// ============================================================================

/// Accepts one WebSocket client, sends `frames`, then reads until the
/// client goes away.
pub async fn spawn_text_server(frames: Vec<&'static str>) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let url = format!("ws://127.0.0.1:{}", listener.local_addr().expect("addr").port());

    let task = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = tokio_tungstenite::accept_async(stream)
            .await
            .expect("upgrade");

        for frame in frames {
            ws.send(Message::text(frame.to_owned())).await.expect("send");
        }

        while let Some(Ok(_)) = ws.next().await {}
    });

    (url, task)
}
