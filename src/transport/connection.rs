//! Outbound WebSocket connection.
//!
//! Connects to the endpoint with `tokio-tungstenite` and splits the stream
//! into a [`WsSource`] (read half) and a [`WsSink`] (write half).

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace};
use url::Url;

use crate::error::{Error, Result};

use super::frame::{FrameSink, FrameSource, copy_truncated};

// ============================================================================
// Types
// ============================================================================

/// Client-side WebSocket stream.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ============================================================================
// connect
// ============================================================================

/// Connects to `endpoint` and returns the read and write halves.
///
/// # Errors
///
/// - [`Error::ConnectionTimeout`] if the handshake exceeds `connect_timeout`
/// - [`Error::Connect`] if the TCP connect or WebSocket upgrade fails
pub async fn connect(endpoint: &Url, connect_timeout: Duration) -> Result<(WsSource, WsSink)> {
    debug!(%endpoint, "Connecting");

    let (ws_stream, response) = timeout(
        connect_timeout,
        tokio_tungstenite::connect_async(endpoint.as_str()),
    )
    .await
    .map_err(|_| Error::connection_timeout_after(connect_timeout))?
    .map_err(|e| Error::connect(endpoint.as_str(), e.to_string()))?;

    info!(%endpoint, status = %response.status(), "WebSocket connection established");

    let (write, read) = ws_stream.split();
    Ok((WsSource { read }, WsSink { write }))
}

// ============================================================================
// WsSource
// ============================================================================

/// Read half of a tungstenite connection.
pub struct WsSource {
    read: SplitStream<WsStream>,
}

#[async_trait]
impl FrameSource for WsSource {
    async fn receive(&mut self, buffer: &mut [u8]) -> Result<usize> {
        loop {
            match self.read.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Self::fill(text.as_bytes(), buffer));
                }

                Some(Ok(Message::Binary(data))) => {
                    return Ok(Self::fill(&data, buffer));
                }

                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "WebSocket closed by remote");
                    return Err(Error::ConnectionClosed);
                }

                Some(Err(e)) => return Err(Error::WebSocket(e)),

                None => {
                    debug!("WebSocket stream ended");
                    return Err(Error::ConnectionClosed);
                }

                // Ping, Pong and raw frames are not data
                Some(Ok(_)) => {}
            }
        }
    }
}

impl WsSource {
    fn fill(payload: &[u8], buffer: &mut [u8]) -> usize {
        let len = copy_truncated(payload, buffer);
        if len < payload.len() {
            trace!(
                payload = payload.len(),
                kept = len,
                "Frame truncated to receive buffer"
            );
        }
        len
    }
}

// ============================================================================
// WsSink
// ============================================================================

/// Write half of a tungstenite connection.
pub struct WsSink {
    write: SplitSink<WsStream, Message>,
}

#[async_trait]
impl FrameSink for WsSink {
    async fn send_text(&mut self, text: &str) -> Result<()> {
        self.write.send(Message::text(text.to_owned())).await?;
        trace!(len = text.len(), "Text frame sent");
        Ok(())
    }

    async fn close(&mut self, code: u16, reason: &str) -> Result<()> {
        let frame = CloseFrame {
            code: CloseCode::from(code),
            reason: reason.to_owned().into(),
        };

        self.write
            .send(Message::Close(Some(frame)))
            .await
            .map_err(|e| Error::close(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
