//! Frame source and sink traits.
//!
//! The client only needs two things from a transport: "give me the next data
//! frame in this buffer" and "send this text / close". Keeping those behind
//! traits lets the receive policy run over a scripted transport in tests.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;

use crate::error::Result;

// ============================================================================
// Constants
// ============================================================================

/// WebSocket close code for a normal closure (RFC 6455 §7.4.1).
pub const NORMAL_CLOSURE: u16 = 1000;

// ============================================================================
// FrameSource
// ============================================================================

/// Read half of a connection.
///
/// One call to [`receive`](FrameSource::receive) is one receive operation:
/// it suspends until a data frame arrives or the transport fails.
#[async_trait]
pub trait FrameSource: Send {
    /// Receives the next data frame into `buffer`.
    ///
    /// Returns the number of bytes written. Payloads longer than the buffer
    /// are truncated to `buffer.len()`. Control frames are not data and
    /// never complete a receive.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`](crate::Error::ConnectionClosed) on a close frame or end of stream
    /// - [`Error::WebSocket`](crate::Error::WebSocket) on a transport failure
    async fn receive(&mut self, buffer: &mut [u8]) -> Result<usize>;
}

// ============================================================================
// FrameSink
// ============================================================================

/// Write half of a connection.
#[async_trait]
pub trait FrameSink: Send {
    /// Sends a text frame.
    async fn send_text(&mut self, text: &str) -> Result<()>;

    /// Sends a close frame with `code` and `reason`.
    async fn close(&mut self, code: u16, reason: &str) -> Result<()>;
}

/// Copies as much of `payload` as fits into `buffer`.
///
/// Returns the number of bytes copied.
#[inline]
pub(crate) fn copy_truncated(payload: &[u8], buffer: &mut [u8]) -> usize {
    let len = payload.len().min(buffer.len());
    buffer[..len].copy_from_slice(&payload[..len]);
    len
}

// ============================================================================
// Tests
// ============================================================================
