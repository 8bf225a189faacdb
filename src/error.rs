//! Error types for the hand tracking socket client.
//!
//! One error enum covers the client, the relay and the transport.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use handtrack_socket::{NonBlockingSocketClient, Result};
//!
//! async fn example() -> Result<()> {
//!     let client = NonBlockingSocketClient::builder().build()?;
//!     client.connect().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants | Handling |
//! |----------|----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidEndpoint`] | Fatal |
//! | Connect | [`Error::Connect`], [`Error::ConnectionTimeout`] | Fatal, surfaced to host |
//! | Receive | [`Error::ConnectionClosed`], [`Error::Receive`] | Message dropped, guard released |
//! | Decode | [`Error::Decode`] | Message dropped, previous value kept |
//! | Close | [`Error::Close`] | Logged |
//! | Protocol | [`Error::Protocol`] | Frame skipped |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`] | Context dependent |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;
use std::str::Utf8Error;
use std::time::Duration;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Crate result alias over [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Error type for every fallible operation in the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when client or relay configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong with the configuration.
        message: String,
    },

    /// Endpoint is not a valid WebSocket URI.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    // ========================================================================
    // Connect Errors
    // ========================================================================
    /// WebSocket connection could not be established.
    ///
    /// Fatal to startup. The client never retries internally.
    #[error("Connection to {endpoint} failed: {message}")]
    Connect {
        /// Endpoint the client tried to reach.
        endpoint: String,
        /// Why the connection failed.
        message: String,
    },

    /// Connection handshake did not complete in time.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// How long the handshake was allowed to take.
        timeout_ms: u64,
    },

    // ========================================================================
    // Receive Errors
    // ========================================================================
    /// WebSocket connection closed.
    ///
    /// Returned by a receive when the peer sent a close frame or the
    /// stream ended, and by operations attempted after `close`.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Receive failed for a reason other than closure.
    #[error("Receive failed: {message}")]
    Receive {
        /// Description of the receive failure.
        message: String,
    },

    // ========================================================================
    // Decode Errors
    // ========================================================================
    /// Received bytes are not valid UTF-8.
    #[error("Decode error after {received} bytes: {source}")]
    Decode {
        /// Number of bytes the receive produced.
        received: usize,
        /// Underlying UTF-8 error.
        #[source]
        source: Utf8Error,
    },

    // ========================================================================
    // Close Errors
    // ========================================================================
    /// Close handshake failed.
    ///
    /// Only logged by the client, shutdown continues regardless.
    #[error("Close failed: {message}")]
    Close {
        /// Description of the close failure.
        message: String,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Malformed handshake or hand frame.
    #[error("Protocol error: {message}")]
    Protocol {
        /// What was malformed.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// Hand frame JSON could not be parsed or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connect error.
    #[inline]
    pub fn connect(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connect {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a connection timeout error from a duration.
    ///
    /// Durations beyond `u64::MAX` milliseconds saturate.
    #[inline]
    pub fn connection_timeout_after(timeout: Duration) -> Self {
        Self::connection_timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
    }

    /// Creates a receive error.
    #[inline]
    pub fn receive(message: impl Into<String>) -> Self {
        Self::Receive {
            message: message.into(),
        }
    }

    /// Creates a decode error.
    #[inline]
    pub fn decode(received: usize, source: Utf8Error) -> Self {
        Self::Decode { received, source }
    }

    /// Creates a close error.
    #[inline]
    pub fn close(message: impl Into<String>) -> Self {
        Self::Close {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ConnectionTimeout { .. })
    }

    /// Returns `true` if this error happened while establishing the connection.
    #[inline]
    #[must_use]
    pub fn is_connect_error(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. } | Self::ConnectionTimeout { .. } | Self::InvalidEndpoint(_)
        )
    }

    /// Returns `true` if this is a decode error.
    #[inline]
    #[must_use]
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// Returns `true` if the tick loop may keep polling after this error.
    ///
    /// Receive and decode failures only cost the current message.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionClosed
                | Self::Receive { .. }
                | Self::Decode { .. }
                | Self::WebSocket(_)
                | Self::Close { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
