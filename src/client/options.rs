//! Client connection options.
//!
//! # Example
//!
//! ```ignore
//! use handtrack_socket::{ClientOptions, Subscription};
//!
//! let options = ClientOptions::new()
//!     .with_buffer_size(2048)
//!     .with_subscription(Subscription::ALL);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::protocol::Subscription;

// ============================================================================
// Constants
// ============================================================================

/// Endpoint of the local hand tracking server.
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8765";

/// Bytes read per receive.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Limit on the connect handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Reason sent with the close frame on shutdown.
pub const DEFAULT_CLOSE_REASON: &str = "Client closed";

// ============================================================================
// ClientOptions
// ============================================================================

/// Options for a [`NonBlockingSocketClient`](super::NonBlockingSocketClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// WebSocket endpoint (`ws` or `wss`).
    pub endpoint: Url,

    /// Size of the receive buffer. Longer frames are truncated.
    pub buffer_size: usize,

    /// Limit on establishing the connection. Receives have no timeout.
    pub connect_timeout: Duration,

    /// Reason sent by [`shutdown`](super::NonBlockingSocketClient::shutdown).
    pub close_reason: String,

    /// Sections to request from the relay right after connecting.
    pub subscription: Option<Subscription>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            close_reason: DEFAULT_CLOSE_REASON.to_string(),
            subscription: None,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ClientOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the endpoint.
    #[inline]
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Sets the receive buffer size.
    #[inline]
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Sets the connect timeout.
    #[inline]
    #[must_use]
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Sets the reason sent on shutdown.
    #[inline]
    #[must_use]
    pub fn with_close_reason(mut self, reason: impl Into<String>) -> Self {
        self.close_reason = reason.into();
        self
    }

    /// Sets the subscription sent after connecting.
    #[inline]
    #[must_use]
    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscription = Some(subscription);
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ClientOptions {
    /// Checks the limits every client needs before it can receive.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if `buffer_size` is zero
    /// - [`Error::Config`] if `connect_timeout` is zero
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(Error::config("Receive buffer size must be non-zero"));
        }
        if self.connect_timeout.is_zero() {
            return Err(Error::config("Connect timeout must be non-zero"));
        }
        Ok(())
    }
}

/// Parses [`DEFAULT_ENDPOINT`].
fn default_endpoint() -> Url {
    Url::parse(DEFAULT_ENDPOINT).expect("DEFAULT_ENDPOINT is a valid URL")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ClientOptions::new();
        assert_eq!(options.endpoint.as_str(), "ws://localhost:8765/");
        assert_eq!(options.buffer_size, 1024);
        assert_eq!(options.connect_timeout, Duration::from_secs(10));
        assert_eq!(options.close_reason, "Client closed");
        assert!(options.subscription.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let endpoint = Url::parse("ws://127.0.0.1:9000").unwrap();
        let options = ClientOptions::new()
            .with_endpoint(endpoint.clone())
            .with_buffer_size(64)
            .with_connect_timeout(Duration::from_millis(250))
            .with_close_reason("bye")
            .with_subscription(Subscription::ALL);

        assert_eq!(options.endpoint, endpoint);
        assert_eq!(options.buffer_size, 64);
        assert_eq!(options.connect_timeout, Duration::from_millis(250));
        assert_eq!(options.close_reason, "bye");
        assert_eq!(options.subscription, Some(Subscription::ALL));
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(ClientOptions::new().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_buffer() {
        let err = ClientOptions::new().with_buffer_size(0).validate().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let err = ClientOptions::new()
            .with_connect_timeout(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
