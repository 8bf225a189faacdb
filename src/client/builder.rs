//! Builder pattern for client configuration.
//!
//! Provides a fluent API for configuring and creating
//! [`NonBlockingSocketClient`] instances.
//!
//! # Example
//!
//! ```no_run
//! use handtrack_socket::NonBlockingSocketClient;
//!
//! # fn example() -> handtrack_socket::Result<()> {
//! let client = NonBlockingSocketClient::builder()
//!     .endpoint("ws://localhost:8765")
//!     .buffer_size(1024)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::protocol::Subscription;

use super::core::NonBlockingSocketClient;
use super::options::{ClientOptions, DEFAULT_ENDPOINT};

// ============================================================================
// ClientBuilder
// ============================================================================

/// Builder for configuring a [`NonBlockingSocketClient`].
///
/// Use [`NonBlockingSocketClient::builder()`] to create a new builder.
#[derive(Debug, Default, Clone)]
pub struct ClientBuilder {
    /// Endpoint as given, parsed on build.
    endpoint: Option<String>,
    /// Receive buffer size.
    buffer_size: Option<usize>,
    /// Connect handshake limit.
    connect_timeout: Option<Duration>,
    /// Reason sent on shutdown.
    close_reason: Option<String>,
    /// Sections requested after connecting.
    subscription: Option<Subscription>,
}

// ============================================================================
// ClientBuilder Implementation
// ============================================================================

impl ClientBuilder {
    /// Creates a new builder with no configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the WebSocket endpoint.
    ///
    /// Defaults to `ws://localhost:8765`.
    #[inline]
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the receive buffer size in bytes.
    ///
    /// Defaults to 1024.
    #[inline]
    #[must_use]
    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = Some(buffer_size);
        self
    }

    /// Sets the limit on establishing the connection.
    #[inline]
    #[must_use]
    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = Some(connect_timeout);
        self
    }

    /// Sets the reason sent with the close frame on shutdown.
    #[inline]
    #[must_use]
    pub fn close_reason(mut self, reason: impl Into<String>) -> Self {
        self.close_reason = Some(reason.into());
        self
    }

    /// Requests hand frame sections from the relay after connecting.
    #[inline]
    #[must_use]
    pub fn subscribe(mut self, subscription: Subscription) -> Self {
        self.subscription = Some(subscription);
        self
    }

    /// Validates the configuration into [`ClientOptions`].
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidEndpoint`] if the endpoint does not parse
    /// - [`Error::Config`] if the scheme is not `ws`/`wss`, the buffer is
    ///   empty or the connect timeout is zero
    pub fn into_options(self) -> Result<ClientOptions> {
        let endpoint = self.validate_endpoint()?;
        let defaults = ClientOptions::default();

        let options = ClientOptions {
            endpoint,
            buffer_size: self.buffer_size.unwrap_or(defaults.buffer_size),
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            close_reason: self.close_reason.unwrap_or(defaults.close_reason),
            subscription: self.subscription,
        };
        options.validate()?;

        Ok(options)
    }

    /// Builds a disconnected client.
    ///
    /// # Errors
    ///
    /// See [`into_options`](Self::into_options).
    pub fn build(self) -> Result<NonBlockingSocketClient> {
        Ok(NonBlockingSocketClient::new(self.into_options()?))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ClientBuilder {
    /// Validates the endpoint configuration.
    fn validate_endpoint(&self) -> Result<Url> {
        let raw = self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        let endpoint = Url::parse(raw)?;

        match endpoint.scheme() {
            "ws" => {}
            "wss" if cfg!(feature = "tls") => {}
            "wss" => {
                return Err(Error::config(format!(
                    "Endpoint {raw} needs TLS. Enable the `tls` feature to use wss://"
                )));
            }
            other => {
                return Err(Error::config(format!(
                    "Endpoint scheme must be ws or wss, got {other:?}.\n\
                     Example: NonBlockingSocketClient::builder().endpoint(\"ws://localhost:8765\")"
                )));
            }
        }

        if endpoint.host_str().is_none_or(str::is_empty) {
            return Err(Error::config(format!("Endpoint {raw} has no host")));
        }

        Ok(endpoint)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_creates_empty_builder() {
        let builder = ClientBuilder::new();
        assert!(builder.endpoint.is_none());
        assert!(builder.buffer_size.is_none());
        assert!(builder.subscription.is_none());
    }

    #[test]
    fn test_defaults_applied() {
        let options = ClientBuilder::new().into_options().unwrap();
        assert_eq!(options, ClientOptions::default());
    }

    #[test]
    fn test_endpoint_sets_url() {
        let options = ClientBuilder::new()
            .endpoint("ws://127.0.0.1:9001/hands")
            .into_options()
            .unwrap();
        assert_eq!(options.endpoint.port(), Some(9001));
        assert_eq!(options.endpoint.path(), "/hands");
    }

    #[test]
    fn test_subscribe_sets_subscription() {
        let sub = Subscription::new(true, false, false);
        let options = ClientBuilder::new().subscribe(sub).into_options().unwrap();
        assert_eq!(options.subscription, Some(sub));
    }

    #[test]
    fn test_build_fails_with_unparseable_endpoint() {
        let err = ClientBuilder::new()
            .endpoint("not a url")
            .into_options()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_build_fails_with_http_scheme() {
        let err = ClientBuilder::new()
            .endpoint("http://localhost:8765")
            .into_options()
            .unwrap_err();
        assert!(err.to_string().contains("ws or wss"));
    }

    #[cfg(not(feature = "tls"))]
    #[test]
    fn test_build_fails_with_wss_without_tls() {
        let err = ClientBuilder::new()
            .endpoint("wss://localhost:8765")
            .into_options()
            .unwrap_err();
        assert!(err.to_string().contains("tls"));
    }

    #[test]
    fn test_build_fails_with_zero_buffer() {
        let err = ClientBuilder::new().buffer_size(0).into_options().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_build_fails_with_zero_timeout() {
        let err = ClientBuilder::new()
            .connect_timeout(Duration::ZERO)
            .into_options()
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_builder_is_clone() {
        let builder = ClientBuilder::new().endpoint("ws://localhost:1");
        let cloned = builder.clone();
        assert_eq!(builder.endpoint, cloned.endpoint);
    }
}
