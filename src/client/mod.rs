//! Non-blocking socket client.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`NonBlockingSocketClient`] | Connection owner, polled once per tick |
//! | [`ClientBuilder`] | Fluent configuration builder |
//! | [`ClientOptions`] | Validated connection options |
//! | [`ReceiveGuard`] | Zero-wait try-lock over the receive path |
//! | [`PollOutcome`] | Result of a single tick |
//!
//! # Example
//!
//! ```no_run
//! use handtrack_socket::{NonBlockingSocketClient, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = NonBlockingSocketClient::builder()
//!     .endpoint("ws://localhost:8765")
//!     .build()?;
//! client.connect().await?;
//!
//! // Once per host tick
//! client.poll_receive();
//! if let Some(message) = client.latest() {
//!     println!("{}", message.as_str());
//! }
//!
//! client.shutdown().await;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder for client configuration.
pub mod builder;

/// Client implementation.
pub mod core;

/// Receive guard.
pub mod guard;

/// Connection options.
pub mod options;

/// Poll outcome and counters.
pub mod stats;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ClientBuilder;
pub use self::core::{ConnectionState, InboundMessage, NonBlockingSocketClient};
pub use guard::{ReceiveGuard, ReceiveLease};
pub use options::{
    ClientOptions, DEFAULT_BUFFER_SIZE, DEFAULT_CLOSE_REASON, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_ENDPOINT,
};
pub use stats::{PollOutcome, PollSnapshot, PollStats};
