//! Hand tracking socket - non-blocking WebSocket receive for real-time loops.
//!
//! This library lets a game or render loop consume hand tracking frames from
//! a local WebSocket server without ever stalling a frame on network I/O.
//!
//! # Architecture
//!
//! The client follows a poll-per-tick model:
//!
//! - **Host**: owns the frame/tick timing and calls `poll_receive` once per tick
//! - **Client**: starts at most one receive at a time on the tokio runtime
//! - **Relay**: local server that fans tracker frames out to clients
//!
//! Key design principles:
//!
//! - One connection per [`NonBlockingSocketClient`], no reconnection
//! - Zero-wait receive guard: a busy tick is skipped, never queued
//! - Latest-value semantics: each message overwrites the previous one
//! - Frames are opaque text on the receive path
//!
//! # Quick Start
//!
//! ```no_run
//! use handtrack_socket::{NonBlockingSocketClient, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = NonBlockingSocketClient::builder()
//!         .endpoint("ws://localhost:8765")
//!         .build()?;
//!     client.connect().await?;
//!
//!     // Called by the host once per tick
//!     client.poll_receive();
//!     if let Some(message) = client.latest() {
//!         println!("Latest frame: {}", message.as_str());
//!     }
//!
//!     client.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`NonBlockingSocketClient`], options and receive guard |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`host`] | Host lifecycle hooks and fixed-rate tick driver |
//! | [`protocol`] | Subscription handshake and hand frame JSON |
//! | [`relay`] | Local relay server |
//! | [`transport`] | WebSocket transport layer |

// ============================================================================
// Modules
// ============================================================================

/// Non-blocking socket client.
///
/// - [`NonBlockingSocketClient`] - Connection owner polled once per tick
/// - [`ClientBuilder`] - Fluent configuration
/// - [`ReceiveGuard`] - Zero-wait try-lock over the receive path
pub mod client;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Host lifecycle integration.
pub mod host;

/// Hand tracking wire protocol.
pub mod protocol;

/// Local hand frame relay server.
pub mod relay;

/// WebSocket transport layer.
///
/// Frame source/sink seams and the tungstenite-backed connection.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{
    ClientBuilder, ClientOptions, ConnectionState, InboundMessage, NonBlockingSocketClient,
    PollOutcome, PollSnapshot, ReceiveGuard,
};

// Error types
pub use error::{Error, Result};

// Host types
pub use host::{Lifecycle, SocketListener, run_fixed_update};

// Protocol types
pub use protocol::{HandFrame, Subscription};

// Relay types
pub use relay::{RelayHandle, RelayServer};

// Transport types
pub use transport::{FrameSink, FrameSource};
