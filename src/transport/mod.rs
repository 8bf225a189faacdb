//! WebSocket transport layer.
//!
//! This module owns the outbound connection to the hand tracking server and
//! exposes it to the client as two halves.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐                    ┌─────────────────┐
//! │  NonBlockingSocketClient │                    │  Relay server   │
//! │                          │     WebSocket      │                 │
//! │  ReceiveGuard → WsSource │◄───────────────────│  hand frames    │
//! │  close/send  → WsSink    │───────────────────►│                 │
//! │                          │  localhost:8765    │                 │
//! └──────────────────────────┘                    └─────────────────┘
//! ```
//!
//! The read half lives behind the receive guard. The write half is used for
//! the subscription handshake and the close frame, so `close` never waits on
//! an outstanding receive.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | Outbound connect and the tungstenite-backed halves |
//! | `frame` | [`FrameSource`] / [`FrameSink`] traits |

// ============================================================================
// Submodules
// ============================================================================

/// Outbound WebSocket connection.
pub mod connection;

/// Frame source and sink traits.
pub mod frame;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{WsSink, WsSource, connect};
pub use frame::{FrameSink, FrameSource, NORMAL_CLOSURE};
