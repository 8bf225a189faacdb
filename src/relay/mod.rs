//! Hand frame relay.
//!
//! The server side of the client: a local WebSocket hub the tracker
//! publishes hand frames to and game clients subscribe on.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   hand frames   ┌──────────────────┐  filtered frames  ┌─────────────┐
//! │ Tracker  │────────────────►│   RelayServer    │──────────────────►│ Game client │
//! └──────────┘                 │  Registry        │                   │ (:111)      │
//!                              │  PeerId → (sub,  │──────────────────►├─────────────┤
//!                              │   outbound tx)   │                   │ Game client │
//!                              └──────────────────┘                   │ (:001)      │
//!                                                                     └─────────────┘
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Connected peers and subscriptions.
pub mod registry;

/// Relay server and accept loop.
pub mod server;

// ============================================================================
// Re-exports
// ============================================================================

pub use registry::{PeerId, Registry};
pub use server::{DEFAULT_RELAY_PORT, RelayHandle, RelayServer};
