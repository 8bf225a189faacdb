//! Hand tracking wire protocol.
//!
//! The receive path of the client treats frames as opaque text. This module
//! is for the parties that do look inside them: the relay server and any
//! consumer of [`InboundMessage`](crate::InboundMessage).
//!
//! # Protocol Overview
//!
//! | Message | Direction | Format |
//! |---------|-----------|--------|
//! | Handshake | Client → Relay | `:` followed by 3 flags, e.g. `:111` |
//! | Keepalive | Client → Relay | `ping`, answered with a pong frame |
//! | Hand frame | Tracker → Relay → Clients | JSON with `Left` / `Right` sections |

// ============================================================================
// Submodules
// ============================================================================

/// Hand frame JSON types.
pub mod hand;

/// Subscription handshake.
pub mod subscription;

// ============================================================================
// Re-exports
// ============================================================================

pub use hand::{Hand, HandFrame};
pub use subscription::{HANDSHAKE_PREFIX, Subscription};
