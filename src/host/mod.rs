//! Host integration.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Lifecycle`] | `init` / `on_tick` / `shutdown` hooks |
//! | [`SocketListener`] | Lifecycle component around the client |
//! | [`run_fixed_update`] | Fixed-rate tick driver |

// ============================================================================
// Submodules
// ============================================================================

/// Lifecycle trait and tick driver.
pub mod lifecycle;

/// Socket listener component.
pub mod listener;

// ============================================================================
// Re-exports
// ============================================================================

pub use lifecycle::{DEFAULT_FIXED_TIMESTEP, Lifecycle, run_fixed_update};
pub use listener::{MessageHandler, SocketListener};
