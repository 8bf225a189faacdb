//! Shared utilities for demos.
//!
//! Provides common functionality used across all demos:
//! - Command-line argument parsing
//! - Logging initialization
//! - Graceful exit handling

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use tracing_subscriber::EnvFilter;

// ============================================================================
// Types
// ============================================================================

/// Command-line arguments for demos.
#[derive(Debug, Clone)]
pub struct Args {
    pub debug: bool,
    /// First positional argument, if any.
    pub endpoint: Option<String>,
    /// Value of `--subscribe <flags>`, e.g. `101`.
    pub subscribe: Option<String>,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse() -> Self {
        let args: Vec<String> = std::env::args().skip(1).collect();

        let subscribe = args
            .iter()
            .position(|a| a == "--subscribe")
            .and_then(|i| args.get(i + 1).cloned());

        let endpoint = args
            .iter()
            .enumerate()
            .find(|(i, a)| {
                !a.starts_with("--") && (*i == 0 || args[i - 1] != "--subscribe")
            })
            .map(|(_, a)| a.clone());

        Self {
            debug: args.iter().any(|a| a == "--debug"),
            endpoint,
            subscribe,
        }
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Initialize tracing/logging.
pub fn init_logging(debug: bool) {
    let filter = if debug {
        "handtrack_socket=debug"
    } else {
        "handtrack_socket=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

/// Resolves once Ctrl+C is pressed.
pub async fn wait_for_ctrl_c() {
    println!("Press Ctrl+C to exit...");
    tokio::signal::ctrl_c().await.ok();
}
