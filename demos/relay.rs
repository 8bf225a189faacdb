//! Local hand frame relay.
//!
//! Demonstrates:
//! - Binding the relay on the default port
//! - Reporting peers while it runs
//!
//! Usage:
//!   cargo run --example relay
//!   cargo run --example relay -- --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use common::Args;
use handtrack_socket::{RelayServer, Result};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run().await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    println!("=== Hand Tracking Relay ===\n");

    let relay = RelayServer::bind_default().await?.spawn();
    println!("[Setup] Listening on {}\n", relay.ws_url());

    let mut report = tokio::time::interval(Duration::from_secs(5));
    let stop = common::wait_for_ctrl_c();
    tokio::pin!(stop);

    loop {
        tokio::select! {
            _ = &mut stop => break,
            _ = report.tick() => {
                println!(
                    "[Peers] connected={} subscribed={}",
                    relay.peer_count(),
                    relay.subscribed_count()
                );
            }
        }
    }

    relay.shutdown().await;
    println!("\n[Done] Relay stopped");
    Ok(())
}
