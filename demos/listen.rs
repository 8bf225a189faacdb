//! Per-tick listener against a local relay.
//!
//! Demonstrates:
//! - Building a client with a subscription handshake
//! - Driving it at the default 50 Hz fixed timestep
//! - Printing each new hand frame once
//!
//! Usage:
//!   cargo run --example listen
//!   cargo run --example listen -- ws://localhost:8765
//!   cargo run --example listen -- --subscribe 001
//!   cargo run --example listen -- --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use common::Args;
use handtrack_socket::client::DEFAULT_ENDPOINT;
use handtrack_socket::host::DEFAULT_FIXED_TIMESTEP;
use handtrack_socket::{
    InboundMessage, NonBlockingSocketClient, Result, SocketListener, Subscription,
    run_fixed_update,
};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    println!("=== Hand Tracking Listener ===\n");

    let endpoint = args.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
    let subscription: Subscription = match args.subscribe.as_deref() {
        Some(flags) => flags.parse()?,
        None => Subscription::ALL,
    };

    let client = NonBlockingSocketClient::builder()
        .endpoint(endpoint)
        .subscribe(subscription)
        .build()?;
    let client = Arc::new(client);

    println!("[Setup] Endpoint:     {endpoint}");
    println!("[Setup] Subscription: {subscription}\n");

    let mut listener = SocketListener::with_handler(
        Arc::clone(&client),
        Box::new(|message: &InboundMessage| {
            println!("[{:>6}] {}", message.sequence, message.as_str());
        }),
    );

    let ticks = run_fixed_update(&mut listener, DEFAULT_FIXED_TIMESTEP, common::wait_for_ctrl_c())
        .await?;

    let stats = client.stats();
    println!("\n[Done] {ticks} ticks");
    println!(
        "       started={} skipped={} completed={} failed={}",
        stats.started, stats.skipped, stats.completed, stats.failed
    );

    Ok(())
}
