//! Host lifecycle and fixed-rate tick driver.
//!
//! A host (game engine, render loop) owns the timing and calls three hooks:
//! `init` once at startup, `on_tick` at least once per logical frame and
//! `shutdown` once on exit. [`run_fixed_update`] is a tokio stand-in for
//! such a host.

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// 50 Hz, the usual physics step.
pub const DEFAULT_FIXED_TIMESTEP: Duration = Duration::from_millis(20);

// ============================================================================
// Lifecycle
// ============================================================================

/// Hooks a host calls on a component.
#[async_trait]
pub trait Lifecycle: Send {
    /// Called once before the first tick. An error aborts startup.
    async fn init(&mut self) -> Result<()>;

    /// Called once per tick. Must not block.
    fn on_tick(&mut self);

    /// Called once on exit.
    async fn shutdown(&mut self);
}

// ============================================================================
// run_fixed_update
// ============================================================================

/// Drives `component` at a fixed `period` until `stop` resolves.
///
/// Ticks missed because the runtime was busy are skipped, not replayed.
/// Returns the number of ticks delivered.
///
/// # Errors
///
/// - [`Error::Config`] if `period` is zero
/// - Whatever `init` returns; `shutdown` is not called in that case
pub async fn run_fixed_update<C, F>(component: &mut C, period: Duration, stop: F) -> Result<u64>
where
    C: Lifecycle + ?Sized,
    F: Future<Output = ()>,
{
    if period.is_zero() {
        return Err(Error::config("Tick period must be non-zero"));
    }

    component.init().await?;

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(stop);

    let mut ticks = 0u64;
    loop {
        tokio::select! {
            biased;

            _ = &mut stop => break,

            _ = ticker.tick() => {
                component.on_tick();
                ticks += 1;
            }
        }
    }

    debug!(ticks, "Tick loop stopped");
    component.shutdown().await;

    Ok(ticks)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        fail_init: bool,
        inits: u32,
        ticks: u32,
        shutdowns: u32,
    }

    #[async_trait]
    impl Lifecycle for Recorder {
        async fn init(&mut self) -> Result<()> {
            self.inits += 1;
            if self.fail_init {
                return Err(Error::connect("ws://localhost:8765", "refused"));
            }
            Ok(())
        }

        fn on_tick(&mut self) {
            self.ticks += 1;
        }

        async fn shutdown(&mut self) {
            self.shutdowns += 1;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_until_stopped() {
        let mut recorder = Recorder::default();
        let stop = tokio::time::sleep(Duration::from_millis(105));

        let ticks = run_fixed_update(&mut recorder, Duration::from_millis(20), stop)
            .await
            .unwrap();

        // First tick fires immediately, then every 20ms: 0, 20, ..., 100
        assert_eq!(ticks, 6);
        assert_eq!(recorder.ticks, 6);
        assert_eq!(recorder.inits, 1);
        assert_eq!(recorder.shutdowns, 1);
    }

    #[tokio::test]
    async fn test_init_failure_skips_ticks_and_shutdown() {
        let mut recorder = Recorder {
            fail_init: true,
            ..Default::default()
        };

        let err = run_fixed_update(&mut recorder, DEFAULT_FIXED_TIMESTEP, std::future::pending())
            .await
            .unwrap_err();

        assert!(err.is_connect_error());
        assert_eq!(recorder.ticks, 0);
        assert_eq!(recorder.shutdowns, 0);
    }

    #[tokio::test]
    async fn test_zero_period_rejected() {
        let mut recorder = Recorder::default();
        let err = run_fixed_update(&mut recorder, Duration::ZERO, async {})
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Config { .. }));
        assert_eq!(recorder.inits, 0);
    }
}
