//! Poll counters.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

// ============================================================================
// PollOutcome
// ============================================================================

/// What a single [`poll_receive`](super::NonBlockingSocketClient::poll_receive) did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollOutcome {
    /// The guard was free and a receive was started.
    Started,
    /// A receive was already in flight. No work was done.
    Skipped,
    /// `connect` has not completed. No work was done.
    NotConnected,
    /// The connection is closing or closed. No work was done.
    Closed,
}

impl PollOutcome {
    /// Returns `true` if this tick started a receive.
    #[inline]
    #[must_use]
    pub const fn is_started(self) -> bool {
        matches!(self, Self::Started)
    }
}

// ============================================================================
// PollStats
// ============================================================================

/// Lock-free counters shared between the client and its receive tasks.
#[derive(Debug, Default)]
pub struct PollStats {
    started: AtomicU64,
    skipped: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    in_flight: AtomicUsize,
}

/// Point-in-time copy of [`PollStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSnapshot {
    /// Receives started.
    pub started: u64,
    /// Ticks skipped because a receive was in flight.
    pub skipped: u64,
    /// Receives that published a message.
    pub completed: u64,
    /// Receives that ended in a receive or decode error.
    pub failed: u64,
    /// Receives currently outstanding (0 or 1).
    pub in_flight: usize,
}

impl PollStats {
    pub(crate) fn record_started(&self) {
        self.started.fetch_add(1, Ordering::Relaxed);
        self.in_flight.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }

    /// Number of receives that have not recorded a result yet.
    ///
    /// Drops to zero just before the receive guard is released; use
    /// [`ReceiveGuard::is_held`](super::ReceiveGuard::is_held) to know
    /// whether the next poll can start.
    #[inline]
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Returns a copy of all counters.
    #[must_use]
    pub fn snapshot(&self) -> PollSnapshot {
        PollSnapshot {
            started: self.started.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            in_flight: self.in_flight(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_flight_tracks_start_and_finish() {
        let stats = PollStats::default();

        stats.record_started();
        assert_eq!(stats.in_flight(), 1);
        stats.record_completed();
        assert_eq!(stats.in_flight(), 0);

        stats.record_started();
        stats.record_failed();
        stats.record_skipped();

        let snap = stats.snapshot();
        assert_eq!(
            snap,
            PollSnapshot {
                started: 2,
                skipped: 1,
                completed: 1,
                failed: 1,
                in_flight: 0,
            }
        );
    }

    #[test]
    fn test_outcome_is_started() {
        assert!(PollOutcome::Started.is_started());
        assert!(!PollOutcome::Skipped.is_started());
    }
}
