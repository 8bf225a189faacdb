//! Receive guard.
//!
//! A binary try-lock around the read half of the connection and the receive
//! buffer. Acquisition never waits: a caller either gets a [`ReceiveLease`]
//! or nothing. The lease owns the transport and buffer until it is dropped,
//! so at most one receive can ever touch them.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{Error, Result};
use crate::transport::FrameSource;

// ============================================================================
// ReceiveSlot
// ============================================================================

/// Resources owned by whoever holds the guard.
struct ReceiveSlot {
    source: Box<dyn FrameSource>,
    buffer: Box<[u8]>,
}

// ============================================================================
// ReceiveGuard
// ============================================================================

/// Binary, non-blocking mutual exclusion over the receive path.
pub struct ReceiveGuard {
    slot: Arc<Mutex<Option<ReceiveSlot>>>,
}

impl ReceiveGuard {
    /// Creates a guard with no transport installed.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Creates a guard owning `source` and a zeroed buffer of `buffer_size`.
    #[must_use]
    pub fn with_source(source: Box<dyn FrameSource>, buffer_size: usize) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(ReceiveSlot::new(source, buffer_size)))),
        }
    }

    /// Installs a transport, replacing any previous one.
    ///
    /// Waits for an outstanding lease to be released.
    pub async fn install(&self, source: Box<dyn FrameSource>, buffer_size: usize) {
        *self.slot.lock().await = Some(ReceiveSlot::new(source, buffer_size));
    }

    /// Attempts to acquire the guard without waiting.
    ///
    /// Returns `None` if a lease is outstanding.
    #[inline]
    #[must_use]
    pub fn try_acquire(&self) -> Option<ReceiveLease> {
        Arc::clone(&self.slot)
            .try_lock_owned()
            .ok()
            .map(|inner| ReceiveLease { inner })
    }

    /// Returns `true` while a lease is outstanding.
    #[inline]
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.slot.try_lock().is_err()
    }

    /// Waits until no lease is outstanding.
    pub async fn released(&self) {
        drop(self.slot.lock().await);
    }
}

impl ReceiveSlot {
    fn new(source: Box<dyn FrameSource>, buffer_size: usize) -> Self {
        Self {
            source,
            buffer: vec![0u8; buffer_size].into_boxed_slice(),
        }
    }
}

// ============================================================================
// ReceiveLease
// ============================================================================

/// Exclusive access to the receive path. Dropping it releases the guard.
pub struct ReceiveLease {
    inner: OwnedMutexGuard<Option<ReceiveSlot>>,
}

impl ReceiveLease {
    /// Returns `true` if a transport is installed.
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner.is_some()
    }

    /// Performs one receive and returns the filled part of the buffer.
    ///
    /// # Errors
    ///
    /// - [`Error::Receive`] if no transport is installed
    /// - Any error reported by the [`FrameSource`]
    pub async fn receive(&mut self) -> Result<&[u8]> {
        let slot = (*self.inner)
            .as_mut()
            .ok_or_else(|| Error::receive("no transport installed"))?;

        let len = slot.source.receive(&mut slot.buffer).await?;
        Ok(&slot.buffer[..len])
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use crate::transport::frame::copy_truncated;

    struct Fixed(&'static [u8]);

    #[async_trait]
    impl FrameSource for Fixed {
        async fn receive(&mut self, buffer: &mut [u8]) -> Result<usize> {
            Ok(copy_truncated(self.0, buffer))
        }
    }

    #[test]
    fn test_second_acquire_fails_while_held() {
        let guard = ReceiveGuard::empty();

        let lease = guard.try_acquire();
        assert!(lease.is_some());
        assert!(guard.try_acquire().is_none());

        drop(lease);
        assert!(guard.try_acquire().is_some());
    }

    #[test]
    fn test_is_held_matches_try_acquire() {
        let guard = ReceiveGuard::empty();
        assert!(!guard.is_held());

        let lease = guard.try_acquire().unwrap();
        assert!(guard.is_held());
        assert!(guard.try_acquire().is_none());

        drop(lease);
        assert!(!guard.is_held());
    }

    #[test]
    fn test_empty_guard_lease_not_ready() {
        let guard = ReceiveGuard::empty();
        let lease = guard.try_acquire().unwrap();
        assert!(!lease.is_ready());
    }

    #[tokio::test]
    async fn test_receive_without_transport_errors() {
        let guard = ReceiveGuard::empty();
        let mut lease = guard.try_acquire().unwrap();
        let err = lease.receive().await.unwrap_err();
        assert!(matches!(err, Error::Receive { .. }));
    }

    #[tokio::test]
    async fn test_receive_fills_buffer_up_to_size() {
        let guard = ReceiveGuard::with_source(Box::new(Fixed(b"hello world")), 5);
        let mut lease = guard.try_acquire().unwrap();
        assert_eq!(lease.receive().await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_install_replaces_transport() {
        let guard = ReceiveGuard::empty();
        guard.install(Box::new(Fixed(b"{}")), 16).await;

        let mut lease = guard.try_acquire().unwrap();
        assert!(lease.is_ready());
        assert_eq!(lease.receive().await.unwrap(), b"{}");
    }

    #[test]
    fn test_released_waits_for_lease() {
        use tokio_test::{assert_pending, assert_ready, task};

        let guard = ReceiveGuard::empty();
        let lease = guard.try_acquire().unwrap();

        let mut released = task::spawn(guard.released());
        assert_pending!(released.poll());

        drop(lease);
        assert!(released.is_woken());
        assert_ready!(released.poll());
    }
}
