//! Subscription handshake.
//!
//! A client tells the relay which hand sections it wants by sending
//! `:<flags>` as its first text frame, e.g. `:101` for landmarks and
//! gestures without orientation.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Prefix marking a handshake frame.
pub const HANDSHAKE_PREFIX: char = ':';

// ============================================================================
// Subscription
// ============================================================================

/// Hand frame sections a client wants relayed.
///
/// Flag order on the wire is landmarks, orientation, gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Subscription {
    /// Per-joint landmark positions.
    pub landmarks: bool,
    /// Palm orientation.
    pub orientation: bool,
    /// Recognised gesture.
    pub gesture: bool,
}

impl Subscription {
    /// Every section.
    pub const ALL: Self = Self {
        landmarks: true,
        orientation: true,
        gesture: true,
    };

    /// Creates a subscription from individual flags.
    #[inline]
    #[must_use]
    pub const fn new(landmarks: bool, orientation: bool, gesture: bool) -> Self {
        Self {
            landmarks,
            orientation,
            gesture,
        }
    }

    /// Returns `true` if no section is selected.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.landmarks || self.orientation || self.gesture)
    }

    /// Returns the handshake text, e.g. `:110`.
    #[must_use]
    pub fn handshake(&self) -> String {
        format!("{HANDSHAKE_PREFIX}{self}")
    }

    /// Parses a handshake frame.
    ///
    /// Returns `Ok(None)` if `text` is not a handshake at all.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the prefix is present but the flags
    /// are malformed.
    pub fn from_handshake(text: &str) -> Result<Option<Self>> {
        match text.strip_prefix(HANDSHAKE_PREFIX) {
            Some(flags) => flags.parse().map(Some),
            None => Ok(None),
        }
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for flag in [self.landmarks, self.orientation, self.gesture] {
            f.write_str(if flag { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for Subscription {
    type Err = Error;

    fn from_str(flags: &str) -> Result<Self> {
        let bits: Vec<bool> = flags
            .chars()
            .map(|c| match c {
                '1' => Ok(true),
                '0' => Ok(false),
                other => Err(Error::protocol(format!(
                    "invalid subscription flag {other:?} in {flags:?}"
                ))),
            })
            .collect::<Result<_>>()?;

        match bits.as_slice() {
            &[landmarks, orientation, gesture] => Ok(Self::new(landmarks, orientation, gesture)),
            _ => Err(Error::protocol(format!(
                "subscription needs 3 flags, got {:?}",
                flags
            ))),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
