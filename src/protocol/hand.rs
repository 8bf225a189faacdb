//! Hand frame JSON.
//!
//! The tracker publishes one JSON object per camera frame:
//!
//! ```text
//! {
//!   "Left":  { "Landmarks": [...], "Orientation": ..., "Gesture": ... },
//!   "Right": { "Landmarks": [...], "Orientation": ..., "Gesture": ... }
//! }
//! ```
//!
//! A section whose value is `null` or the string `"None"` is treated as
//! absent. The relay uses [`HandFrame::filter`] to strip sections a client
//! did not subscribe to.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::Result;

use super::Subscription;

// ============================================================================
// HandFrame
// ============================================================================

/// One frame of tracking data for both hands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    /// Left hand.
    #[serde(rename = "Left", default)]
    pub left: Hand,
    /// Right hand.
    #[serde(rename = "Right", default)]
    pub right: Hand,
}

/// Tracking sections for one hand.
///
/// Section payloads are kept as raw JSON; their shape is owned by the tracker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    /// Landmark positions.
    #[serde(
        rename = "Landmarks",
        default,
        deserialize_with = "absent_if_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub landmarks: Option<Value>,

    /// Palm orientation.
    #[serde(
        rename = "Orientation",
        default,
        deserialize_with = "absent_if_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub orientation: Option<Value>,

    /// Recognised gesture.
    #[serde(
        rename = "Gesture",
        default,
        deserialize_with = "absent_if_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub gesture: Option<Value>,
}

impl HandFrame {
    /// Parses a frame from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if `text` is not a hand frame.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serializes the frame to JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Returns a copy holding only the subscribed sections.
    #[must_use]
    pub fn filter(&self, subscription: &Subscription) -> Self {
        Self {
            left: self.left.filter(subscription),
            right: self.right.filter(subscription),
        }
    }
}

impl Hand {
    /// Returns a copy holding only the subscribed sections.
    #[must_use]
    pub fn filter(&self, subscription: &Subscription) -> Self {
        Self {
            landmarks: self.landmarks.clone().filter(|_| subscription.landmarks),
            orientation: self.orientation.clone().filter(|_| subscription.orientation),
            gesture: self.gesture.clone().filter(|_| subscription.gesture),
        }
    }
}

/// Maps JSON `null` and the string `"None"` to `None`.
fn absent_if_none<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.filter(|v| v.as_str() != Some("None")))
}

// ============================================================================
// Tests
// ============================================================================
