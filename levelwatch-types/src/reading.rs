//! Sensor readings and their buffered form.

use crate::Level;

/// A single sensor sample.
///
/// Readings are immutable values: they are produced by the sampler and
/// copied, never mutated, by everything downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading {
    /// Measured fill level.
    pub level: Level,

    /// Unix timestamp in milliseconds when the sample was taken.
    pub timestamp_ms: u64,
}

impl Reading {
    /// Create a reading with an explicit timestamp.
    pub const fn new(level: Level, timestamp_ms: u64) -> Self {
        Self {
            level,
            timestamp_ms,
        }
    }

    /// Create a reading stamped with the current wall-clock time.
    #[cfg(feature = "std")]
    pub fn now(level: Level) -> Self {
        Self::new(level, current_timestamp_ms())
    }
}

/// A reading waiting in the pending buffer, tagged with the sequence
/// number it was assigned on insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferedReading {
    /// Monotonically increasing insertion sequence number, starting at 1.
    pub seq: u64,

    /// The buffered reading.
    pub reading: Reading,
}

/// Get current timestamp in milliseconds since Unix epoch.
#[cfg(feature = "std")]
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
