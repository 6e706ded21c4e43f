//! Error types for the agent and its collaborators.

use std::time::Duration;

use levelwatch_types::{InvalidThresholds, LevelOutOfRange};
use thiserror::Error;

/// A sensor could not produce a reading this cycle.
///
/// Sensor failures are transient: the sampler logs them, skips the cycle
/// and keeps the previous current level.
#[derive(Debug, Error)]
pub enum SensorError {
    /// Reading the device failed.
    #[error("sensor I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The device returned something that is not a level.
    #[error("failed to parse sensor value: {0}")]
    Parse(String),

    /// The device returned a level outside 0..=100.
    #[error("sensor value out of range: {0}")]
    OutOfRange(#[from] LevelOutOfRange),

    /// The device is not ready or not connected.
    #[error("sensor unavailable: {0}")]
    Unavailable(String),

    /// The device did not answer within the sample timeout.
    #[error("sensor read timed out after {0:?}")]
    Timeout(Duration),
}

/// A batch could not be delivered this cycle.
///
/// Transmission failures never touch the pending buffer; the same entries
/// are retried on the next cycle.
#[derive(Debug, Error)]
pub enum TransmitError {
    /// Network or file I/O failed.
    #[error("transport I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The payload or acknowledgement could not be (de)serialized.
    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),

    /// The round-trip did not complete in time.
    #[error("transmission timed out after {0:?}")]
    Timeout(Duration),

    /// The server answered but did not confirm the whole batch.
    #[error("server rejected batch: {0}")]
    Rejected(String),

    /// An in-process receiver is not keeping up.
    #[error("channel is full")]
    ChannelFull,

    /// An in-process receiver has gone away.
    #[error("channel is closed")]
    ChannelClosed,

    /// Failure reported by a transport implemented outside this crate.
    #[error(transparent)]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}

/// The agent could not be set up. These are fatal at startup.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("no sensor configured")]
    MissingSensor,

    #[error("no transport configured")]
    MissingTransport,

    #[error("{0} interval must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("buffer capacity must be greater than zero")]
    ZeroCapacity,

    #[error(transparent)]
    Thresholds(#[from] InvalidThresholds),

    /// A loop task panicked or was cancelled before it could be joined.
    #[error("{activity} task did not exit cleanly: {reason}")]
    Join {
        activity: &'static str,
        reason: String,
    },
}
