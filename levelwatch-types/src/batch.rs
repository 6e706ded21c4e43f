//! Transmission batches.

use alloc::string::String;
use alloc::vec::Vec;

use crate::{BufferedReading, SchemaVersion, Status, Thresholds};

/// An immutable, ordered copy of the pending buffer taken at send time.
///
/// `high_watermark` is the largest sequence number included. Clearing up to
/// it after a confirmed send removes exactly these entries and nothing that
/// was appended afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Batch {
    /// Buffered entries in insertion order.
    pub entries: Vec<BufferedReading>,

    /// Highest sequence number in `entries`, or 0 when empty.
    pub high_watermark: u64,
}

impl Batch {
    /// Build a batch from entries already in sequence order.
    pub fn from_entries(entries: Vec<BufferedReading>) -> Self {
        let high_watermark = entries.last().map_or(0, |e| e.seq);
        Self {
            entries,
            high_watermark,
        }
    }

    /// Check if the batch carries no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries in the batch.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Lowest sequence number in the batch.
    pub fn first_seq(&self) -> Option<u64> {
        self.entries.first().map(|e| e.seq)
    }

    /// Iterate over the entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &BufferedReading> {
        self.entries.iter()
    }
}

/// One reading as it appears on the wire, annotated with its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PayloadEntry {
    /// Sequence number; servers deduplicate on this.
    pub seq: u64,
    /// Level percentage.
    pub level: u8,
    /// Unix timestamp in milliseconds of the sample.
    pub timestamp_ms: u64,
    /// Status derived from `level` at send time.
    pub status: Status,
}

/// The document a transport sends to the monitoring server.
///
/// Delivery is at-least-once: a batch whose acknowledgement was lost is sent
/// again, possibly with newer entries appended. Receivers must treat `seq`
/// as an idempotency key.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchPayload {
    /// Schema version for forward compatibility.
    pub version: SchemaVersion,

    /// Identifies the sending agent.
    pub agent_id: String,

    /// Unix timestamp in milliseconds when the payload was built.
    pub sent_at_ms: u64,

    /// Highest sequence number included.
    pub high_watermark: u64,

    /// Entries in sequence order.
    pub entries: Vec<PayloadEntry>,
}

impl BatchPayload {
    /// Build a payload from a batch, annotating each entry with its status.
    pub fn from_batch(
        batch: &Batch,
        agent_id: impl Into<String>,
        thresholds: &Thresholds,
        sent_at_ms: u64,
    ) -> Self {
        let entries = batch
            .iter()
            .map(|e| PayloadEntry {
                seq: e.seq,
                level: e.reading.level.percent(),
                timestamp_ms: e.reading.timestamp_ms,
                status: thresholds.classify(e.reading.level),
            })
            .collect();

        Self {
            version: SchemaVersion::current(),
            agent_id: agent_id.into(),
            sent_at_ms,
            high_watermark: batch.high_watermark,
            entries,
        }
    }

    /// Number of entries in the payload.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the payload carries no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
