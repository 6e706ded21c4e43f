//! Payload format version.
//!
//! A server deduplicates redelivered batches by each entry's `seq` and may
//! clear its own state up to `high_watermark`. The major version guards that
//! contract: it changes only if the meaning of `seq`, `high_watermark` or an
//! existing entry field changes. The minor version counts added fields,
//! which readers of the same major version can ignore.

use core::fmt;

use crate::SCHEMA_VERSION;

/// Format version stamped on every [`BatchPayload`](crate::BatchPayload).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaVersion {
    /// Bumped when the dedup or clearing semantics change.
    pub major: u32,

    /// Bumped when optional fields are added.
    pub minor: u32,
}

impl SchemaVersion {
    /// Minor revision of the payloads this crate writes.
    pub const CURRENT_MINOR: u32 = 0;

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// The version this crate writes.
    pub const fn current() -> Self {
        Self::new(SCHEMA_VERSION, Self::CURRENT_MINOR)
    }

    /// Whether a reader built against this crate can dedup and clear by
    /// the payload's sequence numbers.
    pub fn is_compatible(&self) -> bool {
        self.readable_by(Self::current())
    }

    /// Whether a reader at version `reader` can safely consume a payload at
    /// this version. Unknown minor additions are ignored by the reader.
    pub fn readable_by(&self, reader: SchemaVersion) -> bool {
        self.major == reader.major
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}", self.major, self.minor)
    }
}
