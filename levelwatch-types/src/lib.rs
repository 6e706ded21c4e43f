//! # levelwatch-types
//!
//! Core types for reservoir level monitoring. This crate defines the values
//! shared between the sampling agent and the monitoring server: readings,
//! the derived operating status, and the batches sent over the uplink.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature for JSON and friends
//! - **Validated at the edge**: A [`Level`] is always a percentage in `0..=100`
//! - **Versioned payloads**: Batches carry schema version info for forward compatibility
//!
//! ## Features
//!
//! - `std` (default): Standard library support (wall-clock timestamps)
//! - `serde`: Serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use levelwatch_types::{classify, Level, Reading, Status, Thresholds};
//!
//! let reading = Reading::new(Level::new(27).unwrap(), 1_703_160_000_000);
//! assert_eq!(classify(reading.level), Status::Alert);
//!
//! // Thresholds are configurable
//! let strict = Thresholds::new(50, 30).unwrap();
//! assert_eq!(strict.classify(reading.level), Status::Critical);
//! ```
//!
//! ## Schema Version
//!
//! The current schema version is **1**. The version is included in every
//! serialized [`BatchPayload`] so the server can handle format evolution.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod batch;
mod level;
mod reading;
mod status;
mod version;

pub use batch::*;
pub use level::*;
pub use reading::*;
pub use status::*;
pub use version::*;

/// Current schema version.
///
/// Increment this when making breaking changes to the payload format.
pub const SCHEMA_VERSION: u32 = 1;
