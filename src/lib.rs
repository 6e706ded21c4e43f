//! # levelwatch
//!
//! A store-and-forward agent for a remote reservoir. It samples the water
//! level on one schedule, appends the latest reading to a pending buffer on
//! another, and on a third sends everything pending to a monitoring server,
//! clearing only what the server confirmed.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐  set   ┌──────────────────────────┐ snapshot ┌─────────────┐
//! │ Sampler  │───────▶│       SharedState        │◀─────────│ Transmitter │──▶ server
//! └──────────┘        │  current level │ pending │  clear   └─────────────┘
//! ┌──────────┐ append │                │ buffer  │◀─────────
//! │  Writer  │───────▶│                │         │
//! └──────────┘        └──────────────────────────┘
//! ```
//!
//! The agent itself lives in [`levelwatch_sdk`]; this crate adds what the
//! process needs around it:
//!
//! - **[`settings`]**: layered configuration (defaults, TOML file,
//!   `LEVELWATCH_*` environment variables, CLI overrides) and construction of
//!   the configured sensor, transport and agent
//! - **[`duration`]**: human-readable durations such as `5m` or `30s`
//!
//! ## Usage
//!
//! ```bash
//! # Simulated sensor, spool batches to a local file every 30 seconds
//! LEVELWATCH_TRANSPORT__KIND=file LEVELWATCH_TRANSPORT__PATH=spool.ndjson \
//!     levelwatch --sample-interval 10s --transmit-interval 30s
//!
//! # Everything from a config file
//! levelwatch --config /etc/levelwatch.toml
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use levelwatch::{Overrides, Settings};
//!
//! # tokio_test::block_on(async {
//! let settings = Settings::load(None, &Overrides::default())?;
//! let handle = settings.build_agent()?.start();
//! // ...
//! let stats = handle.shutdown().await?;
//! println!("{} readings delivered", stats.entries_cleared);
//! # Ok::<_, anyhow::Error>(())
//! # });
//! ```

pub mod duration;
pub mod settings;

// Re-export main types for convenience
pub use duration::{format_duration, parse_duration};
pub use settings::{Intervals, Overrides, SensorSettings, Settings, TransportSettings};
