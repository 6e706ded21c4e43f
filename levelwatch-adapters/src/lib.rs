//! # levelwatch-adapters
//!
//! Optional transports for delivering levelwatch batches to monitoring
//! servers that the core SDK does not speak natively.
//!
//! ## Supported Uplinks
//!
//! - **HTTP** (`http` feature) - POSTs each batch as JSON to an ingest endpoint
//!
//! ## Quick Start (HTTP)
//!
//! ```rust,no_run
//! # #[cfg(feature = "http")]
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use levelwatch_adapters::http::HttpTransport;
//! use levelwatch_sdk::{Agent, SimulatedSensor};
//! use std::time::Duration;
//!
//! let transport = HttpTransport::builder()
//!     .url("http://monitor.local:8080/ingest")
//!     .timeout(Duration::from_secs(20))
//!     .build()?;
//!
//! let handle = Agent::builder()
//!     .sensor(SimulatedSensor::new())
//!     .transport(transport)
//!     .build()?
//!     .start();
//! # handle.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;

#[cfg(feature = "http")]
pub mod http;

pub use error::AdapterError;

// Re-export types for convenience
pub use levelwatch_types::{BatchPayload, PayloadEntry, Status};
