//! # levelwatch-sdk
//!
//! Store-and-forward core for a reservoir level agent.
//!
//! The agent samples a level sensor, buffers readings locally, and
//! periodically sends everything buffered to a monitoring server. The buffer
//! is cleared only after the server confirms receipt, and only up to the
//! newest entry it confirmed, so readings survive network outages and
//! nothing that arrives mid-send is lost.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use levelwatch_sdk::{Agent, FileSensor, TcpTransport};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let agent = Agent::builder()
//!         .sensor(FileSensor::new("/run/reservoir/level"))
//!         .transport(TcpTransport::new("monitor.local:7400"))
//!         .sample_interval(Duration::from_secs(300))
//!         .capacity(10_000)
//!         .build()?;
//!
//!     // Start the sampler, writer and transmitter loops
//!     let handle = agent.start();
//!
//!     // ... run until asked to stop ...
//!     tokio::signal::ctrl_c().await?;
//!     handle.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Delivery guarantees
//!
//! - **No loss before confirmation**: a failed or timed-out send leaves the
//!   buffer untouched; the next cycle resends the same entries plus anything new
//! - **No loss on clear**: clearing removes only entries up to the sent batch's
//!   high-water mark
//! - **At-least-once**: a lost acknowledgement means the server sees entries
//!   again; payload entries carry a `seq` to deduplicate on
//!
//! ## Features
//!
//! - **Pluggable collaborators**: [`Sensor`] and [`Transport`] traits with
//!   file, TCP, channel and simulated implementations
//! - **Bounded buffer**: optional capacity with a drop-oldest policy
//! - **Clean shutdown**: loops finish their current iteration, then a final flush

mod agent;
mod error;
mod sampler;
mod schedule;
mod sensor;
mod state;
mod stats;
#[cfg(test)]
mod test_log;
mod transmitter;
mod transport;
mod writer;

pub use agent::{
    Agent, AgentBuilder, AgentHandle, DEFAULT_AGENT_ID, DEFAULT_INTERVAL, DEFAULT_TRANSMIT_TIMEOUT,
};
pub use error::{AgentError, SensorError, TransmitError};
pub use sensor::{FileSensor, Sensor, SimulatedSensor};
pub use state::{Appended, SharedState};
pub use stats::{AgentStats, StatsSnapshot};
pub use transmitter::CycleOutcome;
pub use transport::{Ack, ChannelTransport, FileTransport, TcpTransport, Transport};

// Re-export types for convenience
pub use levelwatch_types::{
    classify, Batch, BatchPayload, BufferedReading, Level, Reading, Status, Thresholds,
};

// Implementors of Sensor and Transport outside this crate need the macro.
pub use async_trait::async_trait;
