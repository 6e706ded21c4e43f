//! The main Agent type wiring the sampler, buffer writer and transmitter.

use std::sync::Arc;
use std::time::Duration;

use levelwatch_types::Thresholds;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::AgentError;
use crate::sampler::Sampler;
use crate::schedule::run_periodic;
use crate::sensor::Sensor;
use crate::state::SharedState;
use crate::stats::{AgentStats, StatsSnapshot};
use crate::transmitter::{CycleOutcome, Transmitter};
use crate::transport::Transport;
use crate::writer::BufferWriter;

/// Default interval for sampling, buffering and transmitting.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Default bound on a single transmission round-trip.
pub const DEFAULT_TRANSMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default agent id sent with every payload.
pub const DEFAULT_AGENT_ID: &str = "levelwatch";

/// A configured, not yet running, monitoring agent.
///
/// The agent owns one sensor and one transport. Starting it spawns three
/// independent periodic tasks that share a single [`SharedState`]:
///
/// - **sampler**: reads the sensor and publishes the current level
/// - **writer**: appends the current level to the pending buffer
/// - **transmitter**: sends everything pending and clears it on confirmation
///
/// # Example
///
/// ```rust,no_run
/// use levelwatch_sdk::{Agent, SimulatedSensor, TcpTransport};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let agent = Agent::builder()
///         .sensor(SimulatedSensor::new())
///         .transport(TcpTransport::new("127.0.0.1:7400"))
///         .sample_interval(Duration::from_secs(60))
///         .transmit_interval(Duration::from_secs(300))
///         .build()?;
///
///     let handle = agent.start();
///
///     tokio::signal::ctrl_c().await?;
///     let stats = handle.shutdown().await?;
///     println!("{} readings still pending", stats.pending);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Agent {
    sensor: Box<dyn Sensor>,
    transport: Box<dyn Transport>,
    state: Arc<SharedState>,
    stats: Arc<AgentStats>,
    sample_interval: Duration,
    buffer_interval: Duration,
    transmit_interval: Duration,
    transmit_timeout: Duration,
    sample_timeout: Duration,
    thresholds: Thresholds,
    agent_id: String,
    flush_on_shutdown: bool,
}

impl Agent {
    /// Create a builder for configuring the agent.
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    /// The shared state the loops will operate on.
    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    /// Spawn the three loops on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// If called outside a tokio runtime.
    pub fn start(self) -> AgentHandle {
        let (stop_tx, stop_rx) = watch::channel(false);

        info!(
            "starting agent {:?}: sensor {}, transport {}, thresholds {}/{}",
            self.agent_id,
            self.sensor.description(),
            self.transport.description(),
            self.thresholds.normal_min,
            self.thresholds.alert_min
        );

        let sampler = Sampler::new(
            self.sensor,
            self.state.clone(),
            self.stats.clone(),
            self.thresholds,
            self.sample_timeout,
        );
        let writer = BufferWriter::new(self.state.clone(), self.stats.clone());
        let transmitter = Transmitter::new(
            self.transport,
            self.state.clone(),
            self.stats.clone(),
            self.thresholds,
            self.agent_id,
            self.transmit_timeout,
        );

        AgentHandle {
            sampler: tokio::spawn(run_periodic(sampler, self.sample_interval, stop_rx.clone())),
            writer: tokio::spawn(run_periodic(writer, self.buffer_interval, stop_rx.clone())),
            transmitter: tokio::spawn(run_periodic(
                transmitter,
                self.transmit_interval,
                stop_rx,
            )),
            stop_tx,
            state: self.state,
            stats: self.stats,
            flush_on_shutdown: self.flush_on_shutdown,
        }
    }
}

/// Builder for configuring an [`Agent`].
#[derive(Debug, Default)]
pub struct AgentBuilder {
    sensor: Option<Box<dyn Sensor>>,
    transport: Option<Box<dyn Transport>>,
    sample_interval: Option<Duration>,
    buffer_interval: Option<Duration>,
    transmit_interval: Option<Duration>,
    transmit_timeout: Option<Duration>,
    sample_timeout: Option<Duration>,
    thresholds: Option<Thresholds>,
    capacity: Option<usize>,
    agent_id: Option<String>,
    flush_on_shutdown: Option<bool>,
}

impl AgentBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sensor the sampler reads from. Required.
    pub fn sensor(mut self, sensor: impl Sensor + 'static) -> Self {
        self.sensor = Some(Box::new(sensor));
        self
    }

    /// Set a boxed sensor, for when the concrete type is chosen at runtime.
    pub fn boxed_sensor(mut self, sensor: Box<dyn Sensor>) -> Self {
        self.sensor = Some(sensor);
        self
    }

    /// Set the transport the transmitter sends through. Required.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Set a boxed transport, for when the concrete type is chosen at runtime.
    pub fn boxed_transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// How often to sample. Defaults to 5 minutes.
    pub fn sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = Some(interval);
        self
    }

    /// How often to append the current level to the buffer. Defaults to 5 minutes.
    pub fn buffer_interval(mut self, interval: Duration) -> Self {
        self.buffer_interval = Some(interval);
        self
    }

    /// How often to send the buffer. Defaults to 5 minutes.
    pub fn transmit_interval(mut self, interval: Duration) -> Self {
        self.transmit_interval = Some(interval);
        self
    }

    /// Bound on a single send round-trip. Defaults to 30 seconds.
    pub fn transmit_timeout(mut self, timeout: Duration) -> Self {
        self.transmit_timeout = Some(timeout);
        self
    }

    /// Bound on a single sensor read. Defaults to the sample interval.
    ///
    /// A read that takes longer counts as a failed sample.
    pub fn sample_timeout(mut self, timeout: Duration) -> Self {
        self.sample_timeout = Some(timeout);
        self
    }

    /// Status thresholds for log lines and payload annotation.
    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    /// Cap the pending buffer, dropping the oldest entry when full.
    ///
    /// Unbounded if not set.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Identifier sent with every payload.
    pub fn agent_id(mut self, id: impl Into<String>) -> Self {
        self.agent_id = Some(id.into());
        self
    }

    /// Whether shutdown makes one last attempt to send what is pending.
    ///
    /// Defaults to `true`.
    pub fn flush_on_shutdown(mut self, flush: bool) -> Self {
        self.flush_on_shutdown = Some(flush);
        self
    }

    /// Build the agent, validating the configuration.
    pub fn build(self) -> Result<Agent, AgentError> {
        let sensor = self.sensor.ok_or(AgentError::MissingSensor)?;
        let transport = self.transport.ok_or(AgentError::MissingTransport)?;

        let sample_interval = non_zero("sample", self.sample_interval)?;
        let buffer_interval = non_zero("buffer", self.buffer_interval)?;
        let transmit_interval = non_zero("transmit", self.transmit_interval)?;
        let transmit_timeout = self.transmit_timeout.unwrap_or(DEFAULT_TRANSMIT_TIMEOUT);
        if transmit_timeout.is_zero() {
            return Err(AgentError::ZeroInterval("transmit timeout"));
        }
        let sample_timeout = self.sample_timeout.unwrap_or(sample_interval);
        if sample_timeout.is_zero() {
            return Err(AgentError::ZeroInterval("sample timeout"));
        }

        let thresholds = self.thresholds.unwrap_or_default();
        thresholds.validate()?;

        if self.capacity == Some(0) {
            return Err(AgentError::ZeroCapacity);
        }

        Ok(Agent {
            sensor,
            transport,
            state: Arc::new(SharedState::with_capacity(self.capacity)),
            stats: Arc::new(AgentStats::default()),
            sample_interval,
            buffer_interval,
            transmit_interval,
            transmit_timeout,
            sample_timeout,
            thresholds,
            agent_id: self
                .agent_id
                .unwrap_or_else(|| DEFAULT_AGENT_ID.to_string()),
            flush_on_shutdown: self.flush_on_shutdown.unwrap_or(true),
        })
    }
}

fn non_zero(name: &'static str, interval: Option<Duration>) -> Result<Duration, AgentError> {
    let interval = interval.unwrap_or(DEFAULT_INTERVAL);
    if interval.is_zero() {
        return Err(AgentError::ZeroInterval(name));
    }
    Ok(interval)
}

/// Handle to a running agent.
///
/// Call [`AgentHandle::shutdown`] to stop cleanly. Dropping the handle also
/// stops the loops after their current iteration, but nothing waits for them
/// and no final flush happens.
#[derive(Debug)]
pub struct AgentHandle {
    sampler: JoinHandle<Sampler>,
    writer: JoinHandle<BufferWriter>,
    transmitter: JoinHandle<Transmitter>,
    stop_tx: watch::Sender<bool>,
    state: Arc<SharedState>,
    stats: Arc<AgentStats>,
    flush_on_shutdown: bool,
}

impl AgentHandle {
    /// The shared state the loops operate on.
    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    /// Current counters and buffer size.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.collect(&self.state)
    }

    /// Stop all loops, wait for them, and optionally flush.
    ///
    /// Each loop finishes the iteration it is in (including an in-flight,
    /// timeout-bounded send) before exiting, so no batch is left half
    /// processed. Returns the final counters.
    pub async fn shutdown(self) -> Result<StatsSnapshot, AgentError> {
        let _ = self.stop_tx.send(true);

        let (sampler, writer, transmitter) =
            tokio::join!(self.sampler, self.writer, self.transmitter);
        join_result("sampler", sampler)?;
        join_result("writer", writer)?;
        let mut transmitter = join_result("transmitter", transmitter)?;

        if self.flush_on_shutdown {
            match transmitter.run_cycle().await {
                CycleOutcome::Skipped => {}
                CycleOutcome::Sent { entries, .. } => {
                    info!(
                        "flushed {} readings via {} on shutdown",
                        entries,
                        transmitter.description()
                    );
                }
                CycleOutcome::Failed(e) => {
                    warn!(
                        "final flush failed, {} readings not delivered: {}",
                        self.state.pending_len(),
                        e
                    );
                }
            }
        }

        let stats = self.stats.collect(&self.state);
        info!("agent stopped ({} pending)", stats.pending);
        Ok(stats)
    }
}

fn join_result<T>(
    activity: &'static str,
    result: Result<T, tokio::task::JoinError>,
) -> Result<T, AgentError> {
    result.map_err(|e| AgentError::Join {
        activity,
        reason: e.to_string(),
    })
}
