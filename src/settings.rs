//! Layered agent configuration.
//!
//! Sources, lowest to highest precedence:
//!
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. `LEVELWATCH_*` environment variables, with `__` between nested keys
//!    (`LEVELWATCH_INTERVALS__SAMPLE=30s`)
//! 4. command-line overrides

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use levelwatch_sdk::{
    Agent, FileSensor, FileTransport, Sensor, SimulatedSensor, TcpTransport, Transport,
    DEFAULT_AGENT_ID, DEFAULT_INTERVAL, DEFAULT_TRANSMIT_TIMEOUT,
};
use levelwatch_types::Thresholds;
use serde::{Deserialize, Serialize};

use crate::duration::serde_str;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "LEVELWATCH";

/// Default address of the monitoring server.
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:7400";

/// Fully resolved agent settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub agent_id: String,
    pub flush_on_shutdown: bool,
    /// Maximum pending readings; omitted means unbounded.
    pub capacity: Option<usize>,
    pub intervals: Intervals,
    pub thresholds: Thresholds,
    pub sensor: SensorSettings,
    pub transport: TransportSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            agent_id: DEFAULT_AGENT_ID.to_string(),
            flush_on_shutdown: true,
            capacity: None,
            intervals: Intervals::default(),
            thresholds: Thresholds::default(),
            sensor: SensorSettings::default(),
            transport: TransportSettings::default(),
        }
    }
}

/// Loop periods and the network deadline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Intervals {
    #[serde(with = "serde_str")]
    pub sample: Duration,
    #[serde(with = "serde_str")]
    pub buffer: Duration,
    #[serde(with = "serde_str")]
    pub transmit: Duration,
    #[serde(with = "serde_str")]
    pub transmit_timeout: Duration,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            sample: DEFAULT_INTERVAL,
            buffer: DEFAULT_INTERVAL,
            transmit: DEFAULT_INTERVAL,
            transmit_timeout: DEFAULT_TRANSMIT_TIMEOUT,
        }
    }
}

/// Where readings come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SensorSettings {
    /// Random levels, optionally seeded.
    Simulated {
        #[serde(default)]
        seed: Option<u64>,
        #[serde(default)]
        failure_rate: Option<f64>,
    },
    /// An integer percentage read from a file.
    File { path: PathBuf },
}

impl Default for SensorSettings {
    fn default() -> Self {
        SensorSettings::Simulated {
            seed: None,
            failure_rate: None,
        }
    }
}

/// Where batches go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TransportSettings {
    /// Newline-delimited JSON over TCP with an ack line back.
    Tcp { address: String },
    /// Append to a local NDJSON spool file.
    File { path: PathBuf },
    /// POST to an HTTP ingest endpoint.
    Http { url: String },
}

impl Default for TransportSettings {
    fn default() -> Self {
        TransportSettings::Tcp {
            address: DEFAULT_SERVER_ADDRESS.to_string(),
        }
    }
}

/// Values given on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub agent_id: Option<String>,
    pub sample_interval: Option<String>,
    pub buffer_interval: Option<String>,
    pub transmit_interval: Option<String>,
    pub transmit_timeout: Option<String>,
    pub capacity: Option<usize>,
    pub flush_on_shutdown: Option<bool>,
}

impl Settings {
    /// Load settings from the file (if any), the process environment and
    /// the given overrides.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        Self::load_with_env(path, overrides, None)
    }

    /// Like [`Settings::load`], but reads environment variables from `env`
    /// instead of the process when given.
    pub fn load_with_env(
        path: Option<&Path>,
        overrides: &Overrides,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        builder = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .set_override_option("agent_id", overrides.agent_id.clone())?
            .set_override_option("intervals.sample", overrides.sample_interval.clone())?
            .set_override_option("intervals.buffer", overrides.buffer_interval.clone())?
            .set_override_option("intervals.transmit", overrides.transmit_interval.clone())?
            .set_override_option(
                "intervals.transmit_timeout",
                overrides.transmit_timeout.clone(),
            )?
            .set_override_option("capacity", overrides.capacity.map(|c| c as i64))?
            .set_override_option("flush_on_shutdown", overrides.flush_on_shutdown)?;

        let settings: Settings = builder
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the agent could not run with.
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;

        if self.agent_id.trim().is_empty() {
            bail!("agent_id must not be empty");
        }
        if self.capacity == Some(0) {
            bail!("capacity must be at least 1 (omit it for an unbounded buffer)");
        }

        let intervals = [
            ("intervals.sample", self.intervals.sample),
            ("intervals.buffer", self.intervals.buffer),
            ("intervals.transmit", self.intervals.transmit),
            ("intervals.transmit_timeout", self.intervals.transmit_timeout),
        ];
        for (key, value) in intervals {
            if value.is_zero() {
                bail!("{} must be greater than zero", key);
            }
        }

        if let SensorSettings::Simulated {
            failure_rate: Some(rate),
            ..
        } = self.sensor
        {
            if !(0.0..=1.0).contains(&rate) {
                bail!("sensor.failure_rate must be between 0 and 1, got {}", rate);
            }
        }

        Ok(())
    }

    /// Build the configured sensor.
    pub fn sensor(&self) -> Box<dyn Sensor> {
        match &self.sensor {
            SensorSettings::Simulated { seed, failure_rate } => {
                let sensor = match seed {
                    Some(seed) => SimulatedSensor::with_seed(*seed),
                    None => SimulatedSensor::new(),
                };
                Box::new(sensor.failure_rate(failure_rate.unwrap_or(0.0)))
            }
            SensorSettings::File { path } => Box::new(FileSensor::new(path)),
        }
    }

    /// Build the configured transport.
    pub fn transport(&self) -> Result<Box<dyn Transport>> {
        match &self.transport {
            TransportSettings::Tcp { address } => Ok(Box::new(TcpTransport::new(address.clone()))),
            TransportSettings::File { path } => Ok(Box::new(FileTransport::new(path))),
            TransportSettings::Http { url } => self.http_transport(url),
        }
    }

    #[cfg(feature = "http")]
    fn http_transport(&self, url: &str) -> Result<Box<dyn Transport>> {
        use levelwatch_adapters::http::HttpTransport;

        let transport = HttpTransport::builder()
            .url(url)
            .timeout(self.intervals.transmit_timeout)
            .build()?;
        Ok(Box::new(transport))
    }

    #[cfg(not(feature = "http"))]
    fn http_transport(&self, url: &str) -> Result<Box<dyn Transport>> {
        bail!("transport.kind = \"http\" ({}) requires the http feature", url)
    }

    /// Build an agent from these settings.
    pub fn build_agent(&self) -> Result<Agent> {
        let mut builder = Agent::builder()
            .boxed_sensor(self.sensor())
            .boxed_transport(self.transport()?)
            .sample_interval(self.intervals.sample)
            .buffer_interval(self.intervals.buffer)
            .transmit_interval(self.intervals.transmit)
            .transmit_timeout(self.intervals.transmit_timeout)
            .thresholds(self.thresholds)
            .agent_id(self.agent_id.clone())
            .flush_on_shutdown(self.flush_on_shutdown);

        if let Some(capacity) = self.capacity {
            builder = builder.capacity(capacity);
        }

        Ok(builder.build()?)
    }
}
