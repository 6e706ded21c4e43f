//! Sensor abstraction for obtaining level readings.
//!
//! The sampler owns exactly one sensor and is the only caller of
//! [`Sensor::sample`]. How the reading is obtained (ADC, serial bus, a value
//! exported to a file, a random generator) is up to the implementation.

mod file;
mod simulated;

pub use file::FileSensor;
pub use simulated::SimulatedSensor;

use std::fmt::Debug;

use async_trait::async_trait;
use levelwatch_types::Reading;

use crate::error::SensorError;

/// Source of level readings.
///
/// # Example
///
/// ```rust
/// use levelwatch_sdk::{Sensor, SimulatedSensor};
///
/// # tokio_test::block_on(async {
/// let mut sensor = SimulatedSensor::with_seed(7);
/// let reading = sensor.sample().await.unwrap();
/// assert!(reading.level.percent() >= 1);
/// # });
/// ```
#[async_trait]
pub trait Sensor: Send + Debug {
    /// Take one sample.
    ///
    /// Failures are transient; the sampler skips the cycle and tries again
    /// on the next tick.
    async fn sample(&mut self) -> Result<Reading, SensorError>;

    /// Returns a human-readable description of the sensor.
    ///
    /// Used in startup logs.
    fn description(&self) -> &str;
}
