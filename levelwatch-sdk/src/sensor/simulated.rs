//! Random sensor for bench testing without hardware.

use async_trait::async_trait;
use levelwatch_types::{Level, Reading};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Sensor;
use crate::error::SensorError;

/// A sensor that reports a uniformly random level in `1..=100`.
///
/// An optional failure rate makes some samples fail, which is handy for
/// exercising the skip-and-continue path end to end.
#[derive(Debug)]
pub struct SimulatedSensor {
    rng: StdRng,
    failure_rate: f64,
    description: String,
}

impl SimulatedSensor {
    /// Create a sensor seeded from the OS.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy(), "simulated".to_string())
    }

    /// Create a sensor with a fixed seed for reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(
            StdRng::seed_from_u64(seed),
            format!("simulated (seed {})", seed),
        )
    }

    fn from_rng(rng: StdRng, description: String) -> Self {
        Self {
            rng,
            failure_rate: 0.0,
            description,
        }
    }

    /// Fail this fraction of samples (clamped to `0.0..=1.0`).
    pub fn failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate.clamp(0.0, 1.0);
        self
    }
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Sensor for SimulatedSensor {
    async fn sample(&mut self) -> Result<Reading, SensorError> {
        if self.failure_rate > 0.0 && self.rng.gen_bool(self.failure_rate) {
            return Err(SensorError::Unavailable("simulated device error".to_string()));
        }

        let percent: u8 = self.rng.gen_range(1..=100);
        Ok(Reading::now(Level::new(percent)?))
    }

    fn description(&self) -> &str {
        &self.description
    }
}
