//! Sampler: publishes the latest sensor reading as the current level.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use levelwatch_types::{Reading, Thresholds};
use tracing::{info, warn};

use crate::error::SensorError;
use crate::schedule::Activity;
use crate::sensor::Sensor;
use crate::state::SharedState;
use crate::stats::AgentStats;

#[derive(Debug)]
pub(crate) struct Sampler {
    sensor: Box<dyn Sensor>,
    state: Arc<SharedState>,
    stats: Arc<AgentStats>,
    thresholds: Thresholds,
    timeout: Duration,
}

impl Sampler {
    pub(crate) fn new(
        sensor: Box<dyn Sensor>,
        state: Arc<SharedState>,
        stats: Arc<AgentStats>,
        thresholds: Thresholds,
        timeout: Duration,
    ) -> Self {
        Self {
            sensor,
            state,
            stats,
            thresholds,
            timeout,
        }
    }

    /// Take one sample. On failure or timeout the previous current level
    /// stays visible.
    pub(crate) async fn sample_once(&mut self) -> Option<Reading> {
        let result = match tokio::time::timeout(self.timeout, self.sensor.sample()).await {
            Ok(result) => result,
            Err(_) => Err(SensorError::Timeout(self.timeout)),
        };

        match result {
            Ok(reading) => {
                self.state.set_current_level(reading);
                AgentStats::incr(&self.stats.samples_taken);
                info!(
                    activity = Self::NAME,
                    "level {} [{}]",
                    reading.level,
                    self.thresholds.classify(reading.level)
                );
                Some(reading)
            }
            Err(e) => {
                AgentStats::incr(&self.stats.sample_failures);
                warn!(activity = Self::NAME, "sample skipped: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl Activity for Sampler {
    const NAME: &'static str = "sampler";

    async fn tick(&mut self) {
        self.sample_once().await;
    }
}
