//! File-backed sensor.
//!
//! Reads a level exported as text by a driver or another process, the way
//! many embedded Linux drivers expose values under `/sys` or `/run`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use levelwatch_types::{Level, Reading};

use super::Sensor;
use crate::error::SensorError;

/// A sensor that reads an integer percentage from a text file.
///
/// Surrounding whitespace and a trailing `%` are ignored.
#[derive(Debug)]
pub struct FileSensor {
    path: PathBuf,
    description: String,
}

impl FileSensor {
    /// Create a sensor reading from `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self { path, description }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Sensor for FileSensor {
    async fn sample(&mut self) -> Result<Reading, SensorError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let raw = content.trim().trim_end_matches('%').trim();
        let percent: u8 = raw
            .parse()
            .map_err(|e| SensorError::Parse(format!("{:?}: {}", raw, e)))?;

        Ok(Reading::now(Level::new(percent)?))
    }

    fn description(&self) -> &str {
        &self.description
    }
}
