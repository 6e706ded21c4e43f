//! HTTP uplink that POSTs each batch to an ingest endpoint.
//!
//! The batch is sent as a JSON [`BatchPayload`] body. Any 2xx response counts
//! as delivery. If the server answers with an `{"acked": n}` body, `n` must
//! cover the batch's high-water mark or the send is treated as failed.
//!
//! ## Example
//!
//! ```rust,no_run
//! use levelwatch_adapters::http::HttpTransport;
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = HttpTransport::builder()
//!     .url("http://monitor.local:8080/ingest")
//!     .timeout(Duration::from_secs(20))
//!     .build()?;
//! # let _ = transport;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use levelwatch_sdk::{Ack, TransmitError, Transport};
use levelwatch_types::BatchPayload;
use reqwest::Client;

use crate::AdapterError;

const DEFAULT_URL: &str = "http://localhost:8080/ingest";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport that delivers batches with an HTTP POST.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    url: String,
    description: String,
}

impl HttpTransport {
    /// Create a new builder for configuring the transport.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    /// The endpoint batches are posted to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST one payload and check the server's answer.
    pub async fn post(&self, payload: &BatchPayload) -> Result<(), AdapterError> {
        let response = self.client.post(&self.url).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Http(format!("server returned status {}", status)));
        }

        let body = response.text().await?;
        check_ack(&body, payload.high_watermark)
    }
}

fn check_ack(body: &str, high_watermark: u64) -> Result<(), AdapterError> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(());
    }
    match serde_json::from_str::<Ack>(body) {
        Ok(ack) if ack.acked < high_watermark => Err(AdapterError::Unacknowledged(format!(
            "server acked up to #{}, batch ends at #{}",
            ack.acked, high_watermark
        ))),
        // Bodies that are not an ack are ignored; the status code decides.
        _ => Ok(()),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn transmit(&mut self, payload: &BatchPayload) -> Result<(), TransmitError> {
        self.post(payload).await.map_err(TransmitError::from)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for HttpTransport.
#[derive(Debug, Default)]
pub struct HttpTransportBuilder {
    url: Option<String>,
    timeout: Option<Duration>,
}

impl HttpTransportBuilder {
    /// Set the ingest endpoint (e.g., "http://monitor.local:8080/ingest").
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the per-request timeout (default: 30 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the transport.
    pub fn build(self) -> Result<HttpTransport, AdapterError> {
        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;

        let url = self.url.unwrap_or_else(|| DEFAULT_URL.to_string());
        Ok(HttpTransport {
            client,
            description: format!("http {}", url),
            url,
        })
    }
}
