//! Error types for adapters.

use levelwatch_sdk::TransmitError;
use thiserror::Error;

/// Errors that can occur when delivering a batch through an adapter.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// HTTP request failed or the server answered with an error status.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to build or parse a message.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// The server did not confirm the whole batch.
    #[error("Batch not fully acknowledged: {0}")]
    Unacknowledged(String),
}

impl From<AdapterError> for TransmitError {
    fn from(err: AdapterError) -> Self {
        TransmitError::Adapter(Box::new(err))
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdapterError::Timeout
        } else if err.is_connect() {
            AdapterError::Connection(err.to_string())
        } else if err.is_decode() {
            AdapterError::Parse(err.to_string())
        } else {
            AdapterError::Http(err.to_string())
        }
    }
}
