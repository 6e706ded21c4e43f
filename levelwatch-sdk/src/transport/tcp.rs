//! TCP transport with explicit acknowledgement.
//!
//! Wire protocol, one exchange per connection:
//!
//! ```text
//! agent  -> server : <BatchPayload as JSON>\n
//! server -> agent  : {"acked": <high_watermark>}\n
//! ```

use async_trait::async_trait;
use levelwatch_types::BatchPayload;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use super::Transport;
use crate::error::TransmitError;

/// Acknowledgement line sent back by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    /// Highest sequence number the server has durably accepted.
    pub acked: u64,
}

/// Sends each payload as newline-delimited JSON over a fresh TCP connection.
#[derive(Debug)]
pub struct TcpTransport {
    addr: String,
    description: String,
}

impl TcpTransport {
    /// Create a transport for `host:port`.
    pub fn new(addr: impl Into<String>) -> Self {
        let addr = addr.into();
        let description = format!("tcp: {}", addr);
        Self { addr, description }
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn transmit(&mut self, payload: &BatchPayload) -> Result<(), TransmitError> {
        let mut stream = TcpStream::connect(&self.addr).await?;

        let mut line = serde_json::to_vec(payload)?;
        line.push(b'\n');
        stream.write_all(&line).await?;
        stream.flush().await?;

        let mut reader = BufReader::new(stream);
        let mut response = String::new();
        if reader.read_line(&mut response).await? == 0 {
            return Err(TransmitError::Rejected(
                "connection closed before acknowledgement".to_string(),
            ));
        }

        let ack: Ack = serde_json::from_str(response.trim())?;
        if ack.acked < payload.high_watermark {
            return Err(TransmitError::Rejected(format!(
                "acknowledged up to {} but sent up to {}",
                ack.acked, payload.high_watermark
            )));
        }
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}
