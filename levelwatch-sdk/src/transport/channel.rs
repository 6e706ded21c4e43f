//! In-process channel transport.
//!
//! Hands payloads to a tokio mpsc receiver. Useful for embedding the agent in
//! a larger process that owns the uplink, and for tests.

use async_trait::async_trait;
use levelwatch_types::BatchPayload;
use tokio::sync::mpsc;

use super::Transport;
use crate::error::TransmitError;

/// Delivers payloads through a bounded channel.
///
/// A full channel counts as a failed send, so a slow consumer causes retries
/// rather than unbounded queueing.
///
/// # Example
///
/// ```rust
/// use levelwatch_sdk::ChannelTransport;
///
/// let (transport, mut rx) = ChannelTransport::create(16);
///
/// // Later, receive payloads
/// // while let Some(payload) = rx.recv().await {
/// //     println!("got {} readings", payload.len());
/// // }
/// ```
#[derive(Debug)]
pub struct ChannelTransport {
    sender: mpsc::Sender<BatchPayload>,
}

impl ChannelTransport {
    /// Wrap an existing sender.
    pub fn new(sender: mpsc::Sender<BatchPayload>) -> Self {
        Self { sender }
    }

    /// Create a channel pair and return both the transport and receiver.
    pub fn create(buffer: usize) -> (Self, mpsc::Receiver<BatchPayload>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn transmit(&mut self, payload: &BatchPayload) -> Result<(), TransmitError> {
        self.sender
            .try_send(payload.clone())
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => TransmitError::ChannelFull,
                mpsc::error::TrySendError::Closed(_) => TransmitError::ChannelClosed,
            })
    }

    fn description(&self) -> &str {
        "channel"
    }
}
