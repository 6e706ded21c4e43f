//! Transport abstraction for delivering batches to the monitoring server.
//!
//! The transmitter owns exactly one transport. A transport reports success
//! only once the receiver has confirmed the whole payload; anything else is a
//! failure and leaves the pending buffer untouched.
//!
//! Delivery is at-least-once. If a confirmation is lost the same entries are
//! sent again on the next cycle, so receivers must deduplicate on `seq`.

mod channel;
mod file;
mod tcp;

pub use channel::ChannelTransport;
pub use file::FileTransport;
pub use tcp::{Ack, TcpTransport};

use std::fmt::Debug;

use async_trait::async_trait;
use levelwatch_types::BatchPayload;

use crate::error::TransmitError;

/// Destination for batch payloads.
///
/// The transmitter bounds every call with its configured timeout, so
/// implementations need not enforce one themselves.
#[async_trait]
pub trait Transport: Send + Debug {
    /// Deliver one payload and wait for confirmation.
    async fn transmit(&mut self, payload: &BatchPayload) -> Result<(), TransmitError>;

    /// Returns a human-readable description of the destination.
    fn description(&self) -> &str;
}
