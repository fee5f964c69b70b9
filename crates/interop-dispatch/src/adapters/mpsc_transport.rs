//! In-process transport over an unbounded tokio mpsc channel.
//!
//! Used for tests and same-process wiring where both sides of the bridge
//! live in one runtime.

use crate::ports::transport::{Transport, TransportError};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Transport that pushes messages into an mpsc channel.
pub struct MpscTransport {
    sender: mpsc::UnboundedSender<String>,
}

impl MpscTransport {
    pub fn new(sender: mpsc::UnboundedSender<String>) -> Self {
        Self { sender }
    }

    /// Build a transport together with the receiving end.
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl Transport for MpscTransport {
    async fn send(&self, message: String) -> Result<(), TransportError> {
        self.sender
            .send(message)
            .map_err(|_| TransportError::ChannelClosed)
    }
}
