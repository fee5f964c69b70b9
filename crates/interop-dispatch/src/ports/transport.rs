//! Transport port: delivers JSON strings to the other side of the channel.

use async_trait::async_trait;

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("channel closed")]
    ChannelClosed,
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Sends one JSON message to the other side.
///
/// Assumed reliable and ordered per direction; nothing here orders messages
/// across the two directions.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, message: String) -> Result<(), TransportError>;
}
