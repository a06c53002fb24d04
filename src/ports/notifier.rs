//! Notification port used by the forwarder

use async_trait::async_trait;
use thiserror::Error;

/// Failure to deliver one message (`SendFailure`)
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Channel rejected message: {0}")]
    Rejected(String),

    #[error("Notifier not configured: {0}")]
    NotConfigured(String),
}

/// Outbound message channel
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name for logging
    fn name(&self) -> &str;

    /// Send one message
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}
