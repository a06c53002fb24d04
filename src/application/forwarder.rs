//! Forwarder
//!
//! Reads a persisted output document and sends each token address to a
//! notifier, one message per token, spaced by the rate limiter.

use std::sync::Arc;
use std::time::Duration;

use super::rate_limiter::MinIntervalLimiter;
use crate::ports::{Clock, DocumentReader, Notifier, SinkError};

/// Outcome of a forwarding run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForwardReport {
    pub attempted: usize,
    pub sent: usize,
    pub failed: Vec<String>,
}

impl ForwardReport {
    pub fn all_sent(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Forwarder {
    notifier: Arc<dyn Notifier>,
    limiter: MinIntervalLimiter,
}

impl Forwarder {
    pub fn new(notifier: Arc<dyn Notifier>, clock: Arc<dyn Clock>, min_interval: Duration) -> Self {
        Self {
            notifier,
            limiter: MinIntervalLimiter::new(clock, min_interval),
        }
    }

    /// Read the document and forward every address in document order.
    ///
    /// A read failure is returned; individual send failures are logged and
    /// the loop continues.
    pub async fn forward(&mut self, reader: &dyn DocumentReader) -> Result<ForwardReport, SinkError> {
        let document = reader.read().await?;
        let addresses: Vec<String> = document.addresses().map(str::to_owned).collect();
        Ok(self.forward_addresses(&addresses).await)
    }

    pub async fn forward_addresses(&mut self, addresses: &[String]) -> ForwardReport {
        let mut report = ForwardReport::default();

        if addresses.is_empty() {
            tracing::info!("No tokens to forward");
            return report;
        }

        tracing::info!(
            "Forwarding {} tokens via {} (min interval {:?})",
            addresses.len(),
            self.notifier.name(),
            self.limiter.min_interval()
        );

        for address in addresses {
            self.limiter.acquire().await;
            report.attempted += 1;

            match self.notifier.send(address).await {
                Ok(()) => {
                    tracing::info!("Sent {}", address);
                    report.sent += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to send {}: {}", address, e);
                    report.failed.push(address.clone());
                }
            }
        }

        tracing::info!(
            "Forwarded {}/{} tokens via {}",
            report.sent,
            report.attempted,
            self.notifier.name()
        );
        report
    }
}
