//! Market data source ports
//!
//! Discovery feeds produce candidate addresses; the detail endpoint returns
//! market snapshots for a batch of addresses.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{DetailRecord, DiscoverySource, TokenCandidate};

/// Source-level failure (`SourceUnavailable`)
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("{endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Rate limited by {0}")]
    RateLimited(String),
}

/// Candidate discovery feed
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiscoveryPort: Send + Sync {
    /// Fetch the current candidates of one feed, in feed order
    async fn fetch_candidates(
        &self,
        source: DiscoverySource,
    ) -> Result<Vec<TokenCandidate>, SourceError>;
}

/// Market detail lookup
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DetailPort: Send + Sync {
    /// Largest batch the endpoint accepts in one request
    fn max_batch_size(&self) -> usize;

    /// Fetch detail records for one batch of addresses (one request)
    async fn fetch_details(&self, addresses: &[String]) -> Result<Vec<DetailRecord>, SourceError>;
}
