//! DexScreener Client
//!
//! HTTP client for the public DexScreener API. Implements both market data
//! ports: the three discovery feeds and the batched token pairs lookup.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use super::types::{FeedResponse, PairsResponse};
use crate::domain::{DetailRecord, DiscoverySource, TokenCandidate};
use crate::ports::{DetailPort, DiscoveryPort, SourceError};

pub const DEXSCREENER_BASE_URL: &str = "https://api.dexscreener.com";

/// Documented maximum number of addresses per pairs request
pub const MAX_ADDRESSES_PER_REQUEST: usize = 30;

#[derive(Debug, Clone)]
pub struct DexScreenerConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    /// Base delay for backoff (milliseconds)
    pub retry_base_delay_ms: u64,
}

impl Default for DexScreenerConfig {
    fn default() -> Self {
        Self {
            base_url: DEXSCREENER_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_base_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DexScreenerClient {
    config: DexScreenerConfig,
    http: Client,
}

impl DexScreenerClient {
    pub fn new() -> Result<Self, SourceError> {
        Self::with_config(DexScreenerConfig::default())
    }

    pub fn with_config(config: DexScreenerConfig) -> Result<Self, SourceError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        Ok(Self { config, http })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Full URL of a discovery feed
    pub fn feed_url(&self, source: DiscoverySource) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            source.feed_path()
        )
    }

    /// Full URL of the pairs lookup for a batch of addresses
    pub fn pairs_url(&self, addresses: &[String]) -> String {
        format!(
            "{}/latest/dex/tokens/{}",
            self.config.base_url.trim_end_matches('/'),
            addresses.join(",")
        )
    }

    /// GET `url` and decode the body, retrying on 429 and 5xx
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        let mut last_error = None;
        let attempts = self.config.max_retries.max(1);

        for attempt in 0..attempts {
            let response = match self.http.get(url).send().await {
                Ok(response) => response,
                Err(e) => {
                    tracing::debug!("Request to {} failed: {}", url, e);
                    last_error = Some(SourceError::Transport(e.to_string()));
                    self.backoff(attempt, false).await;
                    continue;
                }
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                tracing::warn!(
                    "DexScreener rate limited (429) on {} (attempt {}/{})",
                    url,
                    attempt + 1,
                    attempts
                );
                last_error = Some(SourceError::RateLimited(url.to_string()));
                self.backoff(attempt, true).await;
                continue;
            }

            if status.is_server_error() {
                last_error = Some(SourceError::Status {
                    endpoint: url.to_string(),
                    status: status.as_u16(),
                });
                self.backoff(attempt, false).await;
                continue;
            }

            if !status.is_success() {
                return Err(SourceError::Status {
                    endpoint: url.to_string(),
                    status: status.as_u16(),
                });
            }

            return response
                .json::<T>()
                .await
                .map_err(|e| SourceError::Parse(format!("{}: {}", url, e)));
        }

        Err(last_error.unwrap_or_else(|| SourceError::Transport("max retries exceeded".into())))
    }

    async fn backoff(&self, attempt: u32, exponential: bool) {
        if attempt + 1 >= self.config.max_retries {
            return;
        }
        let millis = if exponential {
            self.config.retry_base_delay_ms * 2u64.pow(attempt + 1)
        } else {
            self.config.retry_base_delay_ms * (attempt as u64 + 1)
        };
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}

#[async_trait]
impl DiscoveryPort for DexScreenerClient {
    async fn fetch_candidates(
        &self,
        source: DiscoverySource,
    ) -> Result<Vec<TokenCandidate>, SourceError> {
        let url = self.feed_url(source);
        tracing::debug!("Fetching {} feed from {}", source, url);

        let response: FeedResponse = self.get_json(&url).await?;
        let entries = response.into_entries();
        let total = entries.len();

        let candidates: Vec<TokenCandidate> = entries
            .into_iter()
            .filter_map(|entry| entry.into_candidate(source))
            .collect();

        if candidates.len() < total {
            tracing::debug!(
                "Skipped {} {} entries without a token address",
                total - candidates.len(),
                source
            );
        }

        Ok(candidates)
    }
}

#[async_trait]
impl DetailPort for DexScreenerClient {
    fn max_batch_size(&self) -> usize {
        MAX_ADDRESSES_PER_REQUEST
    }

    async fn fetch_details(&self, addresses: &[String]) -> Result<Vec<DetailRecord>, SourceError> {
        if addresses.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.pairs_url(addresses);
        let response: PairsResponse = self.get_json(&url).await?;
        Ok(response.into_records())
    }
}
