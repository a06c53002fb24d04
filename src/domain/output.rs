//! Result Assembler
//!
//! Merges per-category top-N lists into the output document. Order is the
//! order of first insertion across lists; an address already emitted by an
//! earlier list is dropped, same policy as the address aggregator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::scoring::ScoredCandidate;
use super::token::DiscoverySource;

/// One selected token in the output document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSummary {
    #[serde(alias = "address")]
    pub token_address: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub source: Option<DiscoverySource>,
    /// Category whose ranking selected this token
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub liquidity_usd: f64,
    #[serde(default)]
    pub market_cap_usd: f64,
    #[serde(default)]
    pub transactions_last_hour: f64,
    #[serde(default)]
    pub price_change_h1: f64,
    /// None when liquidity was zero
    #[serde(default)]
    pub volume_liquidity_ratio: Option<f64>,
    /// None when the pair creation time was unknown
    #[serde(default)]
    pub pair_age_minutes: Option<f64>,
    #[serde(default)]
    pub boosts: f64,
    #[serde(default)]
    pub score: f64,
}

impl TokenSummary {
    pub fn from_scored(scored: &ScoredCandidate, category: Option<&str>) -> Self {
        let metrics = &scored.metrics;
        Self {
            token_address: scored.candidate.address.clone(),
            name: scored.record.name.clone(),
            symbol: scored.record.symbol.clone(),
            source: Some(scored.candidate.source),
            category: category.map(str::to_string),
            liquidity_usd: metrics.liquidity_usd,
            market_cap_usd: metrics.market_cap_usd,
            transactions_last_hour: metrics.txns_h1,
            price_change_h1: metrics.price_change_h1,
            volume_liquidity_ratio: metrics
                .volume_liquidity_ratio
                .is_finite()
                .then_some(metrics.volume_liquidity_ratio),
            pair_age_minutes: metrics.known_age(),
            boosts: metrics.discovery_weight,
            score: scored.score,
        }
    }
}

/// Timestamped run result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDocument {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub tokens: Vec<TokenSummary>,
}

impl OutputDocument {
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            tokens: Vec::new(),
        }
    }

    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|t| t.token_address.as_str())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// A ranked list tagged with the category that produced it
#[derive(Debug, Clone)]
pub struct RankedList {
    pub category: String,
    pub entries: Vec<ScoredCandidate>,
}

impl RankedList {
    pub fn new(category: impl Into<String>, entries: Vec<ScoredCandidate>) -> Self {
        Self {
            category: category.into(),
            entries,
        }
    }
}

/// Builds the output document from ranked lists
#[derive(Debug, Default)]
pub struct ResultAssembler {
    seen: HashSet<String>,
    tokens: Vec<TokenSummary>,
}

impl ResultAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a ranked list, skipping addresses already present
    pub fn push(&mut self, list: &RankedList) -> &mut Self {
        for scored in &list.entries {
            if self.seen.insert(scored.candidate.address.clone()) {
                self.tokens
                    .push(TokenSummary::from_scored(scored, Some(&list.category)));
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn finish(self, timestamp: DateTime<Utc>) -> OutputDocument {
        OutputDocument {
            timestamp,
            tokens: self.tokens,
        }
    }
}

/// Merge ranked lists into a document stamped with `timestamp`
pub fn assemble(lists: &[RankedList], timestamp: DateTime<Utc>) -> OutputDocument {
    let mut assembler = ResultAssembler::new();
    for list in lists {
        assembler.push(list);
    }
    assembler.finish(timestamp)
}
