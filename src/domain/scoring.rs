//! Scorer & Ranker
//!
//! Weighted score over activity, size and momentum, then a total order:
//! score descending, address ascending on ties.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::metrics::DerivedMetrics;
use super::token::{DetailRecord, TokenCandidate};

fn default_txns_h1_weight() -> f64 {
    1.5
}
fn default_liquidity_weight() -> f64 {
    0.1
}
fn default_price_change_h1_weight() -> f64 {
    2.0
}

/// Score weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Reward per transaction in the last hour
    #[serde(default = "default_txns_h1_weight")]
    pub txns_h1_weight: f64,
    /// Reward per USD of liquidity
    #[serde(default = "default_liquidity_weight")]
    pub liquidity_weight: f64,
    /// Reward per percentage point of 1h price change
    #[serde(default = "default_price_change_h1_weight")]
    pub price_change_h1_weight: f64,
    /// Penalty per minute of pair age (0 disables; unknown ages are not penalised)
    #[serde(default)]
    pub age_penalty_weight: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            txns_h1_weight: default_txns_h1_weight(),
            liquidity_weight: default_liquidity_weight(),
            price_change_h1_weight: default_price_change_h1_weight(),
            age_penalty_weight: 0.0,
        }
    }
}

impl ScoreWeights {
    /// Score a metrics record
    pub fn score(&self, metrics: &DerivedMetrics) -> f64 {
        let mut score = self.txns_h1_weight * metrics.txns_h1
            + self.liquidity_weight * metrics.liquidity_usd
            + self.price_change_h1_weight * metrics.price_change_h1;

        if self.age_penalty_weight != 0.0 {
            if let Some(age) = metrics.known_age() {
                score -= self.age_penalty_weight * age;
            }
        }

        score
    }

    pub fn is_finite(&self) -> bool {
        self.txns_h1_weight.is_finite()
            && self.liquidity_weight.is_finite()
            && self.price_change_h1_weight.is_finite()
            && self.age_penalty_weight.is_finite()
    }
}

/// A record that passed its profile, with its score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: TokenCandidate,
    pub record: DetailRecord,
    pub metrics: DerivedMetrics,
    pub score: f64,
}

impl ScoredCandidate {
    pub fn new(
        candidate: TokenCandidate,
        record: DetailRecord,
        metrics: DerivedMetrics,
        weights: &ScoreWeights,
    ) -> Self {
        let score = weights.score(&metrics);
        Self {
            candidate,
            record,
            metrics,
            score,
        }
    }

    pub fn address(&self) -> &str {
        &self.candidate.address
    }
}

/// Ranking order: higher score first, then lexical address
pub fn compare(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.address().cmp(b.address()))
}

/// Sort candidates into ranking order
pub fn rank(mut scored: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    scored.sort_by(compare);
    scored
}

/// Rank and keep the first `n`
pub fn top_n(scored: Vec<ScoredCandidate>, n: usize) -> Vec<ScoredCandidate> {
    let mut ranked = rank(scored);
    ranked.truncate(n);
    ranked
}
