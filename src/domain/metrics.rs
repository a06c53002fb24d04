//! Metric Deriver
//!
//! Turns a raw `DetailRecord` into filter-ready `DerivedMetrics`.
//!
//! Defaulting rules:
//! - missing or non-finite numeric fields become 0 before any arithmetic
//! - missing/zero pair creation time gives an age of +inf
//! - zero liquidity gives a volume/liquidity ratio of +inf
//! - a zero H6 baseline gives the `ZeroBaseline` policy value for H1/H6 ratios

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::token::{DetailRecord, TxnCount};

/// Policy for H1/H6 ratios when the H6 baseline is zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroBaseline {
    /// Ratio is 0.0, so any positive ratio floor rejects the record
    #[default]
    Fail,
    /// Ratio is +inf, so every ratio floor accepts the record
    Pass,
}

impl ZeroBaseline {
    /// Ratio value substituted for a zero denominator
    pub fn ratio(&self) -> f64 {
        match self {
            ZeroBaseline::Fail => 0.0,
            ZeroBaseline::Pass => f64::INFINITY,
        }
    }

    /// Divide, falling back to the policy value when `denominator <= 0`
    pub fn divide(&self, numerator: f64, denominator: f64) -> f64 {
        if denominator > 0.0 {
            numerator / denominator
        } else {
            self.ratio()
        }
    }
}

/// Filter-ready metrics for one record
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub liquidity_usd: f64,
    pub market_cap_usd: f64,
    pub txns_h1: f64,
    pub txns_h6: f64,
    pub volume_h1: f64,
    pub volume_h6: f64,
    pub volume_h24: f64,
    pub price_change_h1: f64,
    pub price_change_h6: f64,
    /// Minutes since pair creation, +inf when unknown
    pub age_minutes: f64,
    /// 24h volume over liquidity, +inf when liquidity is zero
    pub volume_liquidity_ratio: f64,
    pub txn_h1_to_h6_ratio: f64,
    pub volume_h1_to_h6_ratio: f64,
    pub discovery_weight: f64,
    /// Policy the ratios were derived with
    pub zero_baseline: ZeroBaseline,
}

impl DerivedMetrics {
    /// Derive metrics from a record at time `now`
    pub fn derive(
        record: &DetailRecord,
        discovery_weight: f64,
        now: DateTime<Utc>,
        zero_baseline: ZeroBaseline,
    ) -> Self {
        let liquidity_usd = non_negative(record.liquidity_usd);
        let txns_h1 = txn_total(record.transactions.h1);
        let txns_h6 = txn_total(record.transactions.h6);
        let volume_h1 = non_negative(record.volume_usd.h1);
        let volume_h6 = non_negative(record.volume_usd.h6);
        let volume_h24 = non_negative(record.volume_usd.h24);

        let volume_liquidity_ratio = if liquidity_usd > 0.0 {
            volume_h24 / liquidity_usd
        } else {
            f64::INFINITY
        };

        Self {
            liquidity_usd,
            market_cap_usd: non_negative(record.market_cap_usd),
            txns_h1,
            txns_h6,
            volume_h1,
            volume_h6,
            volume_h24,
            price_change_h1: finite_or_zero(record.price_change_percent.h1),
            price_change_h6: finite_or_zero(record.price_change_percent.h6),
            age_minutes: age_minutes(record.pair_created_at_millis, now),
            volume_liquidity_ratio,
            txn_h1_to_h6_ratio: zero_baseline.divide(txns_h1, txns_h6),
            volume_h1_to_h6_ratio: zero_baseline.divide(volume_h1, volume_h6),
            discovery_weight: non_negative(Some(discovery_weight)),
            zero_baseline,
        }
    }

    /// Age in minutes if the creation time was known
    pub fn known_age(&self) -> Option<f64> {
        self.age_minutes.is_finite().then_some(self.age_minutes)
    }
}

/// Minutes between pair creation and `now`; +inf for a missing or zero timestamp
pub fn age_minutes(created_at_millis: Option<i64>, now: DateTime<Utc>) -> f64 {
    match created_at_millis {
        Some(millis) if millis > 0 => {
            let now_secs = now.timestamp_millis() as f64 / 1000.0;
            (now_secs - millis as f64 / 1000.0) / 60.0
        }
        _ => f64::INFINITY,
    }
}

fn txn_total(count: Option<TxnCount>) -> f64 {
    let count = count.unwrap_or_default();
    count.buys.unwrap_or(0) as f64 + count.sells.unwrap_or(0) as f64
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn non_negative(value: Option<f64>) -> f64 {
    finite_or_zero(value).max(0.0)
}
