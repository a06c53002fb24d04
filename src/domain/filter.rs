//! Filter Engine
//!
//! Screening profiles are plain data: an ordered list of named predicates
//! over `DerivedMetrics`. A record passes a profile only when every
//! predicate holds. Swapping profiles never requires a code change.
//!
//! Bounds compare raw IEEE values, so a +inf sentinel fails every finite
//! upper bound. Lower bounds on sentinel fields (`age_minutes`,
//! `volume_liquidity_ratio`), including ratio floors with a sentinel
//! numerator, would accept the sentinel and are rejected by
//! `FilterCriteria::validate`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::metrics::{DerivedMetrics, ZeroBaseline};

/// Criteria validation errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CriteriaError {
    #[error("profile name cannot be empty")]
    EmptyName,

    #[error("profile '{profile}' criterion '{criterion}': {reason}")]
    InvalidCriterion {
        profile: String,
        criterion: String,
        reason: String,
    },
}

/// Metric a predicate reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
    LiquidityUsd,
    MarketCapUsd,
    TxnsH1,
    TxnsH6,
    VolumeH1,
    VolumeH6,
    VolumeH24,
    PriceChangeH1,
    PriceChangeH6,
    AgeMinutes,
    VolumeLiquidityRatio,
    TxnH1ToH6Ratio,
    VolumeH1ToH6Ratio,
    DiscoveryWeight,
}

impl MetricField {
    /// Read this field from a metrics record
    pub fn read(&self, metrics: &DerivedMetrics) -> f64 {
        match self {
            MetricField::LiquidityUsd => metrics.liquidity_usd,
            MetricField::MarketCapUsd => metrics.market_cap_usd,
            MetricField::TxnsH1 => metrics.txns_h1,
            MetricField::TxnsH6 => metrics.txns_h6,
            MetricField::VolumeH1 => metrics.volume_h1,
            MetricField::VolumeH6 => metrics.volume_h6,
            MetricField::VolumeH24 => metrics.volume_h24,
            MetricField::PriceChangeH1 => metrics.price_change_h1,
            MetricField::PriceChangeH6 => metrics.price_change_h6,
            MetricField::AgeMinutes => metrics.age_minutes,
            MetricField::VolumeLiquidityRatio => metrics.volume_liquidity_ratio,
            MetricField::TxnH1ToH6Ratio => metrics.txn_h1_to_h6_ratio,
            MetricField::VolumeH1ToH6Ratio => metrics.volume_h1_to_h6_ratio,
            MetricField::DiscoveryWeight => metrics.discovery_weight,
        }
    }

    /// Fields that carry a +inf sentinel for missing data
    pub fn is_sentineled(&self) -> bool {
        matches!(
            self,
            MetricField::AgeMinutes | MetricField::VolumeLiquidityRatio
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricField::LiquidityUsd => "liquidity_usd",
            MetricField::MarketCapUsd => "market_cap_usd",
            MetricField::TxnsH1 => "txns_h1",
            MetricField::TxnsH6 => "txns_h6",
            MetricField::VolumeH1 => "volume_h1",
            MetricField::VolumeH6 => "volume_h6",
            MetricField::VolumeH24 => "volume_h24",
            MetricField::PriceChangeH1 => "price_change_h1",
            MetricField::PriceChangeH6 => "price_change_h6",
            MetricField::AgeMinutes => "age_minutes",
            MetricField::VolumeLiquidityRatio => "volume_liquidity_ratio",
            MetricField::TxnH1ToH6Ratio => "txn_h1_to_h6_ratio",
            MetricField::VolumeH1ToH6Ratio => "volume_h1_to_h6_ratio",
            MetricField::DiscoveryWeight => "discovery_weight",
        }
    }
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single threshold test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// `min <= metric <= max`
    Range { metric: MetricField, min: f64, max: f64 },
    /// `metric >= min`
    MinOnly { metric: MetricField, min: f64 },
    /// `metric <= max`
    MaxOnly { metric: MetricField, max: f64 },
    /// `numerator / denominator >= floor`, zero denominators use the record's policy
    RatioFloor {
        numerator: MetricField,
        denominator: MetricField,
        floor: f64,
    },
}

impl Predicate {
    pub fn range(metric: MetricField, min: f64, max: f64) -> Self {
        Predicate::Range { metric, min, max }
    }

    pub fn min_only(metric: MetricField, min: f64) -> Self {
        Predicate::MinOnly { metric, min }
    }

    pub fn max_only(metric: MetricField, max: f64) -> Self {
        Predicate::MaxOnly { metric, max }
    }

    pub fn ratio_floor(numerator: MetricField, denominator: MetricField, floor: f64) -> Self {
        Predicate::RatioFloor {
            numerator,
            denominator,
            floor,
        }
    }

    /// Evaluate against a metrics record. Pure; no side effects.
    pub fn holds(&self, metrics: &DerivedMetrics) -> bool {
        match self {
            Predicate::Range { metric, min, max } => {
                let value = metric.read(metrics);
                *min <= value && value <= *max
            }
            Predicate::MinOnly { metric, min } => metric.read(metrics) >= *min,
            Predicate::MaxOnly { metric, max } => metric.read(metrics) <= *max,
            Predicate::RatioFloor {
                numerator,
                denominator,
                floor,
            } => {
                let ratio = metrics
                    .zero_baseline
                    .divide(numerator.read(metrics), denominator.read(metrics));
                ratio >= *floor
            }
        }
    }

    fn check(&self) -> Result<(), String> {
        match self {
            Predicate::Range { metric, min, max } => {
                if min.is_nan() || max.is_nan() {
                    return Err("bounds cannot be NaN".into());
                }
                if min > max {
                    return Err(format!("min {} exceeds max {}", min, max));
                }
                if metric.is_sentineled() && *max == f64::INFINITY {
                    return Err(format!("open range on {} would accept the +inf sentinel", metric));
                }
                Ok(())
            }
            Predicate::MinOnly { metric, min } => {
                if min.is_nan() {
                    return Err("min cannot be NaN".into());
                }
                if metric.is_sentineled() {
                    return Err(format!(
                        "min_only on {} would accept the +inf sentinel; use range",
                        metric
                    ));
                }
                Ok(())
            }
            Predicate::MaxOnly { max, .. } => {
                if max.is_nan() {
                    return Err("max cannot be NaN".into());
                }
                Ok(())
            }
            Predicate::RatioFloor {
                numerator, floor, ..
            } => {
                if !floor.is_finite() {
                    return Err("floor must be finite".into());
                }
                if numerator.is_sentineled() {
                    return Err(format!(
                        "ratio_floor over {} would accept the +inf sentinel",
                        numerator
                    ));
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Range { metric, min, max } => write!(f, "{} in [{}, {}]", metric, min, max),
            Predicate::MinOnly { metric, min } => write!(f, "{} >= {}", metric, min),
            Predicate::MaxOnly { metric, max } => write!(f, "{} <= {}", metric, max),
            Predicate::RatioFloor {
                numerator,
                denominator,
                floor,
            } => write!(f, "{} / {} >= {}", numerator, denominator, floor),
        }
    }
}

/// A named predicate within a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub name: String,
    pub predicate: Predicate,
}

impl Criterion {
    pub fn new(name: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            name: name.into(),
            predicate,
        }
    }
}

/// A named screening profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Overrides the pipeline-wide zero-baseline policy for this profile
    #[serde(default)]
    pub zero_baseline: Option<ZeroBaseline>,
    #[serde(default)]
    pub criteria: Vec<Criterion>,
}

impl FilterCriteria {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            zero_baseline: None,
            criteria: Vec::new(),
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_zero_baseline(mut self, policy: ZeroBaseline) -> Self {
        self.zero_baseline = Some(policy);
        self
    }

    /// Append a named predicate
    pub fn require(mut self, name: &str, predicate: Predicate) -> Self {
        self.criteria.push(Criterion::new(name, predicate));
        self
    }

    /// True iff every predicate holds
    pub fn passes(&self, metrics: &DerivedMetrics) -> bool {
        self.criteria.iter().all(|c| c.predicate.holds(metrics))
    }

    /// First criterion in order that rejects the record
    pub fn first_failure(&self, metrics: &DerivedMetrics) -> Option<&Criterion> {
        self.criteria.iter().find(|c| !c.predicate.holds(metrics))
    }

    /// Policy to derive metrics with for this profile
    pub fn effective_zero_baseline(&self, default: ZeroBaseline) -> ZeroBaseline {
        self.zero_baseline.unwrap_or(default)
    }

    pub fn validate(&self) -> Result<(), CriteriaError> {
        if self.name.trim().is_empty() {
            return Err(CriteriaError::EmptyName);
        }
        for criterion in &self.criteria {
            criterion
                .predicate
                .check()
                .map_err(|reason| CriteriaError::InvalidCriterion {
                    profile: self.name.clone(),
                    criterion: criterion.name.clone(),
                    reason,
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::token::{DetailRecord, TxnCount};
    use chrono::{TimeZone, Utc};

    fn scenario_metrics(liquidity: f64) -> DerivedMetrics {
        let now = Utc.with_ymd_and_hms(2024, 12, 1, 12, 0, 0).unwrap();
        let record = DetailRecord::new("scenario")
            .with_liquidity(liquidity)
            .with_market_cap(50_000.0)
            .with_txns(TxnCount::new(20, 10), TxnCount::new(40, 20))
            .with_price_change(5.0, 0.0)
            .with_volume(1_000.0, 3_000.0, 20_000.0);
        DerivedMetrics::derive(&record, 0.0, now, ZeroBaseline::Fail)
    }

    fn scenario_criteria() -> FilterCriteria {
        FilterCriteria::new("scenario")
            .require("liquidity", Predicate::min_only(MetricField::LiquidityUsd, 5_000.0))
            .require("market_cap", Predicate::min_only(MetricField::MarketCapUsd, 25_000.0))
            .require("activity", Predicate::min_only(MetricField::TxnsH1, 20.0))
            .require(
                "txn_momentum",
                Predicate::ratio_floor(MetricField::TxnsH1, MetricField::TxnsH6, 0.25),
            )
            .require("price_change", Predicate::range(MetricField::PriceChangeH1, 0.0, 50.0))
            .require(
                "over_traded",
                Predicate::max_only(MetricField::VolumeLiquidityRatio, 7.0),
            )
    }

    #[test]
    fn test_scenario_record_passes() {
        let criteria = scenario_criteria();
        assert!(criteria.validate().is_ok());
        assert!(criteria.passes(&scenario_metrics(10_000.0)));
        assert!(criteria.first_failure(&scenario_metrics(10_000.0)).is_none());
    }

    #[test]
    fn test_zero_liquidity_fails_ratio_cap() {
        let metrics = scenario_metrics(0.0);
        let cap = Predicate::max_only(MetricField::VolumeLiquidityRatio, 7.0);
        assert!(!cap.holds(&metrics));

        let criteria = FilterCriteria::new("cap_only").require("cap", cap);
        assert!(!criteria.passes(&metrics));
    }

    #[test]
    fn test_first_failure_reports_in_order() {
        let metrics = scenario_metrics(1_000.0);
        let failed = scenario_criteria().first_failure(&metrics).cloned().unwrap();
        assert_eq!(failed.name, "liquidity");
    }

    #[test]
    fn test_range_is_inclusive() {
        let metrics = scenario_metrics(10_000.0);
        assert!(Predicate::range(MetricField::PriceChangeH1, 5.0, 5.0).holds(&metrics));
        assert!(Predicate::min_only(MetricField::TxnsH1, 30.0).holds(&metrics));
        assert!(Predicate::max_only(MetricField::TxnsH1, 30.0).holds(&metrics));
        assert!(!Predicate::max_only(MetricField::TxnsH1, 29.0).holds(&metrics));
    }

    #[test]
    fn test_ratio_floor_zero_denominator_follows_policy() {
        let mut metrics = scenario_metrics(10_000.0);
        metrics.txns_h6 = 0.0;
        let floor = Predicate::ratio_floor(MetricField::TxnsH1, MetricField::TxnsH6, 0.25);

        metrics.zero_baseline = ZeroBaseline::Fail;
        assert!(!floor.holds(&metrics));

        metrics.zero_baseline = ZeroBaseline::Pass;
        assert!(floor.holds(&metrics));
    }

    #[test]
    fn test_unknown_age_fails_age_cap() {
        let metrics = scenario_metrics(10_000.0);
        assert!(metrics.age_minutes.is_infinite());
        assert!(!Predicate::max_only(MetricField::AgeMinutes, 60.0).holds(&metrics));
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let criteria = scenario_criteria();
        let metrics = scenario_metrics(10_000.0);
        let first = criteria.passes(&metrics);
        for _ in 0..10 {
            assert_eq!(criteria.passes(&metrics), first);
        }
    }

    #[test]
    fn test_empty_criteria_passes_everything() {
        let criteria = FilterCriteria::new("open");
        assert!(criteria.passes(&scenario_metrics(0.0)));
    }

    #[test]
    fn test_validation_rejects_bad_bounds() {
        let inverted = FilterCriteria::new("p")
            .require("bad", Predicate::range(MetricField::TxnsH1, 10.0, 1.0));
        assert!(matches!(
            inverted.validate(),
            Err(CriteriaError::InvalidCriterion { .. })
        ));

        let nan = FilterCriteria::new("p")
            .require("bad", Predicate::max_only(MetricField::TxnsH1, f64::NAN));
        assert!(nan.validate().is_err());

        let sentinel_floor = FilterCriteria::new("p")
            .require("bad", Predicate::min_only(MetricField::AgeMinutes, 5.0));
        assert!(sentinel_floor.validate().is_err());

        let sentinel_ratio = FilterCriteria::new("p").require(
            "turnover",
            Predicate::ratio_floor(MetricField::VolumeLiquidityRatio, MetricField::TxnsH1, 0.1),
        );
        assert!(matches!(
            sentinel_ratio.validate(),
            Err(CriteriaError::InvalidCriterion { .. })
        ));

        assert_eq!(
            FilterCriteria::new(" ").validate(),
            Err(CriteriaError::EmptyName)
        );
    }

    #[test]
    fn test_criteria_deserialize_from_toml() {
        let raw = r#"
name = "custom"
zero_baseline = "pass"

[[criteria]]
name = "liquidity"
predicate = { kind = "range", metric = "liquidity_usd", min = 5000, max = 200000 }

[[criteria]]
name = "momentum"
predicate = { kind = "ratio_floor", numerator = "volume_h1", denominator = "volume_h6", floor = 0.5 }
"#;
        let criteria: FilterCriteria = toml::from_str(raw).unwrap();
        assert_eq!(criteria.zero_baseline, Some(ZeroBaseline::Pass));
        assert_eq!(criteria.criteria.len(), 2);
        assert_eq!(
            criteria.criteria[0].predicate,
            Predicate::range(MetricField::LiquidityUsd, 5_000.0, 200_000.0)
        );
    }

    #[test]
    fn test_predicate_display() {
        let p = Predicate::ratio_floor(MetricField::TxnsH1, MetricField::TxnsH6, 0.25);
        assert_eq!(p.to_string(), "txns_h1 / txns_h6 >= 0.25");
    }
}
