//! Built-in screening profiles
//!
//! Each profile is a `FilterCriteria` value. Config files may replace any of
//! these by name or add new ones.

use super::filter::{FilterCriteria, MetricField, Predicate};

pub const LATEST_BOOSTED: &str = "latest_boosted";
pub const MOST_BOOSTED: &str = "most_boosted";
pub const NEW_TOKENS: &str = "new_tokens";
pub const EARLY_MOMENTUM: &str = "early_momentum";
pub const ESTABLISHED_BOOST: &str = "established_boost";
pub const FRESH_LAUNCH: &str = "fresh_launch";

/// Recently boosted tokens with real activity that have not already run
pub fn latest_boosted() -> FilterCriteria {
    FilterCriteria::new(LATEST_BOOSTED)
        .describe("Recently boosted tokens with early activity")
        .require("min_liquidity", Predicate::min_only(MetricField::LiquidityUsd, 5_000.0))
        .require("min_txns_h1", Predicate::min_only(MetricField::TxnsH1, 20.0))
        .require("max_price_change_h1", Predicate::max_only(MetricField::PriceChangeH1, 50.0))
}

/// Heavily boosted tokens with sustained trading
pub fn most_boosted() -> FilterCriteria {
    FilterCriteria::new(MOST_BOOSTED)
        .describe("Most boosted tokens with sustained trading")
        .require("min_liquidity", Predicate::min_only(MetricField::LiquidityUsd, 10_000.0))
        .require("min_txns_h1", Predicate::min_only(MetricField::TxnsH1, 50.0))
}

/// Pairs created within the last hour
pub fn new_tokens() -> FilterCriteria {
    FilterCriteria::new(NEW_TOKENS)
        .describe("Pairs younger than an hour that are not yet overheated")
        .require("min_liquidity", Predicate::min_only(MetricField::LiquidityUsd, 5_000.0))
        .require("max_txns_h1", Predicate::max_only(MetricField::TxnsH1, 1_000.0))
        .require("max_age", Predicate::max_only(MetricField::AgeMinutes, 60.0))
}

/// Day-trade screen: early movers with accelerating activity
pub fn early_momentum() -> FilterCriteria {
    FilterCriteria::new(EARLY_MOMENTUM)
        .describe("Early movers with accelerating activity, not over-traded")
        .require("min_liquidity", Predicate::min_only(MetricField::LiquidityUsd, 5_000.0))
        .require("min_market_cap", Predicate::min_only(MetricField::MarketCapUsd, 25_000.0))
        .require("min_txns_h1", Predicate::min_only(MetricField::TxnsH1, 20.0))
        .require(
            "txn_momentum",
            Predicate::ratio_floor(MetricField::TxnsH1, MetricField::TxnsH6, 0.25),
        )
        .require(
            "volume_momentum",
            Predicate::ratio_floor(MetricField::VolumeH1, MetricField::VolumeH6, 0.25),
        )
        .require("price_change_h1", Predicate::range(MetricField::PriceChangeH1, 0.0, 50.0))
        .require(
            "max_volume_liquidity",
            Predicate::max_only(MetricField::VolumeLiquidityRatio, 7.0),
        )
        .require("boost_active", Predicate::min_only(MetricField::DiscoveryWeight, 0.0))
}

/// Established boosted tokens whose recent volume holds up
pub fn established_boost() -> FilterCriteria {
    FilterCriteria::new(ESTABLISHED_BOOST)
        .describe("Larger boosted tokens whose recent volume remains significant")
        .require("min_liquidity", Predicate::min_only(MetricField::LiquidityUsd, 10_000.0))
        .require("min_market_cap", Predicate::min_only(MetricField::MarketCapUsd, 50_000.0))
        .require("min_txns_h1", Predicate::min_only(MetricField::TxnsH1, 50.0))
        .require(
            "volume_momentum",
            Predicate::ratio_floor(MetricField::VolumeH1, MetricField::VolumeH6, 0.5),
        )
        .require(
            "max_volume_liquidity",
            Predicate::max_only(MetricField::VolumeLiquidityRatio, 100.0),
        )
        .require("boost_active", Predicate::min_only(MetricField::DiscoveryWeight, 0.0))
}

/// Very young pairs with early but not excessive activity
pub fn fresh_launch() -> FilterCriteria {
    FilterCriteria::new(FRESH_LAUNCH)
        .describe("Pairs under 15 minutes old with early, moderate activity")
        .require("liquidity", Predicate::range(MetricField::LiquidityUsd, 5_000.0, 200_000.0))
        .require("txns_h1", Predicate::range(MetricField::TxnsH1, 5.0, 200.0))
        .require("price_change_h1", Predicate::range(MetricField::PriceChangeH1, -10.0, 50.0))
        .require(
            "max_volume_liquidity",
            Predicate::max_only(MetricField::VolumeLiquidityRatio, 10.0),
        )
        .require("max_age", Predicate::max_only(MetricField::AgeMinutes, 15.0))
}

/// All built-in profiles
pub fn builtin() -> Vec<FilterCriteria> {
    vec![
        latest_boosted(),
        most_boosted(),
        new_tokens(),
        early_momentum(),
        established_boost(),
        fresh_launch(),
    ]
}

/// Merge overrides into the built-in set; same-name entries replace built-ins
pub fn merge_with_builtin(overrides: &[FilterCriteria]) -> Vec<FilterCriteria> {
    let mut profiles = builtin();
    for profile in overrides {
        match profiles.iter_mut().find(|p| p.name == profile.name) {
            Some(existing) => *existing = profile.clone(),
            None => profiles.push(profile.clone()),
        }
    }
    profiles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles_validate() {
        for profile in builtin() {
            assert!(profile.validate().is_ok(), "{} invalid", profile.name);
            assert!(!profile.criteria.is_empty());
        }
    }

    #[test]
    fn test_builtin_names_unique() {
        let profiles = builtin();
        let mut names: Vec<&str> = profiles.iter().map(|p| p.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), profiles.len());
    }

    #[test]
    fn test_merge_replaces_and_appends() {
        let replacement = FilterCriteria::new(MOST_BOOSTED)
            .require("liq", Predicate::min_only(MetricField::LiquidityUsd, 1.0));
        let custom = FilterCriteria::new("custom");

        let merged = merge_with_builtin(&[replacement.clone(), custom]);

        assert_eq!(merged.len(), builtin().len() + 1);
        let most = merged.iter().find(|p| p.name == MOST_BOOSTED).unwrap();
        assert_eq!(most, &replacement);
        assert_eq!(merged.last().unwrap().name, "custom");
    }
}
