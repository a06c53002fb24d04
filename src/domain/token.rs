//! Token Types
//!
//! Candidate identifiers produced by discovery feeds and the raw market
//! snapshot fetched for each candidate.
//!
//! `DetailRecord` keeps every numeric field optional: the detail endpoint
//! omits sub-objects freely, and the defaulting rules live in one place
//! (`domain::metrics`) instead of being scattered across consumers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discovery feed a candidate was first observed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoverySource {
    /// Tokens that most recently received a paid boost
    LatestBoosted,
    /// Tokens with the most active boosts
    MostBoosted,
    /// Tokens that most recently published a profile
    LatestProfiles,
}

impl DiscoverySource {
    pub const ALL: [DiscoverySource; 3] = [
        DiscoverySource::LatestBoosted,
        DiscoverySource::MostBoosted,
        DiscoverySource::LatestProfiles,
    ];

    /// Config / CLI name of this source
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoverySource::LatestBoosted => "latest_boosted",
            DiscoverySource::MostBoosted => "most_boosted",
            DiscoverySource::LatestProfiles => "latest_profiles",
        }
    }

    /// Endpoint path relative to the DexScreener base URL
    pub fn feed_path(&self) -> &'static str {
        match self {
            DiscoverySource::LatestBoosted => "token-boosts/latest/v1",
            DiscoverySource::MostBoosted => "token-boosts/top/v1",
            DiscoverySource::LatestProfiles => "token-profiles/latest/v1",
        }
    }
}

impl fmt::Display for DiscoverySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscoverySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiscoverySource::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| format!("unknown discovery source: {}", s))
    }
}

/// A candidate token address with its promotion weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenCandidate {
    /// Token address (unique key within a run)
    pub address: String,
    /// Source-supplied promotion weight (active boosts), never negative
    pub discovery_weight: f64,
    /// Feed this candidate came from
    pub source: DiscoverySource,
}

impl TokenCandidate {
    pub fn new(address: impl Into<String>, discovery_weight: f64, source: DiscoverySource) -> Self {
        let discovery_weight = if discovery_weight.is_finite() {
            discovery_weight.max(0.0)
        } else {
            0.0
        };
        Self {
            address: address.into(),
            discovery_weight,
            source,
        }
    }
}

/// Buy/sell counts for one trailing window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TxnCount {
    #[serde(default)]
    pub buys: Option<u64>,
    #[serde(default)]
    pub sells: Option<u64>,
}

impl TxnCount {
    pub fn new(buys: u64, sells: u64) -> Self {
        Self {
            buys: Some(buys),
            sells: Some(sells),
        }
    }
}

/// Transaction counts by trailing window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TxnWindows {
    #[serde(default)]
    pub h1: Option<TxnCount>,
    #[serde(default)]
    pub h6: Option<TxnCount>,
}

/// Price change percentages by trailing window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceChangeWindows {
    #[serde(default)]
    pub h1: Option<f64>,
    #[serde(default)]
    pub h6: Option<f64>,
}

/// Traded USD volume by trailing window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeWindows {
    #[serde(default)]
    pub h1: Option<f64>,
    #[serde(default)]
    pub h6: Option<f64>,
    #[serde(default)]
    pub h24: Option<f64>,
}

/// Raw market snapshot for one token address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailRecord {
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub liquidity_usd: Option<f64>,
    #[serde(default)]
    pub market_cap_usd: Option<f64>,
    /// Pair creation time, unix milliseconds
    #[serde(default)]
    pub pair_created_at_millis: Option<i64>,
    #[serde(default)]
    pub transactions: TxnWindows,
    #[serde(default)]
    pub price_change_percent: PriceChangeWindows,
    #[serde(default)]
    pub volume_usd: VolumeWindows,
}

impl DetailRecord {
    /// Create a record with only the address set
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn with_names(mut self, name: &str, symbol: &str) -> Self {
        self.name = Some(name.to_string());
        self.symbol = Some(symbol.to_string());
        self
    }

    pub fn with_liquidity(mut self, liquidity_usd: f64) -> Self {
        self.liquidity_usd = Some(liquidity_usd);
        self
    }

    pub fn with_market_cap(mut self, market_cap_usd: f64) -> Self {
        self.market_cap_usd = Some(market_cap_usd);
        self
    }

    pub fn with_created_at(mut self, millis: i64) -> Self {
        self.pair_created_at_millis = Some(millis);
        self
    }

    pub fn with_txns(mut self, h1: TxnCount, h6: TxnCount) -> Self {
        self.transactions = TxnWindows {
            h1: Some(h1),
            h6: Some(h6),
        };
        self
    }

    pub fn with_price_change(mut self, h1: f64, h6: f64) -> Self {
        self.price_change_percent = PriceChangeWindows {
            h1: Some(h1),
            h6: Some(h6),
        };
        self
    }

    pub fn with_volume(mut self, h1: f64, h6: f64, h24: f64) -> Self {
        self.volume_usd = VolumeWindows {
            h1: Some(h1),
            h6: Some(h6),
            h24: Some(h24),
        };
        self
    }

    /// Display label used in logs
    pub fn label(&self) -> String {
        match (&self.name, &self.symbol) {
            (Some(name), Some(symbol)) => format!("{} ({})", name, symbol),
            (Some(name), None) => name.clone(),
            (None, Some(symbol)) => symbol.clone(),
            (None, None) => self.address.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_round_trips_through_name() {
        for source in DiscoverySource::ALL {
            assert_eq!(source.as_str().parse::<DiscoverySource>().unwrap(), source);
        }
        assert!("trending".parse::<DiscoverySource>().is_err());
    }

    #[test]
    fn test_feed_paths() {
        assert_eq!(DiscoverySource::LatestBoosted.feed_path(), "token-boosts/latest/v1");
        assert_eq!(DiscoverySource::MostBoosted.feed_path(), "token-boosts/top/v1");
        assert_eq!(DiscoverySource::LatestProfiles.feed_path(), "token-profiles/latest/v1");
    }

    #[test]
    fn test_candidate_weight_clamped() {
        let candidate = TokenCandidate::new("addr", -3.0, DiscoverySource::MostBoosted);
        assert_eq!(candidate.discovery_weight, 0.0);

        let candidate = TokenCandidate::new("addr", f64::NAN, DiscoverySource::MostBoosted);
        assert_eq!(candidate.discovery_weight, 0.0);

        let candidate = TokenCandidate::new("addr", 40.0, DiscoverySource::MostBoosted);
        assert_eq!(candidate.discovery_weight, 40.0);
    }

    #[test]
    fn test_record_deserializes_with_missing_fields() {
        let record: DetailRecord = serde_json::from_str(r#"{"address": "abc"}"#).unwrap();
        assert_eq!(record.address, "abc");
        assert!(record.liquidity_usd.is_none());
        assert!(record.transactions.h1.is_none());
        assert!(record.volume_usd.h24.is_none());
    }

    #[test]
    fn test_record_label() {
        let record = DetailRecord::new("abc").with_names("Pepe", "PEPE");
        assert_eq!(record.label(), "Pepe (PEPE)");
        assert_eq!(DetailRecord::new("abc").label(), "abc");
    }
}
