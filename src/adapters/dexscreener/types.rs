//! DexScreener Types
//!
//! Wire shapes for the discovery feeds and the token pairs endpoint.
//! Every numeric field is optional; absent values are resolved later by the
//! metric deriver.

use serde::{Deserialize, Serialize};

use crate::domain::{
    DetailRecord, DiscoverySource, PriceChangeWindows, TokenCandidate, TxnCount, TxnWindows,
    VolumeWindows,
};

/// Active boost counter attached to boosted feed entries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoostInfo {
    #[serde(default)]
    pub active: Option<f64>,
}

/// One entry of a boost or profile feed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    #[serde(default)]
    pub token_address: Option<String>,
    #[serde(default)]
    pub chain_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub boosts: Option<BoostInfo>,
}

impl FeedEntry {
    /// Active boosts, zero when absent
    pub fn active_boosts(&self) -> f64 {
        self.boosts
            .as_ref()
            .and_then(|b| b.active)
            .unwrap_or(0.0)
    }

    /// Convert to a candidate; entries without an address yield None
    pub fn into_candidate(self, source: DiscoverySource) -> Option<TokenCandidate> {
        let weight = self.active_boosts();
        let address = self.token_address.filter(|a| !a.is_empty())?;
        Some(TokenCandidate::new(address, weight, source))
    }
}

/// Feeds normally return an array; a lone object is tolerated
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FeedResponse {
    Many(Vec<FeedEntry>),
    One(Box<FeedEntry>),
}

impl FeedResponse {
    pub fn into_entries(self) -> Vec<FeedEntry> {
        match self {
            FeedResponse::Many(entries) => entries,
            FeedResponse::One(entry) => vec![*entry],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaseToken {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Liquidity {
    #[serde(default)]
    pub usd: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TxnBucket {
    #[serde(default)]
    pub buys: Option<u64>,
    #[serde(default)]
    pub sells: Option<u64>,
}

impl From<TxnBucket> for TxnCount {
    fn from(bucket: TxnBucket) -> Self {
        TxnCount {
            buys: bucket.buys,
            sells: bucket.sells,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairTxns {
    #[serde(default)]
    pub h1: Option<TxnBucket>,
    #[serde(default)]
    pub h6: Option<TxnBucket>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairPriceChange {
    #[serde(default)]
    pub h1: Option<f64>,
    #[serde(default)]
    pub h6: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairVolume {
    #[serde(default)]
    pub h1: Option<f64>,
    #[serde(default)]
    pub h6: Option<f64>,
    #[serde(default)]
    pub h24: Option<f64>,
}

/// One trading pair from `latest/dex/tokens/{addresses}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pair {
    #[serde(default)]
    pub chain_id: Option<String>,
    #[serde(default)]
    pub pair_address: Option<String>,
    #[serde(default)]
    pub base_token: BaseToken,
    #[serde(default)]
    pub liquidity: Option<Liquidity>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub fdv: Option<f64>,
    /// Unix milliseconds
    #[serde(default)]
    pub pair_created_at: Option<i64>,
    #[serde(default)]
    pub txns: Option<PairTxns>,
    #[serde(default)]
    pub price_change: Option<PairPriceChange>,
    #[serde(default)]
    pub volume: Option<PairVolume>,
}

impl From<Pair> for DetailRecord {
    fn from(pair: Pair) -> Self {
        let txns = pair.txns.unwrap_or_default();
        let price = pair.price_change.unwrap_or_default();
        let volume = pair.volume.unwrap_or_default();

        DetailRecord {
            address: pair.base_token.address,
            name: pair.base_token.name,
            symbol: pair.base_token.symbol,
            liquidity_usd: pair.liquidity.and_then(|l| l.usd),
            market_cap_usd: pair.market_cap,
            pair_created_at_millis: pair.pair_created_at,
            transactions: TxnWindows {
                h1: txns.h1.map(TxnCount::from),
                h6: txns.h6.map(TxnCount::from),
            },
            price_change_percent: PriceChangeWindows {
                h1: price.h1,
                h6: price.h6,
            },
            volume_usd: VolumeWindows {
                h1: volume.h1,
                h6: volume.h6,
                h24: volume.h24,
            },
        }
    }
}

/// Response body of the token pairs endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PairsResponse {
    #[serde(default)]
    pub pairs: Option<Vec<Pair>>,
}

impl PairsResponse {
    pub fn into_records(self) -> Vec<DetailRecord> {
        self.pairs
            .unwrap_or_default()
            .into_iter()
            .map(DetailRecord::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boost_feed_entry() {
        let json = r#"[
            {"url": "https://dexscreener.com/solana/abc", "chainId": "solana",
             "tokenAddress": "AbC123", "boosts": {"active": 12}},
            {"chainId": "solana", "tokenAddress": "NoBoost"},
            {"chainId": "solana", "description": "missing address"}
        ]"#;

        let entries = serde_json::from_str::<FeedResponse>(json).unwrap().into_entries();
        assert_eq!(entries.len(), 3);

        let candidates: Vec<TokenCandidate> = entries
            .into_iter()
            .filter_map(|e| e.into_candidate(DiscoverySource::LatestBoosted))
            .collect();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].address, "AbC123");
        assert_eq!(candidates[0].discovery_weight, 12.0);
        assert_eq!(candidates[1].discovery_weight, 0.0);
    }

    #[test]
    fn test_single_object_feed() {
        let json = r#"{"tokenAddress": "Solo", "boosts": {"active": 3}}"#;
        let entries = serde_json::from_str::<FeedResponse>(json).unwrap().into_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].active_boosts(), 3.0);
    }

    #[test]
    fn test_pair_maps_to_detail_record() {
        let json = r#"{
            "schemaVersion": "1.0.0",
            "pairs": [{
                "chainId": "solana",
                "pairAddress": "Pair1",
                "baseToken": {"address": "Mint1", "name": "Doge Two", "symbol": "DOGE2"},
                "liquidity": {"usd": 52000.5, "base": 1, "quote": 2},
                "marketCap": 250000,
                "fdv": 260000,
                "pairCreatedAt": 1733050800000,
                "txns": {"h1": {"buys": 40, "sells": 25}, "h6": {"buys": 100, "sells": 90}},
                "priceChange": {"h1": 4.5, "h6": -2.1},
                "volume": {"h1": 12000, "h6": 40000, "h24": 90000}
            }]
        }"#;

        let records = serde_json::from_str::<PairsResponse>(json).unwrap().into_records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.address, "Mint1");
        assert_eq!(record.symbol.as_deref(), Some("DOGE2"));
        assert_eq!(record.liquidity_usd, Some(52000.5));
        assert_eq!(record.market_cap_usd, Some(250000.0));
        assert_eq!(record.pair_created_at_millis, Some(1_733_050_800_000));
        assert_eq!(record.transactions.h1, Some(TxnCount::new(40, 25)));
        assert_eq!(record.price_change_percent.h6, Some(-2.1));
        assert_eq!(record.volume_usd.h24, Some(90000.0));
    }

    #[test]
    fn test_max_txn_counts_derive_without_overflow() {
        use crate::domain::{DerivedMetrics, ZeroBaseline};
        use chrono::{TimeZone, Utc};

        let json = r#"{"pairs":[{"baseToken":{"address":"A"},"txns":{"h1":{"buys":18446744073709551615,"sells":1}}}]}"#;
        let records = serde_json::from_str::<PairsResponse>(json).unwrap().into_records();
        let now = Utc.with_ymd_and_hms(2024, 12, 1, 12, 0, 0).unwrap();
        let metrics = DerivedMetrics::derive(&records[0], 0.0, now, ZeroBaseline::Fail);
        assert!(metrics.txns_h1.is_finite());
        assert_eq!(metrics.txns_h6, 0.0);
    }

    #[test]
    fn test_sparse_pair_and_null_pairs() {
        let json = r#"{"pairs": [{"baseToken": {"address": "Bare"}, "liquidity": null}]}"#;
        let records = serde_json::from_str::<PairsResponse>(json).unwrap().into_records();
        assert_eq!(records[0].address, "Bare");
        assert_eq!(records[0].liquidity_usd, None);
        assert_eq!(records[0].transactions.h1, None);

        let none = serde_json::from_str::<PairsResponse>(r#"{"pairs": null}"#).unwrap();
        assert!(none.into_records().is_empty());
    }
}
