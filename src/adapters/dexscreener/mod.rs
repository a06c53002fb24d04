//! DexScreener Adapter
//!
//! Discovery feeds:
//! - `token-boosts/latest/v1`: latest boosted tokens
//! - `token-boosts/top/v1`: tokens with the most active boosts
//! - `token-profiles/latest/v1`: latest token profiles
//!
//! Details come from `latest/dex/tokens/{a,b,c}` with up to 30 addresses
//! per request.

mod client;
mod types;

pub use client::{
    DexScreenerClient, DexScreenerConfig, DEXSCREENER_BASE_URL, MAX_ADDRESSES_PER_REQUEST,
};
pub use types::{FeedEntry, FeedResponse, Pair, PairsResponse};
