//! Domain Layer - Core screening logic for the token hunter
//!
//! This module contains pure domain types and logic with no external dependencies.
//! All external interactions happen through the ports layer.
//!
//! ## Pipeline stages
//!
//! - `aggregator`: merge discovery feeds, first-seen weight wins
//! - `metrics`: derive filter-ready metrics with explicit defaults
//! - `filter`: evaluate named screening profiles
//! - `scoring`: weighted score and deterministic ranking
//! - `output`: merge ranked lists into the output document
//! - `profiles`: built-in screening profiles

pub mod token;
pub mod aggregator;
pub mod metrics;
pub mod filter;
pub mod scoring;
pub mod output;
pub mod profiles;

pub use token::{
    DetailRecord, DiscoverySource, PriceChangeWindows, TokenCandidate, TxnCount, TxnWindows,
    VolumeWindows,
};
pub use aggregator::{aggregate, AggregatedCandidates};
pub use metrics::{DerivedMetrics, ZeroBaseline};
pub use filter::{CriteriaError, Criterion, FilterCriteria, MetricField, Predicate};
pub use scoring::{rank, top_n, ScoreWeights, ScoredCandidate};
pub use output::{assemble, OutputDocument, RankedList, ResultAssembler, TokenSummary};
