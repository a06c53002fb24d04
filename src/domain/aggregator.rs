//! Address Aggregator
//!
//! Merges candidate lists from one or more discovery feeds into a single
//! address sequence. The first observation of an address wins: its weight
//! and source are kept, later duplicates are dropped silently.

use std::collections::HashMap;

use super::token::{DiscoverySource, TokenCandidate};

/// Deduplicated candidates in first-seen order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedCandidates {
    addresses: Vec<String>,
    weights: HashMap<String, f64>,
    sources: HashMap<String, DiscoverySource>,
}

impl AggregatedCandidates {
    /// Addresses in first-seen order
    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    /// First observed discovery weight for an address
    pub fn weight(&self, address: &str) -> Option<f64> {
        self.weights.get(address).copied()
    }

    /// Source an address was first observed on
    pub fn source(&self, address: &str) -> Option<DiscoverySource> {
        self.sources.get(address).copied()
    }

    pub fn contains(&self, address: &str) -> bool {
        self.weights.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// True when no feed produced a usable address (`NoCandidates`)
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Rebuild the candidate list in first-seen order
    pub fn candidates(&self) -> Vec<TokenCandidate> {
        self.addresses
            .iter()
            .map(|address| TokenCandidate {
                address: address.clone(),
                discovery_weight: self.weights[address],
                source: self.sources[address],
            })
            .collect()
    }
}

/// Merge candidate sequences, keeping the first weight seen per address
///
/// Sequences are visited in the order given; callers control tie-breaking by
/// ordering their sources. Empty addresses are skipped.
pub fn aggregate<'a, I>(sequences: I) -> AggregatedCandidates
where
    I: IntoIterator<Item = &'a [TokenCandidate]>,
{
    let mut merged = AggregatedCandidates::default();

    for sequence in sequences {
        for candidate in sequence {
            if candidate.address.is_empty() || merged.contains(&candidate.address) {
                continue;
            }
            merged.addresses.push(candidate.address.clone());
            merged
                .weights
                .insert(candidate.address.clone(), candidate.discovery_weight);
            merged
                .sources
                .insert(candidate.address.clone(), candidate.source);
        }
    }

    merged
}
