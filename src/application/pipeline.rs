//! Screening Pipeline
//!
//! One run: discovery -> aggregate -> batch detail fetch -> derive ->
//! filter -> score/rank -> top-N per category -> assemble. The output sink
//! is the only durable side effect and is called last.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::fetcher::{DetailBatchFetcher, FetchReport};
use crate::domain::{
    aggregate, assemble, top_n, AggregatedCandidates, DerivedMetrics, DetailRecord,
    DiscoverySource, FilterCriteria, OutputDocument, RankedList, ScoreWeights, ScoredCandidate,
    TokenCandidate, ZeroBaseline,
};
use crate::ports::{Clock, DetailPort, DiscoveryPort, OutputSink, SinkError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Output sink failed: {0}")]
    SinkFailure(#[from] SinkError),

    #[error("Invalid pipeline settings: {0}")]
    InvalidSettings(String),
}

/// One screening category: which feeds to read and how to screen them
#[derive(Debug, Clone)]
pub struct CategorySpec {
    pub name: String,
    /// Feeds in tie-break order
    pub sources: Vec<DiscoverySource>,
    pub profile: FilterCriteria,
    pub top_n: usize,
}

/// Settings fixed at pipeline construction
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub categories: Vec<CategorySpec>,
    pub weights: ScoreWeights,
    pub zero_baseline: ZeroBaseline,
    pub batch_size: usize,
}

impl PipelineSettings {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.categories.is_empty() {
            return Err(PipelineError::InvalidSettings(
                "at least one category is required".into(),
            ));
        }
        for category in &self.categories {
            if category.sources.is_empty() {
                return Err(PipelineError::InvalidSettings(format!(
                    "category '{}' has no sources",
                    category.name
                )));
            }
            if category.top_n == 0 {
                return Err(PipelineError::InvalidSettings(format!(
                    "category '{}' top_n must be > 0",
                    category.name
                )));
            }
            category
                .profile
                .validate()
                .map_err(|e| PipelineError::InvalidSettings(e.to_string()))?;
        }
        if !self.weights.is_finite() {
            return Err(PipelineError::InvalidSettings(
                "score weights must be finite".into(),
            ));
        }
        Ok(())
    }

    /// Every source used by any category, first use first
    pub fn source_order(&self) -> Vec<DiscoverySource> {
        let mut order = Vec::new();
        for category in &self.categories {
            for source in &category.sources {
                if !order.contains(source) {
                    order.push(*source);
                }
            }
        }
        order
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Details were fetched and screened (the document may still be empty)
    Completed,
    /// No feed produced a candidate
    NoCandidates,
    /// Candidates existed but no detail record came back
    NoData,
}

impl RunStatus {
    pub fn message(&self) -> &'static str {
        match self {
            RunStatus::Completed => "Screening completed",
            RunStatus::NoCandidates => "No token addresses found",
            RunStatus::NoData => "Failed to fetch detailed token data or no data available",
        }
    }
}

/// Per-category counts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryStats {
    pub name: String,
    pub candidates: usize,
    pub with_details: usize,
    pub passed: usize,
    pub selected: usize,
}

/// Counts collected during a run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub source_counts: Vec<(DiscoverySource, usize)>,
    pub failed_sources: Vec<DiscoverySource>,
    pub unique_candidates: usize,
    pub detail_requests: usize,
    pub failed_batches: usize,
    pub detail_records: usize,
    pub categories: Vec<CategoryStats>,
}

/// Result of screening, before persistence
#[derive(Debug, Clone)]
pub struct ScreeningOutcome {
    pub document: OutputDocument,
    pub status: RunStatus,
    pub stats: RunStats,
}

pub struct ScreeningPipeline {
    discovery: Arc<dyn DiscoveryPort>,
    fetcher: DetailBatchFetcher,
    clock: Arc<dyn Clock>,
    settings: PipelineSettings,
}

impl ScreeningPipeline {
    pub fn new(
        discovery: Arc<dyn DiscoveryPort>,
        details: Arc<dyn DetailPort>,
        clock: Arc<dyn Clock>,
        settings: PipelineSettings,
    ) -> Result<Self, PipelineError> {
        settings.validate()?;
        let fetcher = DetailBatchFetcher::new(details, settings.batch_size);
        Ok(Self {
            discovery,
            fetcher,
            clock,
            settings,
        })
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Screen and persist. Sink failure is the only fatal error.
    pub async fn run(&self, sink: &dyn OutputSink) -> Result<ScreeningOutcome, PipelineError> {
        let outcome = self.screen().await;
        sink.write(&outcome.document).await?;
        tracing::info!(
            "{}: wrote {} tokens",
            outcome.status.message(),
            outcome.document.len()
        );
        Ok(outcome)
    }

    /// Run every stage except persistence
    pub async fn screen(&self) -> ScreeningOutcome {
        let mut stats = RunStats::default();

        let feeds = self.discover(&mut stats).await;
        let all_sources = self.settings.source_order();
        let everything = aggregate(all_sources.iter().map(|s| feeds[s].as_slice()));
        stats.unique_candidates = everything.len();

        if everything.is_empty() {
            tracing::warn!("{}", RunStatus::NoCandidates.message());
            return self.finish(RunStatus::NoCandidates, Vec::new(), stats);
        }

        let report = self.fetcher.fetch(everything.addresses()).await;
        stats.detail_requests = report.requests;
        stats.failed_batches = report.failed_batches.len();
        stats.detail_records = report.records.len();

        if report.is_no_data() {
            tracing::warn!("{}", RunStatus::NoData.message());
            return self.finish(RunStatus::NoData, Vec::new(), stats);
        }

        let now = self.clock.now();
        let details = index_details(report);
        let mut lists = Vec::with_capacity(self.settings.categories.len());

        for category in &self.settings.categories {
            let candidates = aggregate(category.sources.iter().map(|s| feeds[s].as_slice()));
            let (list, category_stats) =
                self.screen_category(category, &candidates, &details, now);
            stats.categories.push(category_stats);
            lists.push(list);
        }

        self.finish(RunStatus::Completed, lists, stats)
    }

    async fn discover(
        &self,
        stats: &mut RunStats,
    ) -> HashMap<DiscoverySource, Vec<TokenCandidate>> {
        let mut feeds = HashMap::new();

        for source in self.settings.source_order() {
            let candidates = match self.discovery.fetch_candidates(source).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    tracing::warn!("Discovery feed {} unavailable: {}", source, e);
                    stats.failed_sources.push(source);
                    Vec::new()
                }
            };
            tracing::info!("Discovered {} candidates from {}", candidates.len(), source);
            stats.source_counts.push((source, candidates.len()));
            feeds.insert(source, candidates);
        }

        feeds
    }

    fn screen_category(
        &self,
        category: &CategorySpec,
        candidates: &AggregatedCandidates,
        details: &HashMap<String, DetailRecord>,
        now: DateTime<Utc>,
    ) -> (RankedList, CategoryStats) {
        let profile = &category.profile;
        let zero_baseline = profile.effective_zero_baseline(self.settings.zero_baseline);
        let mut stats = CategoryStats {
            name: category.name.clone(),
            candidates: candidates.len(),
            ..Default::default()
        };
        let mut passed = Vec::new();

        for candidate in candidates.candidates() {
            let Some(record) = details.get(&candidate.address) else {
                continue;
            };
            stats.with_details += 1;

            let metrics =
                DerivedMetrics::derive(record, candidate.discovery_weight, now, zero_baseline);
            tracing::debug!(
                "[{}] {}: liquidity ${:.0}, mcap ${:.0}, txns h1 {} / h6 {}, price h1 {:.2}%, boosts {}, vol/liq {:.2}",
                category.name,
                record.label(),
                metrics.liquidity_usd,
                metrics.market_cap_usd,
                metrics.txns_h1,
                metrics.txns_h6,
                metrics.price_change_h1,
                metrics.discovery_weight,
                metrics.volume_liquidity_ratio
            );

            if let Some(failed) = profile.first_failure(&metrics) {
                tracing::debug!(
                    "[{}] {} rejected by {} ({})",
                    category.name,
                    candidate.address,
                    failed.name,
                    failed.predicate
                );
                continue;
            }

            passed.push(ScoredCandidate::new(
                candidate,
                record.clone(),
                metrics,
                &self.settings.weights,
            ));
        }

        stats.passed = passed.len();
        let selected = top_n(passed, category.top_n);
        stats.selected = selected.len();

        tracing::info!(
            "Category {} ({}): {} candidates, {} with details, {} passed, {} selected",
            category.name,
            profile.name,
            stats.candidates,
            stats.with_details,
            stats.passed,
            stats.selected
        );

        (RankedList::new(category.name.clone(), selected), stats)
    }

    fn finish(&self, status: RunStatus, lists: Vec<RankedList>, stats: RunStats) -> ScreeningOutcome {
        ScreeningOutcome {
            document: assemble(&lists, self.clock.now()),
            status,
            stats,
        }
    }
}

fn index_details(report: FetchReport) -> HashMap<String, DetailRecord> {
    report
        .records
        .into_iter()
        .map(|record| (record.address.clone(), record))
        .collect()
}
