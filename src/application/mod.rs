//! Application Layer - Screening and forwarding use cases
//!
//! Wires domain logic to ports. Nothing here talks to the network or the
//! filesystem directly.

pub mod fetcher;
pub mod forwarder;
pub mod pipeline;
pub mod rate_limiter;

pub use fetcher::{partition, DetailBatchFetcher, FetchReport, DEFAULT_BATCH_SIZE};
pub use forwarder::{ForwardReport, Forwarder};
pub use pipeline::{
    CategorySpec, CategoryStats, PipelineError, PipelineSettings, RunStats, RunStatus,
    ScreeningOutcome, ScreeningPipeline,
};
pub use rate_limiter::{MinIntervalLimiter, DEFAULT_MIN_INTERVAL_MS};
