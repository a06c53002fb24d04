//! Token Hunter - DexScreener token screening library
//!
//! Pulls candidate tokens from the DexScreener boost and profile feeds,
//! fetches market details in batches, screens them against named profiles,
//! ranks the survivors and writes a timestamped JSON document.
//!
//! # Modules
//!
//! - `domain`: Pipeline stages as pure logic (aggregator, metrics, filter, scoring, output)
//! - `ports`: Trait abstractions (DiscoveryPort, DetailPort, OutputSink, Notifier, Clock)
//! - `adapters`: External implementations (DexScreener, Telegram, JSON file, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Screening pipeline, batch fetcher and forwarder

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;
