//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - DexScreener: discovery feeds and token pair details
//! - Telegram: Bot API notifier for forwarding
//! - Storage: JSON file output sink and reader
//! - CLI: Command-line interface handlers

pub mod dexscreener;
pub mod telegram;
pub mod storage;
pub mod cli;

pub use dexscreener::DexScreenerClient;
pub use telegram::{LoggingNotifier, TelegramNotifier};
pub use storage::JsonFileStore;
pub use cli::CliApp;
