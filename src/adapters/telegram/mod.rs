//! Telegram Adapter
//!
//! Forwards token addresses to a chat through the Bot API. `LoggingNotifier`
//! stands in for dry runs.

mod client;

pub use client::{LoggingNotifier, TelegramConfig, TelegramNotifier, TELEGRAM_API_URL};
