//! Telegram Bot API notifier

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::ports::{Notifier, NotifyError};

pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub api_url: String,
    pub bot_token: String,
    pub chat_id: String,
    pub timeout: Duration,
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            api_url: TELEGRAM_API_URL.to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends each message to one chat via `sendMessage`
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    config: TelegramConfig,
    http: Client,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Result<Self, NotifyError> {
        if config.bot_token.trim().is_empty() {
            return Err(NotifyError::NotConfigured("telegram bot_token is empty".into()));
        }
        if config.chat_id.trim().is_empty() {
            return Err(NotifyError::NotConfigured("telegram chat_id is empty".into()));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        Ok(Self { config, http })
    }

    pub fn chat_id(&self) -> &str {
        &self.config.chat_id
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_url.trim_end_matches('/'),
            self.config.bot_token
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let body = SendMessageRequest {
            chat_id: &self.config.chat_id,
            text: message,
            disable_web_page_preview: true,
        };

        // The URL carries the bot token; keep reqwest's error text out of logs
        let response = self
            .http
            .post(self.send_message_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let parsed: Option<ApiResponse> = response.json().await.ok();

        match parsed {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(ApiResponse { description, .. }) => Err(NotifyError::Rejected(format!(
                "{}: {}",
                status,
                description.unwrap_or_else(|| "no description".into())
            ))),
            None => Err(NotifyError::Rejected(format!("{}: unreadable response", status))),
        }
    }
}

/// Logs messages instead of sending them (`--dry-run`)
#[derive(Debug, Clone, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        tracing::info!("[dry-run] {}", message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_rejected() {
        let err = TelegramNotifier::new(TelegramConfig::new("", "123")).unwrap_err();
        assert!(matches!(err, NotifyError::NotConfigured(_)));

        let err = TelegramNotifier::new(TelegramConfig::new("token", " ")).unwrap_err();
        assert!(matches!(err, NotifyError::NotConfigured(_)));
    }

    #[test]
    fn test_send_message_url() {
        let mut config = TelegramConfig::new("123:ABC", "-100200");
        config.api_url = "http://localhost:8081/".into();
        let notifier = TelegramNotifier::new(config).unwrap();
        assert_eq!(
            notifier.send_message_url(),
            "http://localhost:8081/bot123:ABC/sendMessage"
        );
        assert_eq!(notifier.chat_id(), "-100200");
        assert_eq!(notifier.name(), "telegram");
    }

    #[test]
    fn test_request_body_shape() {
        let body = SendMessageRequest {
            chat_id: "-100200",
            text: "Mint1",
            disable_web_page_preview: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["chat_id"], "-100200");
        assert_eq!(json["text"], "Mint1");
    }

    #[tokio::test]
    async fn test_logging_notifier_always_succeeds() {
        let notifier = LoggingNotifier;
        assert!(notifier.send("Mint1").await.is_ok());
        assert_eq!(notifier.name(), "log");
    }
}
