//! Configuration Loader
//!
//! Layers an optional TOML file under `TOKEN_HUNTER__*` environment
//! variables and validates the result. Every section has defaults, so no file
//! is needed for a standard run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::adapters::dexscreener::{DEXSCREENER_BASE_URL, MAX_ADDRESSES_PER_REQUEST};
use crate::adapters::storage::DEFAULT_OUTPUT_PATH;
use crate::adapters::telegram::TELEGRAM_API_URL;
use crate::application::{CategorySpec, PipelineSettings, DEFAULT_BATCH_SIZE, DEFAULT_MIN_INTERVAL_MS};
use crate::domain::{profiles, DiscoverySource, FilterCriteria, ScoreWeights, ZeroBaseline};

pub const DEFAULT_CONFIG_PATH: &str = "config/token_hunter.toml";
pub const ENV_PREFIX: &str = "TOKEN_HUNTER";
const REDACTED: &str = "<redacted>";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dexscreener: DexScreenerSection,
    #[serde(default)]
    pub pipeline: PipelineSection,
    #[serde(default)]
    pub scoring: ScoreWeights,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub telegram: TelegramSection,
    #[serde(default)]
    pub logging: LoggingSection,
    /// Screening categories, run in order
    #[serde(default = "default_categories")]
    pub categories: Vec<CategorySection>,
    /// Profile overrides and additions; same-name entries replace built-ins
    #[serde(default)]
    pub profiles: Vec<FilterCriteria>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dexscreener: DexScreenerSection::default(),
            pipeline: PipelineSection::default(),
            scoring: ScoreWeights::default(),
            output: OutputSection::default(),
            telegram: TelegramSection::default(),
            logging: LoggingSection::default(),
            categories: default_categories(),
            profiles: Vec::new(),
        }
    }
}

/// DexScreener API section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DexScreenerSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Addresses per detail request (1-30)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for DexScreenerSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            batch_size: default_batch_size(),
        }
    }
}

impl DexScreenerSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSection {
    /// H1/H6 ratio value when the H6 baseline is zero ("fail" or "pass")
    #[serde(default)]
    pub zero_baseline: ZeroBaseline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_output_path")]
    pub path: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

impl OutputSection {
    /// Output path with `~` and env vars expanded
    pub fn expanded_path(&self) -> PathBuf {
        PathBuf::from(expand_path(&self.path))
    }
}

/// One screening category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySection {
    pub name: String,
    pub sources: Vec<DiscoverySource>,
    /// Name of the profile to screen with
    pub profile: String,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

/// Telegram forwarding section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelegramSection {
    /// Bot token (falls back to TELEGRAM_BOT_TOKEN)
    #[serde(default)]
    pub bot_token: String,
    /// Destination chat (falls back to TELEGRAM_CHAT_ID)
    #[serde(default)]
    pub chat_id: String,
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,
    /// Minimum spacing between messages
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
}

impl Default for TelegramSection {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            api_url: default_telegram_api_url(),
            min_interval_ms: default_min_interval_ms(),
        }
    }
}

impl TelegramSection {
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn is_configured(&self) -> bool {
        !self.bot_token.trim().is_empty() && !self.chat_id.trim().is_empty()
    }

    /// Fill empty credentials from `TELEGRAM_BOT_TOKEN` / `TELEGRAM_CHAT_ID`
    pub fn apply_env_fallbacks<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.bot_token.trim().is_empty() {
            if let Some(token) = lookup("TELEGRAM_BOT_TOKEN") {
                self.bot_token = token;
            }
        }
        if self.chat_id.trim().is_empty() {
            if let Some(chat_id) = lookup("TELEGRAM_CHAT_ID") {
                self.chat_id = chat_id;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_base_url() -> String {
    DEXSCREENER_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}
fn default_output_path() -> String {
    DEFAULT_OUTPUT_PATH.to_string()
}
fn default_top_n() -> usize {
    5
}
fn default_telegram_api_url() -> String {
    TELEGRAM_API_URL.to_string()
}
fn default_min_interval_ms() -> u64 {
    DEFAULT_MIN_INTERVAL_MS
}
fn default_log_level() -> String {
    "info".to_string()
}

/// Latest boosted, most boosted and newest profiles, top 5 each
pub fn default_categories() -> Vec<CategorySection> {
    vec![
        CategorySection {
            name: "latest_boosted".into(),
            sources: vec![DiscoverySource::LatestBoosted],
            profile: profiles::LATEST_BOOSTED.into(),
            top_n: default_top_n(),
        },
        CategorySection {
            name: "most_boosted".into(),
            sources: vec![DiscoverySource::MostBoosted],
            profile: profiles::MOST_BOOSTED.into(),
            top_n: default_top_n(),
        },
        CategorySection {
            name: "latest_profiles".into(),
            sources: vec![DiscoverySource::LatestProfiles],
            profile: profiles::NEW_TOKENS.into(),
            top_n: default_top_n(),
        },
    ]
}

fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| shellexpand::tilde(path).into_owned())
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),
    #[error("Failed to render configuration: {0}")]
    RenderError(#[from] toml::ser::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration.
///
/// `path` is required to exist when given; otherwise the default path is
/// used if present. Environment variables override file values.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let (path, required) = match path {
        Some(path) => (PathBuf::from(expand_path(&path.to_string_lossy())), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };

    let settings = config::Config::builder()
        .add_source(
            config::File::new(&path.to_string_lossy(), config::FileFormat::Toml)
                .required(required),
        )
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut config: Config = settings.try_deserialize()?;
    config
        .telegram
        .apply_env_fallbacks(|key| std::env::var(key).ok().filter(|v| !v.is_empty()));
    config.validate()?;

    Ok(config)
}

/// Parse configuration from a TOML string (no environment layering)
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Toml))
        .build()?;
    let config: Config = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dexscreener.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "dexscreener.base_url cannot be empty".to_string(),
            ));
        }

        if self.dexscreener.batch_size == 0
            || self.dexscreener.batch_size > MAX_ADDRESSES_PER_REQUEST
        {
            return Err(ConfigError::ValidationError(format!(
                "dexscreener.batch_size must be 1-{}, got {}",
                MAX_ADDRESSES_PER_REQUEST, self.dexscreener.batch_size
            )));
        }

        if self.dexscreener.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "dexscreener.timeout_secs must be > 0".to_string(),
            ));
        }

        if !self.scoring.is_finite() {
            return Err(ConfigError::ValidationError(
                "scoring weights must be finite".to_string(),
            ));
        }

        if self.output.path.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "output.path cannot be empty".to_string(),
            ));
        }

        if self.telegram.min_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "telegram.min_interval_ms must be > 0".to_string(),
            ));
        }

        if !matches!(
            self.logging.level.to_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be trace, debug, info, warn or error, got '{}'",
                self.logging.level
            )));
        }

        for profile in &self.profiles {
            profile
                .validate()
                .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        }

        if self.categories.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one category is required".to_string(),
            ));
        }

        let profiles = self.effective_profiles();
        let mut names = Vec::new();
        for category in &self.categories {
            if category.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "category name cannot be empty".to_string(),
                ));
            }
            if names.contains(&category.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate category '{}'",
                    category.name
                )));
            }
            names.push(category.name.as_str());

            if category.sources.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "category '{}' has no sources",
                    category.name
                )));
            }
            if category.top_n == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "category '{}' top_n must be > 0",
                    category.name
                )));
            }
            if !profiles.iter().any(|p| p.name == category.profile) {
                return Err(ConfigError::ValidationError(format!(
                    "category '{}' references unknown profile '{}'",
                    category.name, category.profile
                )));
            }
        }

        Ok(())
    }

    /// Built-in profiles merged with the configured ones
    pub fn effective_profiles(&self) -> Vec<FilterCriteria> {
        profiles::merge_with_builtin(&self.profiles)
    }

    pub fn output_path(&self) -> PathBuf {
        self.output.expanded_path()
    }

    /// Resolve categories and profiles into pipeline settings.
    ///
    /// A non-empty `only` keeps the named categories, in config order.
    pub fn pipeline_settings(&self, only: &[String]) -> Result<PipelineSettings, ConfigError> {
        if let Some(unknown) = only
            .iter()
            .find(|name| !self.categories.iter().any(|c| &c.name == *name))
        {
            return Err(ConfigError::ValidationError(format!(
                "unknown category '{}'",
                unknown
            )));
        }

        let profiles = self.effective_profiles();
        let mut categories = Vec::new();

        for category in &self.categories {
            if !only.is_empty() && !only.contains(&category.name) {
                continue;
            }
            let profile = profiles
                .iter()
                .find(|p| p.name == category.profile)
                .cloned()
                .ok_or_else(|| {
                    ConfigError::ValidationError(format!(
                        "category '{}' references unknown profile '{}'",
                        category.name, category.profile
                    ))
                })?;

            categories.push(CategorySpec {
                name: category.name.clone(),
                sources: category.sources.clone(),
                profile,
                top_n: category.top_n,
            });
        }

        Ok(PipelineSettings {
            categories,
            weights: self.scoring,
            zero_baseline: self.pipeline.zero_baseline,
            batch_size: self.dexscreener.batch_size,
        })
    }

    /// Copy with secrets replaced
    pub fn redacted(&self) -> Config {
        let mut config = self.clone();
        if !config.telegram.bot_token.is_empty() {
            config.telegram.bot_token = REDACTED.to_string();
        }
        config
    }

    /// Render as TOML with secrets redacted
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&self.redacted())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MetricField, Predicate};
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Tests that read or set TOKEN_HUNTER__* variables hold this lock
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dexscreener.batch_size, 30);
        assert_eq!(config.categories.len(), 3);
        assert_eq!(config.categories[2].profile, profiles::NEW_TOKENS);
        assert_eq!(config.telegram.min_interval(), Duration::from_secs(1));
        assert_eq!(config.pipeline.zero_baseline, ZeroBaseline::Fail);
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let config = parse_config(include_str!("../../config/token_hunter.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"
[dexscreener]
batch_size = 20

[pipeline]
zero_baseline = "pass"

[scoring]
age_penalty_weight = 0.5

[output]
path = "out/tokens.json"

[[categories]]
name = "momentum"
sources = ["latest_boosted", "most_boosted"]
profile = "early_momentum"
top_n = 10
"#,
        );

        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.dexscreener.batch_size, 20);
        assert_eq!(config.dexscreener.base_url, DEXSCREENER_BASE_URL);
        assert_eq!(config.pipeline.zero_baseline, ZeroBaseline::Pass);
        assert_eq!(config.scoring.age_penalty_weight, 0.5);
        assert_eq!(config.scoring.txns_h1_weight, 1.5);
        assert_eq!(config.output_path(), PathBuf::from("out/tokens.json"));
        assert_eq!(config.categories.len(), 1);
        assert_eq!(
            config.categories[0].sources,
            vec![DiscoverySource::LatestBoosted, DiscoverySource::MostBoosted]
        );
    }

    #[test]
    fn test_env_overrides_file_values() {
        let file = write_config(
            r#"
[dexscreener]
batch_size = 20
timeout_secs = 10

[logging]
level = "warn"
"#,
        );

        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("TOKEN_HUNTER__DEXSCREENER__BATCH_SIZE", "12");
        std::env::set_var("TOKEN_HUNTER__LOGGING__LEVEL", "debug");
        let result = load_config(Some(file.path()));
        std::env::remove_var("TOKEN_HUNTER__DEXSCREENER__BATCH_SIZE");
        std::env::remove_var("TOKEN_HUNTER__LOGGING__LEVEL");

        let config = result.unwrap();
        assert_eq!(config.dexscreener.batch_size, 12);
        assert_eq!(config.dexscreener.timeout_secs, 10);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_env_override_is_validated() {
        let file = write_config("");

        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("TOKEN_HUNTER__DEXSCREENER__BATCH_SIZE", "31");
        let result = load_config(Some(file.path()));
        std::env::remove_var("TOKEN_HUNTER__DEXSCREENER__BATCH_SIZE");

        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(dir.path().join("absent.toml").as_path()));
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn test_custom_profile_overrides_builtin() {
        let config = parse_config(
            r#"
[[profiles]]
name = "most_boosted"
description = "looser"
zero_baseline = "pass"

[[profiles.criteria]]
name = "min_liquidity"
predicate = { kind = "min_only", metric = "liquidity_usd", min = 1000 }

[[profiles]]
name = "whales"

[[profiles.criteria]]
name = "big_liquidity"
predicate = { kind = "range", metric = "liquidity_usd", min = 1000000, max = 50000000 }
"#,
        )
        .unwrap();

        let profiles = config.effective_profiles();
        let most = profiles.iter().find(|p| p.name == "most_boosted").unwrap();
        assert_eq!(most.criteria.len(), 1);
        assert_eq!(most.zero_baseline, Some(ZeroBaseline::Pass));
        assert_eq!(
            most.criteria[0].predicate,
            Predicate::min_only(MetricField::LiquidityUsd, 1000.0)
        );
        assert!(profiles.iter().any(|p| p.name == "whales"));
    }

    #[test]
    fn test_invalid_batch_size() {
        for size in [0, 31] {
            let mut config = Config::default();
            config.dexscreener.batch_size = size;
            assert!(matches!(
                config.validate(),
                Err(ConfigError::ValidationError(_))
            ));
        }
    }

    #[test]
    fn test_unknown_profile_rejected() {
        let mut config = Config::default();
        config.categories[0].profile = "nope".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unknown profile"));
    }

    #[test]
    fn test_invalid_predicate_rejected() {
        let mut config = Config::default();
        config.profiles.push(
            FilterCriteria::new("broken")
                .require("r", Predicate::range(MetricField::TxnsH1, 10.0, 1.0)),
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_category_rules() {
        let mut config = Config::default();
        config.categories[1].sources.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.categories[1].top_n = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.categories[1].name = config.categories[0].name.clone();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.telegram.min_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scoring.liquidity_weight = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pipeline_settings_selects_categories() {
        let config = Config::default();
        let all = config.pipeline_settings(&[]).unwrap();
        assert_eq!(all.categories.len(), 3);
        assert_eq!(all.categories[2].profile.name, profiles::NEW_TOKENS);

        let one = config
            .pipeline_settings(&["most_boosted".to_string()])
            .unwrap();
        assert_eq!(one.categories.len(), 1);
        assert_eq!(one.categories[0].sources, vec![DiscoverySource::MostBoosted]);

        assert!(config.pipeline_settings(&["missing".to_string()]).is_err());
    }

    #[test]
    fn test_env_fallbacks_fill_only_empty_values() {
        let lookup = |key: &str| match key {
            "TELEGRAM_BOT_TOKEN" => Some("env-token".to_string()),
            "TELEGRAM_CHAT_ID" => Some("-100".to_string()),
            _ => None,
        };

        let mut section = TelegramSection::default();
        section.apply_env_fallbacks(lookup);
        assert_eq!(section.bot_token, "env-token");
        assert_eq!(section.chat_id, "-100");
        assert!(section.is_configured());

        let mut section = TelegramSection {
            chat_id: "file-chat".into(),
            ..Default::default()
        };
        section.apply_env_fallbacks(lookup);
        assert_eq!(section.chat_id, "file-chat");
    }

    #[test]
    fn test_toml_dump_redacts_token() {
        let mut config = Config::default();
        config.telegram.bot_token = "123:SECRET".into();
        config.telegram.chat_id = "-100".into();

        let rendered = config.to_toml().unwrap();
        assert!(!rendered.contains("SECRET"));
        assert!(rendered.contains(REDACTED));
        assert!(rendered.contains("[[categories]]"));

        let reparsed = parse_config(&rendered).unwrap();
        assert_eq!(reparsed.categories, config.categories);
    }
}
