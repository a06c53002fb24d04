//! Configuration Module
//!
//! Loads and validates configuration from TOML files and the environment.

pub mod loader;

pub use loader::{
    default_categories, load_config, parse_config, CategorySection, Config, ConfigError,
    DexScreenerSection, LoggingSection, OutputSection, PipelineSection, TelegramSection,
    DEFAULT_CONFIG_PATH, ENV_PREFIX,
};
