//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the token hunter.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::adapters::dexscreener::{DexScreenerClient, DexScreenerConfig};
use crate::adapters::storage::JsonFileStore;
use crate::adapters::telegram::{LoggingNotifier, TelegramConfig, TelegramNotifier};
use crate::application::{Forwarder, RunStatus, ScreeningPipeline};
use crate::config::{load_config, Config};
use crate::ports::{Notifier, SystemClock};

/// Token Hunter - DexScreener token screener
#[derive(Parser, Debug)]
#[command(
    name = "token-hunter",
    version = env!("CARGO_PKG_VERSION"),
    about = "Screens DexScreener boosted and newly profiled tokens",
    long_about = "Token Hunter pulls the DexScreener boost and profile feeds, fetches market \
                  details in batches, screens them against named profiles and writes the \
                  top-ranked tokens per category to a JSON document."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one screening pass and write the output document
    Scan(ScanCmd),

    /// Send the addresses of an output document to Telegram
    Forward(ForwardCmd),

    /// List the effective screening profiles
    Profiles(ProfilesCmd),

    /// Print the effective configuration
    Config(ConfigCmd),
}

impl Command {
    /// Config file given to the subcommand, if any
    pub fn config_path(&self) -> Option<&Path> {
        match self {
            Command::Scan(cmd) => cmd.config.as_deref(),
            Command::Forward(cmd) => cmd.config.as_deref(),
            Command::Profiles(cmd) => cmd.config.as_deref(),
            Command::Config(cmd) => cmd.config.as_deref(),
        }
    }
}

/// Run one screening pass
#[derive(Parser, Debug)]
pub struct ScanCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the output file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Only run the named category (repeatable)
    #[arg(long = "category", value_name = "NAME")]
    pub categories: Vec<String>,
}

/// Forward an output document
#[derive(Parser, Debug)]
pub struct ForwardCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Document to forward (defaults to the configured output path)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Log messages instead of sending them
    #[arg(long)]
    pub dry_run: bool,
}

/// List profiles
#[derive(Parser, Debug)]
pub struct ProfilesCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Print configuration
#[derive(Parser, Debug)]
pub struct ConfigCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    let config = load_config(app.command.config_path()).context("Failed to load configuration")?;
    init_logging(app.verbose, app.debug, &config.logging.level)?;
    tracing::debug!(
        "Configuration loaded: {} categories, {} profiles",
        config.categories.len(),
        config.effective_profiles().len()
    );

    match app.command {
        Command::Scan(cmd) => scan_command(cmd, config).await,
        Command::Forward(cmd) => forward_command(cmd, config).await,
        Command::Profiles(_) => profiles_command(&config),
        Command::Config(_) => config_command(&config),
    }
}

/// Initialize logging system; RUST_LOG wins when set
fn init_logging(verbose: bool, debug: bool, configured: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        configured
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Handle scan command
async fn scan_command(cmd: ScanCmd, config: Config) -> Result<()> {
    let settings = config
        .pipeline_settings(&cmd.categories)
        .context("Invalid category selection")?;

    let client = Arc::new(
        DexScreenerClient::with_config(DexScreenerConfig {
            base_url: config.dexscreener.base_url.clone(),
            timeout: config.dexscreener.timeout(),
            ..Default::default()
        })
        .context("Failed to create DexScreener client")?,
    );

    let output = cmd.output.unwrap_or_else(|| config.output_path());
    let store = JsonFileStore::new(&output);

    tracing::info!(
        "Scanning {} categories, writing to {}",
        settings.categories.len(),
        output.display()
    );

    let pipeline = ScreeningPipeline::new(client.clone(), client, Arc::new(SystemClock), settings)
        .context("Failed to build screening pipeline")?;
    let outcome = pipeline.run(&store).await.context("Screening run failed")?;

    match outcome.status {
        RunStatus::Completed => {
            println!(
                "Saved {} tokens to {}",
                outcome.document.len(),
                output.display()
            );
            for token in &outcome.document.tokens {
                println!(
                    "  {:<12} {:<46} score {:>12.2}  {}",
                    token.symbol.as_deref().unwrap_or("?"),
                    token.token_address,
                    token.score,
                    token.category.as_deref().unwrap_or("")
                );
            }
        }
        status => println!("{} (empty document written to {})", status.message(), output.display()),
    }

    if !outcome.stats.failed_sources.is_empty() || outcome.stats.failed_batches > 0 {
        println!(
            "Warnings: {} feeds unavailable, {} detail batches failed",
            outcome.stats.failed_sources.len(),
            outcome.stats.failed_batches
        );
    }

    Ok(())
}

/// Handle forward command
async fn forward_command(cmd: ForwardCmd, config: Config) -> Result<()> {
    let input = cmd.input.unwrap_or_else(|| config.output_path());
    let store = JsonFileStore::new(&input);

    let notifier: Arc<dyn Notifier> = if cmd.dry_run {
        Arc::new(LoggingNotifier)
    } else {
        let telegram = &config.telegram;
        let notifier = TelegramNotifier::new(TelegramConfig {
            api_url: telegram.api_url.clone(),
            ..TelegramConfig::new(telegram.bot_token.clone(), telegram.chat_id.clone())
        })
        .context("Telegram is not configured; set TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID")?;
        Arc::new(notifier)
    };

    let mut forwarder = Forwarder::new(notifier, Arc::new(SystemClock), config.telegram.min_interval());
    let report = forwarder
        .forward(&store)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;

    println!("Forwarded {}/{} tokens", report.sent, report.attempted);
    if !report.all_sent() {
        println!("Failed: {}", report.failed.join(", "));
    }

    Ok(())
}

/// Handle profiles command
fn profiles_command(config: &Config) -> Result<()> {
    for profile in config.effective_profiles() {
        let used_by: Vec<&str> = config
            .categories
            .iter()
            .filter(|c| c.profile == profile.name)
            .map(|c| c.name.as_str())
            .collect();

        println!("{}", profile.name);
        if !profile.description.is_empty() {
            println!("  {}", profile.description);
        }
        if let Some(policy) = profile.zero_baseline {
            println!("  zero baseline: {:?}", policy);
        }
        if !used_by.is_empty() {
            println!("  used by: {}", used_by.join(", "));
        }
        for criterion in &profile.criteria {
            println!("  - {:<22} {}", criterion.name, criterion.predicate);
        }
        println!();
    }
    Ok(())
}

/// Handle config command
fn config_command(config: &Config) -> Result<()> {
    let rendered = config.to_toml().context("Failed to render configuration")?;
    print!("{}", rendered);
    Ok(())
}
