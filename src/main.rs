//! Token Hunter - DexScreener token screener
//!
//! Screens boosted and newly profiled tokens and forwards the results.

use anyhow::Result;

use token_hunter::adapters::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (credentials go here, not in the TOML)
    dotenvy::dotenv().ok();

    let app = cli::init();
    cli::execute(app).await
}
