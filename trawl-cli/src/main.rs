//! Trawl CLI - Command-line interface
//!
//! Provides command-line access to the multi-provider torrent search.

mod commands;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use trawl_core::{CliLogLevel, TrawlConfig, init_tracing};
use trawl_search::TorrentSearch;
use trawl_search::providers::catalog::CATALOG_PROVIDER_NAME;

#[derive(Parser)]
#[command(name = "trawl")]
#[command(about = "Search torrents across many providers at once")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: commands::Commands,

    /// Console log level (the log file always records everything)
    #[arg(long, global = true, value_enum, default_value_t = CliLogLevel::Warn)]
    log_level: CliLogLevel,

    /// JSON catalog file; enables the Catalog provider
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config();

    init_tracing(cli.log_level.as_tracing_level(), &config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    let search = TorrentSearch::with_builtin_providers(&config.search)?;
    tracing::debug!(
        "Console level {}; registered {} providers, {} active",
        cli.log_level,
        search.registry().len(),
        search.list_active_providers().len()
    );

    if let Some(catalog) = cli.catalog {
        search
            .enable_provider(CATALOG_PROVIDER_NAME, &[catalog.display().to_string()])
            .with_context(|| format!("Failed to load catalog {}", catalog.display()))?;
    }

    commands::handle_command(&search, cli.command).await
}

/// Public providers start enabled unless `TRAWL_ENABLE_PUBLIC` turns them off.
fn load_config() -> TrawlConfig {
    let mut defaults = TrawlConfig::default();
    defaults.search.enable_public_on_start = true;
    defaults.with_env_overrides()
}
