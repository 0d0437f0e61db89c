//! CLI command implementations

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Subcommand, ValueEnum};
use serde_json::Value;
use trawl_search::{
    LastRequest, ProviderInfo, SearchRequest, TorrentDetails, TorrentResult, TorrentSearch,
};

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List registered providers
    Providers {
        /// Only show active providers
        #[arg(long)]
        active: bool,
    },
    /// Enable a provider with provider-specific arguments
    Enable {
        /// Provider name
        name: String,
        /// Arguments handed to the provider (credentials, paths)
        args: Vec<String>,
    },
    /// Search active providers
    Search {
        /// Search terms
        query: String,
        /// Restrict to these providers (repeatable)
        #[arg(short, long = "provider")]
        providers: Vec<String>,
        /// Provider category, e.g. "Movies"
        #[arg(short, long)]
        category: Option<String>,
        /// Maximum results per provider
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// List the latest torrents of active providers
    Last {
        /// Restrict to these providers (repeatable)
        #[arg(short, long = "provider")]
        providers: Vec<String>,
        /// Provider category, e.g. "Movies"
        #[arg(short, long)]
        category: Option<String>,
        /// Maximum results per provider
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Run a search or listing from a JSON array of positional arguments
    Call {
        /// Operation to run
        #[arg(value_enum)]
        operation: CallOperation,
        /// JSON array, e.g. '[["Demo"], "ubuntu", "All", 5]'
        args: String,
    },
    /// Print the magnet link of a torrent
    Magnet {
        /// Provider that lists the torrent
        provider: String,
        /// Torrent title
        title: String,
    },
    /// Show the details of a torrent
    Details {
        /// Provider that lists the torrent
        provider: String,
        /// Torrent title
        title: String,
    },
    /// Save the .torrent file of a torrent
    Download {
        /// Provider that lists the torrent
        provider: String,
        /// Torrent title
        title: String,
        /// Destination file
        path: PathBuf,
    },
}

/// Fan-out operations reachable through `call`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CallOperation {
    Search,
    Last,
}

/// Handle the CLI command
///
/// # Errors
/// Returns the lookup, argument or provider error of the command that fails
pub async fn handle_command(search: &TorrentSearch, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Providers { active } => {
            let providers = if active {
                search.list_active_providers()
            } else {
                search.list_providers()
            };
            print!("{}", render_providers(&providers));
        }
        Commands::Enable { name, args } => {
            search.enable_provider(&name, &args)?;
            println!("Enabled provider {name}");
            print!("{}", render_providers(&search.list_active_providers()));
        }
        Commands::Search {
            query,
            providers,
            category,
            limit,
        } => {
            let request = build_search_request(query, providers, category, limit);
            run_search(search, request).await;
        }
        Commands::Last {
            providers,
            category,
            limit,
        } => {
            let request = build_last_request(providers, category, limit);
            run_last(search, request).await;
        }
        Commands::Call { operation, args } => {
            let args = parse_call_args(&args)?;
            match operation {
                CallOperation::Search => {
                    run_search(search, SearchRequest::from_positional(&args)?).await;
                }
                CallOperation::Last => {
                    run_last(search, LastRequest::from_positional(&args)?).await;
                }
            }
        }
        Commands::Magnet { provider, title } => {
            let torrent = find_torrent(search, &provider, &title).await;
            println!("{}", search.magnet(&torrent).await?);
        }
        Commands::Details { provider, title } => {
            let torrent = find_torrent(search, &provider, &title).await;
            let details = search.torrent_details(&torrent).await?;
            print!("{}", render_details(&details));
        }
        Commands::Download {
            provider,
            title,
            path,
        } => {
            let torrent = find_torrent(search, &provider, &title).await;
            search.download_torrent(&torrent, &path).await?;
            println!("Saved {} to {}", torrent.title, path.display());
        }
    }

    Ok(())
}

fn build_search_request(
    query: String,
    providers: Vec<String>,
    category: Option<String>,
    limit: Option<usize>,
) -> SearchRequest {
    SearchRequest {
        providers: (!providers.is_empty()).then_some(providers),
        query: Some(query),
        category,
        limit,
        filter: None,
    }
}

fn build_last_request(
    providers: Vec<String>,
    category: Option<String>,
    limit: Option<usize>,
) -> LastRequest {
    LastRequest {
        providers: (!providers.is_empty()).then_some(providers),
        category,
        limit,
        filter: None,
    }
}

async fn run_search(search: &TorrentSearch, request: SearchRequest) {
    let report = search.search_with_report(request).await;
    print!("{}", render_results(&report.results));
    for failure in &report.failures {
        eprintln!("{} failed: {}", failure.provider, failure.error);
    }
}

async fn run_last(search: &TorrentSearch, request: LastRequest) {
    let report = search.last_with_report(request).await;
    print!("{}", render_results(&report.results));
    for failure in &report.failures {
        eprintln!("{} failed: {}", failure.provider, failure.error);
    }
}

/// Parse the JSON argument array of the `call` command
fn parse_call_args(raw: &str) -> anyhow::Result<Vec<Value>> {
    let value: Value = serde_json::from_str(raw).context("call arguments must be valid JSON")?;
    match value {
        Value::Array(args) => Ok(args),
        _ => bail!("call arguments must be a JSON array"),
    }
}

/// Locate a torrent by title on one provider
///
/// Falls back to a bare reference when the provider does not list it, so
/// providers that resolve titles on their own still get the call.
async fn find_torrent(search: &TorrentSearch, provider: &str, title: &str) -> TorrentResult {
    let candidates = search
        .search(SearchRequest::new(title).with_providers([provider]))
        .await;

    let exact = candidates
        .iter()
        .position(|torrent| torrent.title.eq_ignore_ascii_case(title));
    match exact {
        Some(position) => candidates[position].clone(),
        None => candidates
            .into_iter()
            .next()
            .unwrap_or_else(|| TorrentResult::reference(provider, title)),
    }
}

fn render_providers(providers: &[ProviderInfo]) -> String {
    if providers.is_empty() {
        return "No providers.\n".to_string();
    }

    let mut out = String::new();
    for info in providers {
        let _ = writeln!(
            out,
            "{:<12} {:<8} {:<8} {}",
            info.name,
            if info.public { "public" } else { "private" },
            if info.is_active { "active" } else { "inactive" },
            info.categories.join(", ")
        );
    }
    out
}

fn render_results(results: &[TorrentResult]) -> String {
    if results.is_empty() {
        return "No results.\n".to_string();
    }

    let mut out = String::new();
    for torrent in results {
        let seeds = torrent
            .seeds
            .map_or_else(|| "-".to_string(), |seeds| seeds.to_string());
        let _ = writeln!(
            out,
            "{:>6}  {:<10} {:<10} {}",
            seeds,
            torrent.provider,
            torrent.size.as_deref().unwrap_or("-"),
            torrent.title
        );
    }
    out
}

fn render_details(details: &TorrentDetails) -> String {
    let mut out = format!("{} ({})\n", details.title, details.provider);
    if let Some(description) = &details.description {
        let _ = writeln!(out, "{description}");
    }
    for file in &details.files {
        let _ = writeln!(out, "  {file}");
    }
    out
}
