//! pubcount - per-year publication counts from arXiv and BASE
//!
//! ## Usage
//!
//! ```bash
//! pubcount search arxiv "privacy" --from 2015
//! pubcount url base "privacy" 2023
//! pubcount cache clear
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pubcount::cache::{default_cache_path, ResponseCache};
use pubcount::fetch::{FetchConfig, HttpFetcher, ProxyConfig};
use pubcount::pipeline::{download_and_save, DownloadRequest, ReportOptions};
use pubcount::query::{build_url, current_year};
use pubcount::source::{list_sources, Source};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Per-year publication counts from arXiv and BASE
#[derive(Parser)]
#[command(name = "pubcount")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Response cache file
    #[arg(long, global = true, env = "PUBCOUNT_CACHE")]
    cache_file: Option<PathBuf>,

    /// Hours a cached response stays fresh
    #[arg(long, global = true, default_value = "24")]
    cache_ttl_hours: i64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count results per year and save a CSV report and bar chart
    Search {
        /// Search source: arxiv or base
        source: String,

        /// Search term
        term: String,

        /// First year (default: current year - 5)
        #[arg(long)]
        from: Option<i32>,

        /// End year, exclusive; the current year is always added (default: current year)
        #[arg(long)]
        to: Option<i32>,

        /// Step between years
        #[arg(long, default_value = "1")]
        step: usize,

        /// Output directory
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// SOCKS5 proxy host
        #[arg(long, default_value = "127.0.0.1", env = "PUBCOUNT_PROXY_HOST")]
        proxy_host: String,

        /// SOCKS5 proxy port
        #[arg(long, default_value = "9050", env = "PUBCOUNT_PROXY_PORT")]
        proxy_port: u16,

        /// Connect directly instead of through the proxy
        #[arg(long)]
        no_proxy: bool,

        /// Always fetch from the network
        #[arg(long)]
        no_cache: bool,

        /// Skip the bar chart
        #[arg(long)]
        no_chart: bool,
    },

    /// List supported sources
    Sources,

    /// Print the search URL for one year
    Url {
        source: String,
        term: String,
        year: i32,
    },

    /// Manage the response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show cache file path
    Path,
    /// Delete all cached responses
    Clear,
    /// Drop expired responses
    Purge,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    let cache_path = match cli.cache_file {
        Some(path) => path,
        None => default_cache_path()?,
    };
    let cache_ttl = chrono::Duration::try_hours(cli.cache_ttl_hours)
        .context("Invalid --cache-ttl-hours")?;

    match cli.command {
        Commands::Search {
            source,
            term,
            from,
            to,
            step,
            output,
            proxy_host,
            proxy_port,
            no_proxy,
            no_cache,
            no_chart,
        } => {
            let config = FetchConfig {
                proxy: (!no_proxy).then_some(ProxyConfig {
                    host: proxy_host,
                    port: proxy_port,
                }),
                cache_path,
                cache_ttl,
                use_cache: !no_cache,
                ..Default::default()
            };
            let current = current_year();
            let request = DownloadRequest {
                source: source.parse::<Source>().context("Invalid source")?,
                term,
                from_year: from.unwrap_or(current - 5),
                to_year: to.unwrap_or(current),
                step,
            };
            let options = ReportOptions {
                output_dir: output,
                render_chart: !no_chart,
            };
            run_search(&request, config, &options).await
        }
        Commands::Sources => {
            for source in list_sources() {
                println!("{}", source);
            }
            Ok(())
        }
        Commands::Url { source, term, year } => {
            let url = build_url(&source, &term, year)?;
            if url.is_empty() {
                anyhow::bail!("Unknown source: {}", source);
            }
            println!("{}", url);
            Ok(())
        }
        Commands::Cache { action } => handle_cache(action, cache_path, cache_ttl),
    }
}

// ============================================================================
// Search
// ============================================================================

async fn run_search(
    request: &DownloadRequest,
    config: FetchConfig,
    options: &ReportOptions,
) -> Result<()> {
    info!(
        source = %request.source,
        term = %request.term,
        from = request.from_year,
        to = request.to_year,
        "Starting search"
    );

    let fetcher = HttpFetcher::new(config).context("Failed to set up HTTP client")?;
    let paths = download_and_save(&fetcher, request, options)
        .await
        .context("Search failed, no report written")?;

    println!("Saved {} rows to {}", paths.rows, paths.csv.display());
    if let Some(chart) = paths.chart {
        println!("Saved chart to {}", chart.display());
    }
    Ok(())
}

// ============================================================================
// Cache Management
// ============================================================================

fn handle_cache(action: CacheAction, path: PathBuf, ttl: chrono::Duration) -> Result<()> {
    let mut cache = ResponseCache::open(path, ttl);

    match action {
        CacheAction::Path => {
            println!("Cache file: {:?}", cache.path());
        }
        CacheAction::Clear => {
            cache.clear()?;
            println!("Cache cleared.");
        }
        CacheAction::Purge => {
            let removed = cache.purge_expired();
            cache.save()?;
            println!("Removed {} expired responses, {} left.", removed, cache.len());
        }
    }

    Ok(())
}
