use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bridge_core::config::Config;
use bridge_core::lazy::LazyIngestingClient;
use bridge_core::traits::IndexClient;
use bridge_core::CandidatePath;
use bridge_engine::{EngineOptions, PathEngine};
use bridge_text::{TantivyIndexClient, TantivyIndexer};
use bridge_wiki::WikiSummaryFetcher;

#[derive(Parser)]
#[command(name = "bridge", about = "Find the articles that connect two topics")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search for a chain of articles from topic A to topic B.
    Discover {
        topic_a: String,
        topic_b: String,
        /// Recursion budget; defaults to `discovery.depth_budget`.
        #[arg(long)]
        depth: Option<u32>,
    },
    /// Report whether the index is reachable and provisioned.
    Status,
}

#[derive(Serialize)]
struct PathOutput<'a> {
    keywords: [&'a str; 2],
    path: Vec<PathEntry<'a>>,
}

#[derive(Serialize)]
struct PathEntry<'a> {
    title: &'a str,
    url: &'a str,
    popularity: Option<i64>,
}

fn render(topic_a: &str, topic_b: &str, path: &CandidatePath) -> anyhow::Result<String> {
    let output = PathOutput {
        keywords: [topic_a, topic_b],
        path: path
            .documents()
            .iter()
            .map(|d| PathEntry { title: &d.title, url: &d.source_url, popularity: d.popularity })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let settings = config.settings()?;
    let index_dir = config.index_dir()?;
    info!(index = %index_dir.display(), "using index");

    let reader = TantivyIndexClient::for_dir(&index_dir);
    let index: Arc<dyn IndexClient> = if settings.lazy_ingest.enabled {
        let fetcher = WikiSummaryFetcher::from_settings(&settings.lazy_ingest)?;
        let sink = TantivyIndexer::open_or_create(&index_dir)
            .with_context(|| format!("opening {} for lazy ingestion", index_dir.display()))?;
        Arc::new(LazyIngestingClient::new(reader, fetcher, sink))
    } else {
        Arc::new(reader)
    };

    match cli.command {
        Command::Status => {
            let status = index.status().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Discover { topic_a, topic_b, depth } => {
            let options = EngineOptions::from_settings(&settings);
            let depth = depth.unwrap_or(options.depth_budget);
            let engine = PathEngine::new(index, options)?;

            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupted, cancelling discovery");
                    on_signal.cancel();
                }
            });

            let path = engine.discover_path(&topic_a, &topic_b, depth, &cancel).await?;
            println!("{}", render(&topic_a, &topic_b, &path)?);
        }
    }
    Ok(())
}
