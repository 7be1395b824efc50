use std::path::PathBuf;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bridge_core::config::Config;
use bridge_text::{list_json_files, TantivyIndexer};

#[derive(Parser)]
#[command(name = "bridge-indexer", about = "Build the article index from JSON dumps")]
struct Args {
    /// Directory searched recursively for `*.json` article arrays.
    data_dir: PathBuf,
    /// Wipe the collection before indexing.
    #[arg(long)]
    rebuild: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let index_dir = config.index_dir()?;

    let indexer =
        if args.rebuild { TantivyIndexer::create(&index_dir)? } else { TantivyIndexer::open_or_create(&index_dir)? };
    info!(index = %index_dir.display(), data = %args.data_dir.display(), rebuild = args.rebuild, "indexing");

    let files = list_json_files(&args.data_dir);
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")?
            .progress_chars("#>-"),
    );

    let mut total = 0;
    for file in &files {
        pb.set_message(file.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default());
        match indexer.index_file(file) {
            Ok(count) => total += count,
            Err(e) => warn!(file = %file.display(), error = %e, "skipping unreadable file"),
        }
        pb.inc(1);
    }
    pb.finish_with_message(format!("{} articles", total));

    println!("Indexed {} articles from {} files into {}", total, files.len(), index_dir.display());
    Ok(())
}
