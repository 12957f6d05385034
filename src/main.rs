mod config;
mod error;
mod loader;
mod models;
mod pipeline;
mod scraper;
mod storage;
mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::AppConfig;
use crate::loader::{discover_html_files, load_page};
use crate::pipeline::Pipeline;
use crate::scraper::ListingParser;
use crate::storage::CsvSink;

#[derive(Parser)]
#[command(name = "detmir-dolls", about = "Dolls catalogue scraper → CSV", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl every listing page and rewrite the CSV (default)
    Crawl,

    /// Extract records from listing pages saved as HTML files
    Parse {
        /// A saved page, or a directory of `*.html` pages
        path: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "detmir_dolls=info,warn",
        1 => "detmir_dolls=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    match cli.command.unwrap_or(Command::Crawl) {
        Command::Crawl => {
            let _t = utils::Timer::start("Listing crawl");
            let stats = Pipeline::new(config).run().await?;
            info!(
                "Done: {}/{} pages, {} records",
                stats.pages_fetched, stats.total_pages, stats.records_written
            );
        }

        Command::Parse { path } => {
            let _t = utils::Timer::start("Offline parse");
            let parser = ListingParser::new(&config.scraper)?;
            let mut sink = CsvSink::create(&config.output.csv_path)?;

            let files = discover_html_files(&path)?;
            info!("Found {} saved pages in {:?}", files.len(), path);

            let mut total = 0usize;
            for file in &files {
                total += load_page(&parser, file, &mut sink)
                    .with_context(|| format!("Failed to parse {:?}", file))?;
            }
            info!("Done: {} records written to {:?}", total, sink.path());
        }
    }

    Ok(())
}
