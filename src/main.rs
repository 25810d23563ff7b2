use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use vgmo_crawler::config::Config;
use vgmo_crawler::constants;
use vgmo_crawler::detail::DetailResolver;
use vgmo_crawler::fetch::{HttpFetcher, PageFetcher};
use vgmo_crawler::logging;
use vgmo_crawler::pipeline::Pipeline;
use vgmo_crawler::sources::{FeedSource, ListingSource};
use vgmo_crawler::store::ConcertStore;
use vgmo_crawler::types::ConcertSource;

#[derive(Parser)]
#[command(name = "vgmo_crawler")]
#[command(about = "Game-music concert data crawler")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the configured sources and merge into the concert store
    Crawl {
        /// Specific sources to run (comma-separated). Available: feed, concert_page
        #[arg(long)]
        sources: Option<String>,
    },
}

fn create_source(
    source_name: &str,
    config: &Config,
    fetcher: Arc<dyn PageFetcher>,
) -> Option<Box<dyn ConcertSource>> {
    match source_name {
        constants::FEED_SOURCE => Some(Box::new(FeedSource::new(fetcher, config.feed.url.as_str()))),
        constants::CONCERT_PAGE_SOURCE => Some(Box::new(ListingSource::new(
            fetcher,
            config.listing.url.as_str(),
            &config.listing.encoding,
        ))),
        _ => None,
    }
}

async fn run_sources(
    source_names: &[String],
    config: &Config,
    store: &ConcertStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(Duration::from_secs(
        config.http.timeout_seconds,
    )));
    let resolver = DetailResolver::new(fetcher.clone());

    for source_name in source_names {
        let span = tracing::info_span!("Running source", source = %source_name);
        let _enter = span.enter();

        if let Some(source) = create_source(source_name, config, fetcher.clone()) {
            info!("Starting pipeline");
            match Pipeline::run_for_source(source.as_ref(), &resolver, store).await {
                Ok(result) => {
                    info!("Pipeline finished");
                    println!("\n📊 Crawl results for {}:", source_name);
                    println!("   Items scanned: {}", result.scanned_items);
                    println!("   Records extracted: {}", result.extracted_records);
                    println!("   Records written: {}", result.written_records);
                    println!("   Output file: {}", result.output_file);
                }
                Err(e) => {
                    error!("Pipeline failed: {}", e);
                    println!("❌ Crawl failed for {source_name}: {e}");
                }
            }
        } else {
            warn!("Unknown source specified");
            println!("⚠️  Unknown source: {}", source_name);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();

    let config = if Path::new("config.toml").exists() {
        Config::load()?
    } else {
        warn!("No config.toml found, using built-in defaults");
        Config::default()
    };

    match cli.command {
        Commands::Crawl { sources } => {
            println!("🔄 Running crawl pipeline...");

            let source_names: Vec<String> = if let Some(source_list) = sources {
                source_list
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect()
            } else {
                constants::get_supported_sources()
                    .into_iter()
                    .map(|s| s.to_string())
                    .collect()
            };

            let store = ConcertStore::new(config.store_path());
            run_sources(&source_names, &config, &store).await?;
        }
    }
    Ok(())
}
