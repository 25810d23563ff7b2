use serde::Serialize;
use tracing::{info, instrument};

use crate::detail::DetailResolver;
use crate::error::Result;
use crate::merge::merge_concerts;
use crate::store::ConcertStore;
use crate::types::ConcertSource;

/// Result of a complete crawl run for one source
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    pub source_name: String,
    pub scanned_items: usize,
    pub extracted_records: usize,
    pub written_records: usize,
    pub output_file: String,
}

pub struct Pipeline;

impl Pipeline {
    /// Run the complete pipeline for one source: fetch and extract
    /// candidates, resolve detail pages concurrently, then merge into the
    /// persisted collection and write it back in full.
    #[instrument(skip(source, resolver, store), fields(source_name = %source.source_name()))]
    pub async fn run_for_source(
        source: &dyn ConcertSource,
        resolver: &DetailResolver,
        store: &ConcertStore,
    ) -> Result<PipelineResult> {
        let source_name = source.source_name().to_string();
        info!("Starting crawl for {}", source_name);

        // Step 1: Fetch and extract candidates. Failure here is fatal.
        println!("📡 Fetching {source_name}...");
        let batch = source.fetch_candidates().await?;
        println!(
            "✅ Extracted {} candidates from {} items",
            batch.candidates.len(),
            batch.scanned
        );

        // Step 2: Enrich from detail pages, one task per record, join all.
        let extracted = batch.candidates.len();
        let enriched = resolver.resolve_all(batch.candidates).await;

        // Step 3: Merge with the persisted collection and replace it.
        let existing = store.load()?;
        let merged = merge_concerts(&existing, &enriched);
        store.save(&merged)?;

        let output_file = store.path().display().to_string();
        info!(
            "Crawl finished for {}: {} scanned, {} extracted, {} written to {}",
            source_name,
            batch.scanned,
            extracted,
            merged.len(),
            output_file
        );

        Ok(PipelineResult {
            source_name,
            scanned_items: batch.scanned,
            extracted_records: extracted,
            written_records: merged.len(),
            output_file,
        })
    }
}
