use std::sync::Arc;

use encoding_rs::SHIFT_JIS;
use tracing::{debug, warn};
use url::Url;

use crate::constants::DETAIL_CONTENT_SELECTOR;
use crate::dom::Fragment;
use crate::extract::fields::{find_image_url, find_purchase_link, find_ticket_url};
use crate::fetch::{decode_html, PageFetcher};
use crate::types::ConcertRecord;

/// Enriches candidate records from their detail pages. Every resolution is
/// best effort: a record goes in, the same record or a more complete one
/// comes out, and no failure here ever fails the batch.
#[derive(Clone)]
pub struct DetailResolver {
    fetcher: Arc<dyn PageFetcher>,
}

impl DetailResolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch the record's detail page and fill in whichever of image and
    /// ticket link are still missing. Extraction is scoped to the page's
    /// content region so site-wide navigation and social links stay out.
    pub async fn resolve(&self, mut record: ConcertRecord) -> ConcertRecord {
        if record.source_url.is_empty()
            || (record.image_url.is_some() && record.ticket_url.is_some())
        {
            return record;
        }

        let base = match Url::parse(&record.source_url) {
            Ok(base) => base,
            Err(e) => {
                debug!("Skipping detail resolution for unparsable URL {}: {}", record.source_url, e);
                return record;
            }
        };

        let bytes = match self.fetcher.fetch_bytes(&record.source_url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Detail fetch failed for {}: {}", record.source_url, e);
                return record;
            }
        };

        // The concert site serves Shift_JIS; a meta charset on the page
        // overrides the assumption.
        let html = decode_html(&bytes, SHIFT_JIS);
        let document = Fragment::parse_document(&html);
        let root = document.root();
        let region = root.find_first(DETAIL_CONTENT_SELECTOR).unwrap_or(root);

        if record.image_url.is_none() {
            record.image_url = find_image_url(&region, Some(&base));
        }
        if record.ticket_url.is_none() {
            record.ticket_url = find_ticket_url(&region, Some(&base))
                .or_else(|| find_purchase_link(&region, Some(&base)));
        }

        record
    }

    /// Resolve a whole batch concurrently, one task per record, and wait for
    /// all of them. Each task owns its record and writes into its own slot,
    /// so the fan-out shares no mutable state; a task that dies falls back
    /// to the unenriched record.
    pub async fn resolve_all(&self, records: Vec<ConcertRecord>) -> Vec<ConcertRecord> {
        let mut slots: Vec<ConcertRecord> = records.clone();
        let mut handles = Vec::with_capacity(records.len());

        for (i, record) in records.into_iter().enumerate() {
            let resolver = self.clone();
            handles.push((i, tokio::spawn(async move { resolver.resolve(record).await })));
        }

        for (i, handle) in handles {
            match handle.await {
                Ok(resolved) => slots[i] = resolved,
                Err(e) => warn!("Detail resolution task failed: {}", e),
            }
        }

        slots
    }
}
