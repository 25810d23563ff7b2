use std::sync::Arc;

use encoding_rs::{Encoding, SHIFT_JIS};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::constants::{CONCERT_PAGE_SOURCE, LISTING_ROW_SELECTOR};
use crate::dom::{Fragment, Node};
use crate::error::Result;
use crate::extract::date::{parse_concert_date, parse_venue};
use crate::extract::fields::resolve_url;
use crate::fetch::{decode_html, PageFetcher};
use crate::types::{ConcertRecord, ConcertSource, SourceBatch};

/// The concert listing page: a legacy-encoded HTML document where each row
/// holds a link to the detail page and a text block with the date/venue
/// token. Ticket and image come later from the detail pages.
pub struct ListingSource {
    fetcher: Arc<dyn PageFetcher>,
    url: String,
    encoding: &'static Encoding,
}

impl ListingSource {
    pub fn new(fetcher: Arc<dyn PageFetcher>, url: impl Into<String>, encoding_label: &str) -> Self {
        let encoding = Encoding::for_label(encoding_label.as_bytes()).unwrap_or_else(|| {
            warn!("Unknown encoding label '{}', assuming shift_jis", encoding_label);
            SHIFT_JIS
        });
        Self {
            fetcher,
            url: url.into(),
            encoding,
        }
    }
}

#[async_trait::async_trait]
impl ConcertSource for ListingSource {
    fn source_name(&self) -> &'static str {
        CONCERT_PAGE_SOURCE
    }

    #[instrument(skip(self))]
    async fn fetch_candidates(&self) -> Result<SourceBatch> {
        debug!("Fetching listing page {}", self.url);
        let bytes = self.fetcher.fetch_bytes(&self.url).await?;
        let html = decode_html(&bytes, self.encoding);
        let document = Fragment::parse_document(&html);

        let base = Url::parse(&self.url).ok();
        let rows = document.root().find_all(LISTING_ROW_SELECTOR);
        let scanned = rows.len();

        let candidates: Vec<ConcertRecord> = rows
            .iter()
            .filter_map(|row| extract_listing_row(row, base.as_ref()))
            .collect();

        info!(
            "Extracted {} candidates from {} listing rows",
            candidates.len(),
            scanned
        );
        if scanned == 0 {
            warn!("No listing rows found - the page structure may have changed");
        }

        Ok(SourceBatch {
            scanned,
            candidates,
        })
    }
}

/// One listing row: first link gives title and detail URL, the row text
/// gives date and venue. Rows without a link or a date token are dropped;
/// a missing bracketed venue still yields a record.
fn extract_listing_row(row: &Node, base: Option<&Url>) -> Option<ConcertRecord> {
    let link = row.find_first("a")?;
    let title = link.text().trim().to_string();
    if title.is_empty() {
        return None;
    }
    let source_url = resolve_url(base, link.attr("href")?)?.to_string();

    let text = row.text();
    let date = parse_concert_date(&text)?;
    let venue = parse_venue(&text);

    Some(ConcertRecord {
        title,
        date,
        venue: Some(venue),
        ticket_url: None,
        source_url,
        image_url: None,
    })
}
