use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::constants::FEED_SOURCE;
use crate::dom::Fragment;
use crate::error::Result;
use crate::extract::fields::extract_candidate;
use crate::fetch::PageFetcher;
use crate::types::{ConcertSource, SourceBatch};

/// Concert announcements arriving as an RSS feed whose item descriptions
/// embed HTML. The description fragment carries the date/venue text and,
/// sometimes, ticket and image links; the item link is the detail page.
pub struct FeedSource {
    fetcher: Arc<dyn PageFetcher>,
    url: String,
}

impl FeedSource {
    pub fn new(fetcher: Arc<dyn PageFetcher>, url: impl Into<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
        }
    }
}

#[async_trait::async_trait]
impl ConcertSource for FeedSource {
    fn source_name(&self) -> &'static str {
        FEED_SOURCE
    }

    #[instrument(skip(self))]
    async fn fetch_candidates(&self) -> Result<SourceBatch> {
        debug!("Fetching feed from {}", self.url);
        let bytes = self.fetcher.fetch_bytes(&self.url).await?;
        let feed = feed_rs::parser::parse(&bytes[..])?;

        let scanned = feed.entries.len();
        let mut candidates = Vec::new();

        for entry in feed.entries {
            let item_title = entry.title.map(|t| t.content).unwrap_or_default();
            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default();
            let description = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .unwrap_or_default();

            let fragment = Fragment::parse_fragment(&description);
            match extract_candidate(&fragment, &item_title, &link) {
                Some(record) => candidates.push(record),
                None => debug!("Dropping feed item without usable title or date: {}", item_title),
            }
        }

        info!(
            "Extracted {} candidates from {} feed items",
            candidates.len(),
            scanned
        );
        Ok(SourceBatch {
            scanned,
            candidates,
        })
    }
}
