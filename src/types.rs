use crate::error::Result;
use serde::{Deserialize, Serialize};

/// One concert as persisted in the store and consumed by the site build.
///
/// `date` is the canonical UTC instant for local midnight of the concert
/// day; string comparison on it is chronological comparison. `ticket_url`
/// is always serialized, with `null` meaning "checked, none found", while
/// `venue` and `image_url` are omitted entirely when unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcertRecord {
    pub title: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default)]
    pub ticket_url: Option<String>,
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// What one source produced in a single crawl pass.
#[derive(Debug)]
pub struct SourceBatch {
    /// Items or rows seen in the raw input, including ones that were dropped.
    pub scanned: usize,
    /// Records that yielded both a title and a date.
    pub candidates: Vec<ConcertRecord>,
}

/// Core trait that all concert data sources must implement
#[async_trait::async_trait]
pub trait ConcertSource: Send + Sync {
    /// Unique identifier for this source
    fn source_name(&self) -> &'static str;

    /// Fetch the raw input and extract candidate records from it.
    /// Failure here is fatal for the run; per-item extraction failures
    /// only shrink the candidate list.
    async fn fetch_candidates(&self) -> Result<SourceBatch>;
}
