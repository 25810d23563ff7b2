use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::types::ConcertRecord;

/// The persisted record collection: one JSON array, read in full before the
/// merge and replaced in full after it. The site build reads the same file.
pub struct ConcertStore {
    path: PathBuf,
}

impl ConcertStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full collection. A missing file is a normal first run and
    /// loads as empty; malformed content is fatal because overwriting it
    /// would silently discard the accumulated records.
    pub fn load(&self) -> Result<Vec<ConcertRecord>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let records: Vec<ConcertRecord> = serde_json::from_str(&content)?;
                debug!("Loaded {} records from {}", records.len(), self.path.display());
                Ok(records)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No existing store at {}, starting empty", self.path.display());
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the collection on disk with `records`, pretty-printed.
    pub fn save(&self, records: &[ConcertRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json_content = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, json_content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> ConcertRecord {
        ConcertRecord {
            title: "Concert One".to_string(),
            date: "2025-10-11T15:00:00.000Z".to_string(),
            venue: Some("東京".to_string()),
            ticket_url: None,
            source_url: "https://www.2083.jp/concert/concert-1.html".to_string(),
            image_url: None,
        }
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = ConcertStore::new(dir.path().join("concerts.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_content_is_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("concerts.json");
        fs::write(&path, "{not a json array").unwrap();
        let store = ConcertStore::new(path);
        assert!(store.load().is_err());
    }

    #[test]
    fn test_save_creates_parent_directories_and_reloads() {
        let dir = tempdir().unwrap();
        let store = ConcertStore::new(dir.path().join("public/data/concerts.json"));
        store.save(&[sample()]).unwrap();
        assert_eq!(store.load().unwrap(), vec![sample()]);
    }

    #[test]
    fn test_serialized_shape_matches_store_contract() {
        let dir = tempdir().unwrap();
        let store = ConcertStore::new(dir.path().join("concerts.json"));
        store.save(&[sample()]).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        // camelCase field names, explicit null ticketUrl, absent imageUrl omitted
        assert!(content.contains("\"sourceUrl\""));
        assert!(content.contains("\"ticketUrl\": null"));
        assert!(!content.contains("imageUrl"));
    }
}
