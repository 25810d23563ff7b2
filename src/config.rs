use crate::error::{CrawlerError, Result};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize)]
pub struct FeedConfig {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ListingConfig {
    pub url: String,
    /// encoding_rs label for the listing page bytes
    pub encoding: String,
}

#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    pub path: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "https://www.2083.jp/index.rdf".to_string(),
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            url: "https://www.2083.jp/concert/".to_string(),
            encoding: "shift_jis".to_string(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "public/data/concerts.json".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            feed: FeedConfig::default(),
            listing: ListingConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            CrawlerError::Config(format!("Failed to read config file '{config_path}': {e}"))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Store path, with the CONCERTS_JSON environment variable taking
    /// precedence over the config file.
    pub fn store_path(&self) -> String {
        std::env::var("CONCERTS_JSON").unwrap_or_else(|_| self.store.path.clone())
    }
}
