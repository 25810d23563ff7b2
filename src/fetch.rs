use crate::error::Result;
use async_trait::async_trait;
use encoding_rs::Encoding;
use std::time::Duration;

/// Fetch capability injected into sources and the detail resolver.
/// Tests substitute an in-memory implementation.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// reqwest-backed fetcher with a per-request timeout. A timed-out fetch
/// surfaces as an error and callers treat it the same as any failed fetch.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// Decode page bytes into a string. A `charset=` declaration in the head of
/// the document wins when encoding_rs knows its label; otherwise `assumed`
/// is used. The listing and detail pages of the concert site are Shift_JIS,
/// so decoding them as UTF-8 would corrupt every Japanese character before
/// text matching gets a chance to run.
pub fn decode_html(bytes: &[u8], assumed: &'static Encoding) -> String {
    let encoding = sniff_meta_charset(bytes).unwrap_or(assumed);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

/// Look for a charset declaration in the ASCII-compatible prefix of the
/// document, e.g. <meta charset="..."> or the legacy http-equiv form.
fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(1024)]).to_lowercase();
    let pos = head.find("charset=")?;
    let rest = &head[pos + "charset=".len()..];
    let label: String = rest
        .trim_start_matches(&['"', '\''][..])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    Encoding::for_label(label.as_bytes())
}
