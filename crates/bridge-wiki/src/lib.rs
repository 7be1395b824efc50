//! bridge-wiki
//!
//! On-demand article fetcher backed by a REST page-summary endpoint, used to
//! fill topics the local index has never seen.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use bridge_core::config::LazyIngestSettings;
use bridge_core::traits::LazyIngestor;
use bridge_core::types::{normalize_topic, Document};

#[derive(Debug, Default, Deserialize)]
pub struct PageSummary {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub extract: String,
    #[serde(default)]
    pub content_urls: Option<ContentUrls>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContentUrls {
    pub desktop: Option<PageUrl>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageUrl {
    pub page: Option<String>,
}

impl PageSummary {
    /// Only standard pages with a non-empty extract become documents;
    /// disambiguation and missing pages are ignored.
    pub fn into_document(self, topic: &str) -> Option<Document> {
        let title = normalize_topic(topic);
        if self.kind != "standard" || self.extract.trim().is_empty() || title.is_empty() {
            return None;
        }
        let url = self.content_urls.and_then(|c| c.desktop).and_then(|d| d.page).unwrap_or_default();
        Some(Document::new(title, self.extract, url, None))
    }
}

pub struct WikiSummaryFetcher {
    client: reqwest::Client,
    endpoint: reqwest::Url,
}

impl WikiSummaryFetcher {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = reqwest::Url::parse(endpoint)?;
        if endpoint.cannot_be_a_base() {
            return Err(anyhow!("summary endpoint '{}' cannot be a base URL", endpoint));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn from_settings(settings: &LazyIngestSettings) -> Result<Self> {
        Self::new(&settings.endpoint, Duration::from_secs(settings.timeout_secs))
    }

    /// Summary URL for a topic; the topic becomes one percent-encoded segment.
    pub fn summary_url(&self, topic: &str) -> Result<reqwest::Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("summary endpoint cannot be a base URL"))?
            .pop_if_empty()
            .push(&normalize_topic(topic));
        Ok(url)
    }
}

#[async_trait]
impl LazyIngestor for WikiSummaryFetcher {
    async fn fetch(&self, topic: &str) -> Result<Option<Document>> {
        let url = self.summary_url(topic)?;
        debug!(%url, "fetching page summary");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(topic, %status, "summary endpoint returned no page");
            return Ok(None);
        }
        let summary: PageSummary = response.json().await?;
        let doc = summary.into_document(topic);
        if doc.is_none() {
            debug!(topic, "summary has no usable content");
        }
        Ok(doc)
    }
}
