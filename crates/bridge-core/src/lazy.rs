//! Index client wrapper that fills gaps from an external source.
//!
//! When a single-topic query comes back empty, the ingestor is asked for the
//! topic; a fetched document is written to the sink and returned as the hit.
//! Cross-topic queries pass through untouched.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::IndexError;
use crate::query::StructuredQuery;
use crate::traits::{DocumentSink, IndexClient, LazyIngestor};
use crate::types::{Document, IndexStatus};

pub struct LazyIngestingClient<C, L, S> {
    inner: C,
    ingestor: L,
    sink: S,
}

impl<C, L, S> LazyIngestingClient<C, L, S>
where
    C: IndexClient,
    L: LazyIngestor,
    S: DocumentSink,
{
    pub fn new(inner: C, ingestor: L, sink: S) -> Self {
        Self { inner, ingestor, sink }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    async fn fill(&self, topic: &str) -> Vec<Document> {
        let doc = match self.ingestor.fetch(topic).await {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                debug!(topic, "lazy ingestion found nothing");
                return Vec::new();
            }
            Err(e) => {
                warn!(topic, error = %e, "lazy ingestion fetch failed");
                return Vec::new();
            }
        };
        if let Err(e) = self.sink.upsert(std::slice::from_ref(&doc)) {
            warn!(topic, error = %e, "failed to write lazily fetched document");
        } else {
            info!(topic, title = %doc.title, "ingested document on demand");
        }
        vec![doc]
    }
}

#[async_trait]
impl<C, L, S> IndexClient for LazyIngestingClient<C, L, S>
where
    C: IndexClient,
    L: LazyIngestor,
    S: DocumentSink,
{
    async fn search(
        &self,
        query: &StructuredQuery,
        max_results: usize,
        timeout: Duration,
    ) -> Result<Vec<Document>, IndexError> {
        let hits = self.inner.search(query, max_results, timeout).await?;
        if !hits.is_empty() || max_results == 0 {
            return Ok(hits);
        }
        match query.single_topic() {
            Some(topic) => Ok(self.fill(topic).await),
            None => Ok(hits),
        }
    }

    async fn status(&self) -> IndexStatus {
        self.inner.status().await
    }
}
