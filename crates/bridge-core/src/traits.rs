use std::time::Duration;

use async_trait::async_trait;

use crate::error::IndexError;
use crate::query::StructuredQuery;
use crate::types::{Document, IndexStatus};

/// Read-only access to a full-text index of documents.
///
/// Implementations must be safe for concurrent use by many in-flight
/// discovery calls. Results keep the index's relevance order, carry no
/// duplicate identities and never exceed `max_results`. No match is
/// `Ok(vec![])`.
#[async_trait]
pub trait IndexClient: Send + Sync {
    async fn search(
        &self,
        query: &StructuredQuery,
        max_results: usize,
        timeout: Duration,
    ) -> Result<Vec<Document>, IndexError>;

    async fn status(&self) -> IndexStatus;
}

/// Fetches a document for a topic the index has never seen.
#[async_trait]
pub trait LazyIngestor: Send + Sync {
    async fn fetch(&self, topic: &str) -> anyhow::Result<Option<Document>>;
}

/// Write side of an index, used to persist lazily fetched documents.
pub trait DocumentSink: Send + Sync {
    /// Insert or replace documents by identity.
    fn upsert(&self, docs: &[Document]) -> anyhow::Result<()>;
}

#[async_trait]
impl<T: IndexClient + ?Sized> IndexClient for std::sync::Arc<T> {
    async fn search(
        &self,
        query: &StructuredQuery,
        max_results: usize,
        timeout: Duration,
    ) -> Result<Vec<Document>, IndexError> {
        (**self).search(query, max_results, timeout).await
    }

    async fn status(&self) -> IndexStatus {
        (**self).status().await
    }
}

#[async_trait]
impl<T: LazyIngestor + ?Sized> LazyIngestor for std::sync::Arc<T> {
    async fn fetch(&self, topic: &str) -> anyhow::Result<Option<Document>> {
        (**self).fetch(topic).await
    }
}

impl<T: DocumentSink + ?Sized> DocumentSink for std::sync::Arc<T> {
    fn upsert(&self, docs: &[Document]) -> anyhow::Result<()> {
        (**self).upsert(docs)
    }
}
