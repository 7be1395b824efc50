//! In-process index over a vector of documents.
//!
//! Evaluates [`StructuredQuery`] with the reference matcher and returns
//! hits ranked by [`StructuredQuery::rank`], insertion order breaking ties.
//! Used by tests and for small corpora that do not need an on-disk index.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;

use crate::dedupe::dedupe;
use crate::error::IndexError;
use crate::query::StructuredQuery;
use crate::traits::{DocumentSink, IndexClient};
use crate::types::{Document, IndexStatus};

#[derive(Debug, Default)]
pub struct MemoryIndex {
    docs: RwLock<Vec<Document>>,
}

impl MemoryIndex {
    pub fn new(docs: Vec<Document>) -> Self {
        Self { docs: RwLock::new(docs) }
    }

    pub fn len(&self) -> usize {
        self.docs.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl IndexClient for MemoryIndex {
    async fn search(
        &self,
        query: &StructuredQuery,
        max_results: usize,
        _timeout: Duration,
    ) -> Result<Vec<Document>, IndexError> {
        let docs = self
            .docs
            .read()
            .map_err(|_| IndexError::Unavailable("memory index lock poisoned".to_string()))?;
        let hits = query.rank(docs.iter().filter(|d| query.matches(d)).cloned().collect());
        let mut hits = dedupe(hits);
        hits.truncate(max_results);
        Ok(hits)
    }

    async fn status(&self) -> IndexStatus {
        match self.docs.read() {
            Ok(docs) => IndexStatus {
                reachable: true,
                provisioned: true,
                document_count: Some(docs.len() as u64),
                error: None,
            },
            Err(_) => IndexStatus { error: Some("lock poisoned".to_string()), ..IndexStatus::default() },
        }
    }
}

impl DocumentSink for MemoryIndex {
    fn upsert(&self, new_docs: &[Document]) -> anyhow::Result<()> {
        let mut docs = self.docs.write().map_err(|_| anyhow::anyhow!("memory index lock poisoned"))?;
        for doc in new_docs {
            match docs.iter_mut().find(|d| d.id == doc.id) {
                Some(existing) => *existing = doc.clone(),
                None => docs.push(doc.clone()),
            }
        }
        Ok(())
    }
}
