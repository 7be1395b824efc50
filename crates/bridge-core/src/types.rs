//! Domain types shared by the index adapters and the path engine.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Normalized, lower-cased title. Two documents with the same `DocId` are the
/// same article.
pub type DocId = String;

/// Replace underscores with spaces and trim surrounding whitespace.
pub fn normalize_topic(raw: &str) -> String {
    raw.replace('_', " ").trim().to_string()
}

/// Identity key for a title or topic string.
pub fn identity_of(title: &str) -> DocId {
    normalize_topic(title).to_lowercase()
}

/// A user-supplied endpoint, normalized and known to be non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Topic(String);

impl Topic {
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = normalize_topic(raw);
        if normalized.is_empty() {
            return Err(Error::InvalidInput("topic must not be blank".to_string()));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn identity(&self) -> DocId {
        self.0.to_lowercase()
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An indexed article.
///
/// - `id`: identity derived from `title` via [`identity_of`]
/// - `popularity`: page views or similar; `None` or negative means unknown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub title: String,
    pub body: String,
    pub source_url: String,
    pub popularity: Option<i64>,
}

impl Document {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        source_url: impl Into<String>,
        popularity: Option<i64>,
    ) -> Self {
        let title = normalize_topic(&title.into());
        Self { id: identity_of(&title), title, body: body.into(), source_url: source_url.into(), popularity }
    }

    /// Popularity as used for ranking: unknown values count as zero.
    pub fn popularity_score(&self) -> i64 {
        self.popularity.filter(|p| *p > 0).unwrap_or(0)
    }
}

/// Ranking key of a path: document count first, summed popularity second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathScore {
    pub length: usize,
    pub popularity: i64,
}

/// An ordered chain of documents. Identities never repeat in a finished path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePath {
    documents: Vec<Document>,
}

impl CandidatePath {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_documents(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn aggregate_popularity(&self) -> i64 {
        self.documents.iter().map(Document::popularity_score).sum()
    }

    pub fn score(&self) -> PathScore {
        PathScore { length: self.len(), popularity: self.aggregate_popularity() }
    }

    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|d| d.id.as_str())
    }

    pub fn titles(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.title.as_str()).collect()
    }

    /// `left + [middle] + right`.
    pub fn join(left: CandidatePath, middle: Document, right: CandidatePath) -> Self {
        let mut documents = left.documents;
        documents.push(middle);
        documents.extend(right.documents);
        Self { documents }
    }

    /// True when no identity occurs twice.
    pub fn has_unique_identities(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.documents.len());
        self.documents.iter().all(|d| seen.insert(d.id.as_str()))
    }
}

/// Identities already committed to the path under construction.
///
/// Extending produces a new set and leaves the receiver untouched, so sibling
/// branches of a recursive search never see each other's additions.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    ids: Arc<HashSet<DocId>>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn extended<I, S>(&self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<DocId>,
    {
        let mut next = (*self.ids).clone();
        let before = next.len();
        for id in ids {
            next.insert(id.into());
        }
        if next.len() == before {
            return self.clone();
        }
        Self { ids: Arc::new(next) }
    }
}

/// Health of the backing index, as reported by [`crate::traits::IndexClient::status`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStatus {
    pub reachable: bool,
    pub provisioned: bool,
    pub document_count: Option<u64>,
    pub error: Option<String>,
}
