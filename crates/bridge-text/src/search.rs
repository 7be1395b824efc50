use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, EmptyQuery, FuzzyTermQuery, Occur, Query, TermQuery};
use tantivy::schema::IndexRecordOption;
use tantivy::{Index, IndexReader, ReloadPolicy, TantivyDocument, Term};
use tracing::{debug, warn};

use bridge_core::dedupe;
use bridge_core::error::IndexError;
use bridge_core::query::StructuredQuery;
use bridge_core::traits::IndexClient;
use bridge_core::types::{Document, IndexStatus};

use crate::tantivy_utils::{is_stop_word, register_tokenizer, DocFields};

/// Candidates fetched per requested result on each page of scored hits.
const OVERFETCH: usize = 4;
const MAX_PAGE: usize = 1_000;

/// Score multiplier for an exact spelling over its fuzzy neighbours.
const EXACT_BOOST: f32 = 2.0;

/// Read side of a tantivy collection living at `<root>/<collection>`.
///
/// The collection is opened lazily on first use and then shared by every
/// search; a missing root reports `Unavailable`, a missing collection
/// `NotProvisioned`.
pub struct TantivyIndexClient {
    root: PathBuf,
    collection: String,
    opened: RwLock<Option<Arc<OpenedIndex>>>,
}

struct OpenedIndex {
    reader: IndexReader,
    fields: DocFields,
}

impl TantivyIndexClient {
    pub fn new(root: impl Into<PathBuf>, collection: impl Into<String>) -> Self {
        Self { root: root.into(), collection: collection.into(), opened: RwLock::new(None) }
    }

    /// Client for a collection directory, as produced by `Config::index_dir`.
    pub fn for_dir(dir: &Path) -> Self {
        let root = dir.parent().map(Path::to_path_buf).unwrap_or_default();
        let collection = dir.file_name().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
        Self::new(root, collection)
    }

    pub fn collection_dir(&self) -> PathBuf {
        self.root.join(&self.collection)
    }

    fn open(&self) -> Result<Arc<OpenedIndex>, IndexError> {
        if let Ok(guard) = self.opened.read() {
            if let Some(opened) = guard.as_ref() {
                return Ok(Arc::clone(opened));
            }
        }
        if !self.root.is_dir() {
            return Err(IndexError::Unavailable(format!("index root {} does not exist", self.root.display())));
        }
        let dir = self.collection_dir();
        if !dir.join("meta.json").is_file() {
            return Err(IndexError::NotProvisioned(format!("collection '{}' does not exist", self.collection)));
        }
        let index = Index::open_in_dir(&dir).map_err(|e| IndexError::Unavailable(e.to_string()))?;
        register_tokenizer(&index);
        let fields = DocFields::from_schema(&index.schema())
            .map_err(|e| IndexError::NotProvisioned(format!("collection '{}': {}", self.collection, e)))?;
        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .map_err(|e: tantivy::TantivyError| IndexError::Unavailable(e.to_string()))?;
        let opened = Arc::new(OpenedIndex { reader, fields });
        if let Ok(mut guard) = self.opened.write() {
            *guard = Some(Arc::clone(&opened));
        }
        Ok(opened)
    }
}

impl OpenedIndex {
    fn run(&self, query: &StructuredQuery, max_results: usize) -> Result<Vec<Document>, IndexError> {
        if max_results == 0 {
            return Ok(Vec::new());
        }
        let tantivy_query = to_tantivy_query(query, &self.fields);
        let searcher = self.reader.searcher();
        let page = max_results.saturating_mul(OVERFETCH).min(MAX_PAGE);
        let mut fetched = 0;
        let mut verified = Vec::new();
        loop {
            let top_docs = searcher
                .search(tantivy_query.as_ref(), &TopDocs::with_limit(page).and_offset(fetched))
                .map_err(|e| IndexError::Unavailable(e.to_string()))?;
            let page_len = top_docs.len();
            fetched += page_len;
            for (_score, addr) in top_docs {
                let doc: TantivyDocument = searcher.doc(addr).map_err(|e| IndexError::Unavailable(e.to_string()))?;
                let doc = self.fields.from_tantivy(&doc);
                if query.matches(&doc) {
                    verified.push(doc);
                }
            }
            if verified.len() >= max_results || page_len < page {
                break;
            }
        }
        let mut hits = dedupe(query.rank(verified));
        hits.truncate(max_results);
        debug!(fetched, kept = hits.len(), "tantivy search");
        Ok(hits)
    }
}

/// Translate a structured query into tantivy clauses.
///
/// Spans become a conjunction of terms, each matching fuzzily with a boosted
/// exact alternative; word order and adjacency are checked afterwards against
/// stored text. Stop words are not indexed and so are left out of the term
/// clauses.
fn to_tantivy_query(query: &StructuredQuery, fields: &DocFields) -> Box<dyn Query> {
    match query {
        StructuredQuery::Span(span) => {
            let field = fields.text_field(span.field);
            let clauses: Vec<(Occur, Box<dyn Query>)> = span
                .terms()
                .into_iter()
                .filter(|t| !is_stop_word(t))
                .map(|t| {
                    let term = Term::from_field_text(field, &t);
                    let exact: Box<dyn Query> = Box::new(BoostQuery::new(
                        Box::new(TermQuery::new(term.clone(), IndexRecordOption::WithFreqs)),
                        EXACT_BOOST,
                    ));
                    let fuzzy: Box<dyn Query> = Box::new(FuzzyTermQuery::new(term, span.fuzziness, true));
                    let q: Box<dyn Query> =
                        Box::new(BooleanQuery::new(vec![(Occur::Should, exact), (Occur::Should, fuzzy)]));
                    (Occur::Must, q)
                })
                .collect();
            boolean_or_empty(clauses)
        }
        StructuredQuery::AnyOf(clauses) => {
            boolean_or_empty(clauses.iter().map(|c| (Occur::Should, to_tantivy_query(c, fields))).collect())
        }
        StructuredQuery::AllOf(clauses) => {
            boolean_or_empty(clauses.iter().map(|c| (Occur::Must, to_tantivy_query(c, fields))).collect())
        }
    }
}

fn boolean_or_empty(clauses: Vec<(Occur, Box<dyn Query>)>) -> Box<dyn Query> {
    if clauses.is_empty() {
        Box::new(EmptyQuery)
    } else {
        Box::new(BooleanQuery::new(clauses))
    }
}

#[async_trait]
impl IndexClient for TantivyIndexClient {
    async fn search(
        &self,
        query: &StructuredQuery,
        max_results: usize,
        timeout: Duration,
    ) -> Result<Vec<Document>, IndexError> {
        let opened = self.open()?;
        let query = query.clone();
        let task = tokio::task::spawn_blocking(move || opened.run(&query, max_results));
        match tokio::time::timeout(timeout, task).await {
            Err(_) => {
                warn!(?timeout, "tantivy search timed out");
                Err(IndexError::Timeout(timeout))
            }
            Ok(Err(join_error)) => Err(IndexError::Unavailable(join_error.to_string())),
            Ok(Ok(result)) => result,
        }
    }

    async fn status(&self) -> IndexStatus {
        match self.open() {
            Ok(opened) => IndexStatus {
                reachable: true,
                provisioned: true,
                document_count: Some(opened.reader.searcher().num_docs()),
                error: None,
            },
            Err(e @ IndexError::NotProvisioned(_)) => {
                IndexStatus { reachable: true, error: Some(e.to_string()), ..IndexStatus::default() }
            }
            Err(e) => IndexStatus { error: Some(e.to_string()), ..IndexStatus::default() },
        }
    }
}
