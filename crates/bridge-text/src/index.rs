use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tantivy::{Index, IndexWriter, Term};
use tracing::{debug, info, warn};

use bridge_core::traits::DocumentSink;
use bridge_core::types::{normalize_topic, Document};

use crate::tantivy_utils::{build_schema, register_tokenizer, DocFields};

const WRITER_HEAP_BYTES: usize = 50_000_000;

/// One article record as produced by the download scripts.
///
/// `views` may be a number, a placeholder string or missing; anything that is
/// not an integer becomes unknown popularity.
#[derive(Debug, Deserialize)]
pub struct ArticleRecord {
    pub title: Option<String>,
    #[serde(alias = "content")]
    pub wikipedia_content: Option<String>,
    pub source_url: Option<String>,
    pub views: Option<serde_json::Value>,
}

impl ArticleRecord {
    pub fn into_document(self) -> Option<Document> {
        let title = normalize_topic(self.title.as_deref()?);
        if title.is_empty() {
            return None;
        }
        let popularity = self.views.as_ref().and_then(serde_json::Value::as_i64);
        Some(Document::new(
            title,
            self.wikipedia_content.unwrap_or_default(),
            self.source_url.unwrap_or_default(),
            popularity,
        ))
    }
}

/// Writes documents into a tantivy collection, replacing by identity.
pub struct TantivyIndexer {
    fields: DocFields,
    writer: Mutex<IndexWriter>,
}

impl TantivyIndexer {
    /// Build a brand-new collection, deleting whatever was at `index_dir`.
    pub fn create(index_dir: &Path) -> Result<Self> {
        if index_dir.exists() {
            std::fs::remove_dir_all(index_dir)
                .with_context(|| format!("removing {}", index_dir.display()))?;
        }
        std::fs::create_dir_all(index_dir)?;
        let index = Index::create_in_dir(index_dir, build_schema())?;
        Self::from_index(index)
    }

    /// Open an existing collection, creating it when absent.
    pub fn open_or_create(index_dir: &Path) -> Result<Self> {
        let index = if index_dir.join("meta.json").is_file() {
            Index::open_in_dir(index_dir)?
        } else {
            std::fs::create_dir_all(index_dir)?;
            Index::create_in_dir(index_dir, build_schema())?
        };
        Self::from_index(index)
    }

    fn from_index(index: Index) -> Result<Self> {
        register_tokenizer(&index);
        let fields = DocFields::from_schema(&index.schema()).context("collection schema is missing fields")?;
        let writer = index.writer(WRITER_HEAP_BYTES)?;
        Ok(Self { fields, writer: Mutex::new(writer) })
    }

    /// Upsert documents and commit. Returns the number written.
    pub fn index_documents(&self, docs: &[Document]) -> Result<usize> {
        let mut writer = self.writer.lock().map_err(|_| anyhow::anyhow!("index writer lock poisoned"))?;
        for doc in docs {
            writer.delete_term(Term::from_field_text(self.fields.id, &doc.id));
            writer.add_document(self.fields.to_tantivy(doc))?;
        }
        writer.commit()?;
        debug!(count = docs.len(), "committed documents");
        Ok(docs.len())
    }

    /// Ingest one JSON file holding an array of article records.
    pub fn index_file(&self, path: &Path) -> Result<usize> {
        let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let records: Vec<ArticleRecord> =
            serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
        let total = records.len();
        let docs: Vec<Document> = records.into_iter().filter_map(ArticleRecord::into_document).collect();
        if docs.len() < total {
            warn!(file = %path.display(), skipped = total - docs.len(), "skipped records without a title");
        }
        self.index_documents(&docs)
    }

    /// Ingest every `.json` file under `data_dir`.
    pub fn index_files(&self, data_dir: &Path) -> Result<usize> {
        let mut count = 0;
        for path in list_json_files(data_dir) {
            count += self.index_file(&path)?;
        }
        info!(documents = count, dir = %data_dir.display(), "ingestion complete");
        Ok(count)
    }
}

impl DocumentSink for TantivyIndexer {
    fn upsert(&self, docs: &[Document]) -> anyhow::Result<()> {
        self.index_documents(docs).map(|_| ())
    }
}

pub fn list_json_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}
