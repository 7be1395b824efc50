use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, Value, STORED, STRING,
};
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, StopWordFilter, TextAnalyzer};
use tantivy::{Index, TantivyDocument, TantivyError};

use bridge_core::query;
use bridge_core::Document;

pub const TOKENIZER: &str = "text_with_stopwords";

pub const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it", "its", "of", "on",
    "that", "the", "to", "was", "will", "with", "or", "but", "not", "this", "these", "they", "them", "their", "there",
    "then", "than", "so", "if", "when", "where", "why", "how", "what", "which", "who", "whom", "whose", "can", "could",
    "should", "would", "may", "might", "must", "shall", "do", "does", "did", "have", "had", "having",
];

pub fn is_stop_word(term: &str) -> bool {
    STOP_WORDS.contains(&term)
}

pub fn build_schema() -> Schema {
    let mut schema_builder = Schema::builder();
    let text_field_indexing = TextFieldIndexing::default()
        .set_tokenizer(TOKENIZER)
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    let text_options = TextOptions::default().set_indexing_options(text_field_indexing).set_stored();
    schema_builder.add_text_field("id", STRING | STORED);
    schema_builder.add_text_field("title", text_options.clone());
    schema_builder.add_text_field("body", text_options);
    schema_builder.add_text_field("source_url", STRING | STORED);
    schema_builder.add_i64_field("popularity", STORED);
    schema_builder.build()
}

pub fn register_tokenizer(index: &Index) {
    let tokenizer = TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(LowerCaser)
        .filter(StopWordFilter::remove(STOP_WORDS.iter().map(|s| (*s).to_string())))
        .build();
    index.tokenizers().register(TOKENIZER, tokenizer);
}

/// Resolved schema fields of a document collection.
#[derive(Debug, Clone, Copy)]
pub struct DocFields {
    pub id: Field,
    pub title: Field,
    pub body: Field,
    pub source_url: Field,
    pub popularity: Field,
}

impl DocFields {
    pub fn from_schema(schema: &Schema) -> Result<Self, TantivyError> {
        Ok(Self {
            id: schema.get_field("id")?,
            title: schema.get_field("title")?,
            body: schema.get_field("body")?,
            source_url: schema.get_field("source_url")?,
            popularity: schema.get_field("popularity")?,
        })
    }

    pub fn text_field(&self, field: query::Field) -> Field {
        match field {
            query::Field::Title => self.title,
            query::Field::Body => self.body,
        }
    }

    pub fn to_tantivy(&self, doc: &Document) -> TantivyDocument {
        let mut out = TantivyDocument::default();
        out.add_text(self.id, &doc.id);
        out.add_text(self.title, &doc.title);
        out.add_text(self.body, &doc.body);
        out.add_text(self.source_url, &doc.source_url);
        if let Some(popularity) = doc.popularity {
            out.add_i64(self.popularity, popularity);
        }
        out
    }

    pub fn from_tantivy(&self, doc: &TantivyDocument) -> Document {
        let text = |field: Field| doc.get_first(field).and_then(|v| v.as_str()).unwrap_or("").to_string();
        let popularity = doc.get_first(self.popularity).and_then(|v| v.as_i64());
        Document::new(text(self.title), text(self.body), text(self.source_url), popularity)
    }
}
