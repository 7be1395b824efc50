//! bridge-text
//!
//! Tantivy-backed document collection: `index` writes article records,
//! `search` serves structured queries through the `IndexClient` capability.

pub mod index;
pub mod search;
pub mod tantivy_utils;

pub use index::{list_json_files, ArticleRecord, TantivyIndexer};
pub use search::TantivyIndexClient;
