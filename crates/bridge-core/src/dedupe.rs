use std::collections::HashSet;

use crate::types::Document;

/// Keep the first document per identity, preserving order.
pub fn dedupe(docs: Vec<Document>) -> Vec<Document> {
    let before = docs.len();
    let mut seen = HashSet::with_capacity(before);
    let unique: Vec<Document> = docs.into_iter().filter(|d| seen.insert(d.id.clone())).collect();
    if unique.len() < before {
        tracing::debug!(removed = before - unique.len(), "dropped duplicate hits");
    }
    unique
}
