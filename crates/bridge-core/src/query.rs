//! Structured, engine-agnostic queries and the builder that produces them.
//!
//! A [`SpanNear`] clause requires every token of a topic to appear in one
//! field, in order, with no gap, each token allowed up to `fuzziness` edits.
//! Clauses combine with [`StructuredQuery::AnyOf`] / [`StructuredQuery::AllOf`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{identity_of, DocId, Document, Topic};

/// Largest edit distance the index adapters can evaluate.
pub const MAX_FUZZINESS: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    Body,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Body => "body",
        }
    }

    fn text(self, doc: &Document) -> &str {
        match self {
            Field::Title => &doc.title,
            Field::Body => &doc.body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanNear {
    pub topic: String,
    pub field: Field,
    pub tokens: Vec<String>,
    pub fuzziness: u8,
    pub slop: u32,
    pub in_order: bool,
}

impl SpanNear {
    /// Word pieces the field analyzer would produce for the tokens, in order.
    pub fn terms(&self) -> Vec<String> {
        self.tokens.iter().flat_map(|t| tokenize(t)).collect()
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.distance(doc).is_some()
    }

    /// Smallest total edit distance over the windows that match, or `None`.
    pub fn distance(&self, doc: &Document) -> Option<usize> {
        let terms = self.terms();
        if terms.is_empty() {
            return None;
        }
        let words = tokenize(self.field.text(doc));
        let limit = usize::from(self.fuzziness);
        words
            .windows(terms.len())
            .filter_map(|window| {
                window.iter().zip(&terms).try_fold(0usize, |total, (word, term)| {
                    let d = edit_distance(word, term);
                    (d <= limit).then_some(total + d)
                })
            })
            .min()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuredQuery {
    Span(SpanNear),
    AnyOf(Vec<StructuredQuery>),
    AllOf(Vec<StructuredQuery>),
}

impl StructuredQuery {
    /// Evaluate the query against a document in-process.
    pub fn matches(&self, doc: &Document) -> bool {
        self.distance(doc).is_some()
    }

    /// How closely `doc` matches: the best branch of `AnyOf`, the sum over
    /// `AllOf`. `None` when it does not match.
    pub fn distance(&self, doc: &Document) -> Option<usize> {
        match self {
            StructuredQuery::Span(span) => span.distance(doc),
            StructuredQuery::AnyOf(clauses) => clauses.iter().filter_map(|q| q.distance(doc)).min(),
            StructuredQuery::AllOf(clauses) if clauses.is_empty() => None,
            StructuredQuery::AllOf(clauses) => clauses.iter().map(|q| q.distance(doc)).sum(),
        }
    }

    /// Keep the documents that match and order them by closeness.
    ///
    /// Sorted by distance, then documents named by one of the query's topics,
    /// then incoming order.
    pub fn rank(&self, docs: Vec<Document>) -> Vec<Document> {
        let named: Vec<DocId> = self.topics().into_iter().map(identity_of).collect();
        let mut scored: Vec<(usize, bool, Document)> = docs
            .into_iter()
            .filter_map(|doc| {
                let distance = self.distance(&doc)?;
                let unnamed = !named.contains(&doc.id);
                Some((distance, unnamed, doc))
            })
            .collect();
        scored.sort_by_key(|(distance, unnamed, _)| (*distance, *unnamed));
        scored.into_iter().map(|(_, _, doc)| doc).collect()
    }

    /// Distinct topic strings mentioned by the query, in first-seen order.
    pub fn topics(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        self.collect_topics(&mut out);
        out
    }

    fn collect_topics<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            StructuredQuery::Span(span) => {
                if !out.contains(&span.topic.as_str()) {
                    out.push(&span.topic);
                }
            }
            StructuredQuery::AnyOf(clauses) | StructuredQuery::AllOf(clauses) => {
                for q in clauses {
                    q.collect_topics(out);
                }
            }
        }
    }

    /// The single topic this query is about, if it names exactly one.
    pub fn single_topic(&self) -> Option<&str> {
        match self.topics().as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder {
    fuzziness: u8,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self { fuzziness: 1 }
    }
}

impl QueryBuilder {
    pub fn new(fuzziness: u8) -> Result<Self> {
        check_fuzziness(fuzziness)?;
        Ok(Self { fuzziness })
    }

    pub fn span_near(&self, topic: &str, field: Field, fuzziness: u8) -> Result<SpanNear> {
        check_fuzziness(fuzziness)?;
        let topic = Topic::parse(topic)?;
        let tokens: Vec<String> = topic.as_str().split_whitespace().map(str::to_lowercase).collect();
        Ok(SpanNear { topic: topic.as_str().to_string(), field, tokens, fuzziness, slop: 0, in_order: true })
    }

    /// A single span clause against `field`.
    pub fn field_query(&self, topic: &str, field: Field) -> Result<StructuredQuery> {
        Ok(StructuredQuery::Span(self.span_near(topic, field, self.fuzziness)?))
    }

    /// The topic in either the title or the body.
    pub fn topic_query(&self, topic: &str) -> Result<StructuredQuery> {
        Ok(StructuredQuery::AnyOf(vec![
            StructuredQuery::Span(self.span_near(topic, Field::Title, self.fuzziness)?),
            StructuredQuery::Span(self.span_near(topic, Field::Body, self.fuzziness)?),
        ]))
    }

    /// Documents that independently satisfy both topics.
    pub fn cross_query(&self, topic_a: &str, topic_b: &str) -> Result<StructuredQuery> {
        Ok(StructuredQuery::AllOf(vec![self.topic_query(topic_a)?, self.topic_query(topic_b)?]))
    }
}

fn check_fuzziness(fuzziness: u8) -> Result<()> {
    if fuzziness > MAX_FUZZINESS {
        return Err(Error::InvalidInput(format!("fuzziness {fuzziness} exceeds maximum of {MAX_FUZZINESS}")));
    }
    Ok(())
}

/// Split on non-alphanumeric characters and lower-case, like the index
/// analyzer does.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Levenshtein distance where an adjacent transposition costs one edit.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let width = b.len() + 1;
    let mut d = vec![0usize; (a.len() + 1) * width];
    for i in 0..=a.len() {
        d[i * width] = i;
    }
    for (j, cell) in d.iter_mut().enumerate().take(width) {
        *cell = j;
    }
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut best = (d[(i - 1) * width + j] + 1)
                .min(d[i * width + j - 1] + 1)
                .min(d[(i - 1) * width + j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(d[(i - 2) * width + j - 2] + 1);
            }
            d[i * width + j] = best;
        }
    }
    d[a.len() * width + b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_distance_counts_transpositions_once() {
        assert_eq!(edit_distance("llama", "llama"), 0);
        assert_eq!(edit_distance("llama", "lama"), 1);
        assert_eq!(edit_distance("diet", "deit"), 1);
        assert_eq!(edit_distance("", "abc"), 3);
    }

    #[test]
    fn tokenize_splits_punctuation() {
        assert_eq!(tokenize("Pre-Raphaelite, art!"), vec!["pre", "raphaelite", "art"]);
    }
}
