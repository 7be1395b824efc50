use bridge_core::types::{CandidatePath, Document};

use crate::error::{DiscoveryError, NoConnectionReason, Result};

/// The highest-scoring chain; on equal scores the earliest one wins.
pub fn pick_best<I>(chains: I) -> CandidatePath
where
    I: IntoIterator<Item = CandidatePath>,
{
    let mut best: Option<CandidatePath> = None;
    for chain in chains {
        if best.as_ref().map_or(true, |b| chain.score() > b.score()) {
            best = Some(chain);
        }
    }
    best.unwrap_or_default()
}

/// `[start] + middle + [end]`, or `NoConnectionFound` when nothing bridges them.
pub fn assemble(start: Document, end: Document, middle: CandidatePath) -> Result<CandidatePath> {
    if middle.is_empty() {
        return Err(DiscoveryError::NoConnectionFound {
            from: start.title,
            to: end.title,
            reason: NoConnectionReason::Exhausted,
        });
    }
    let mut documents = Vec::with_capacity(middle.len() + 2);
    documents.push(start);
    documents.extend(middle.into_documents());
    documents.push(end);
    let path = CandidatePath::from_documents(documents);
    debug_assert!(path.has_unique_identities(), "assembled path repeats an article");
    Ok(path)
}
