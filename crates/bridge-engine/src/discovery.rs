//! Recursive cross-reference search between two topics.
//!
//! `connect(a, b)` asks the index for articles mentioning both topics, then
//! for every candidate `m` recursively bridges `a → m` and `m → b` with one
//! less level of budget. The best local chain by `(length, popularity)` is
//! returned to the caller; siblings are never revisited once a level has
//! chosen.

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use bridge_core::config::Settings;
use bridge_core::dedupe;
use bridge_core::query::{Field, QueryBuilder, StructuredQuery};
use bridge_core::traits::IndexClient;
use bridge_core::types::{identity_of, CandidatePath, Document, ExclusionSet, Topic};

use crate::assemble::{assemble, pick_best};
use crate::error::{DiscoveryError, NoConnectionReason, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    pub depth_budget: u32,
    pub max_results: usize,
    pub candidate_limit: usize,
    pub fuzziness: u8,
    pub title_fuzziness: u8,
    pub timeout: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl EngineOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            depth_budget: settings.discovery.depth_budget,
            max_results: settings.search.max_results,
            candidate_limit: settings.search.candidate_limit,
            fuzziness: settings.search.fuzziness,
            title_fuzziness: settings.search.title_fuzziness,
            timeout: settings.search.timeout(),
        }
    }
}

/// Finds bridges between topics over an injected index.
///
/// Holds no per-request state: one engine may serve many concurrent calls.
pub struct PathEngine<C> {
    index: C,
    cross: QueryBuilder,
    title: QueryBuilder,
    options: EngineOptions,
}

impl<C: IndexClient> PathEngine<C> {
    pub fn new(index: C, options: EngineOptions) -> std::result::Result<Self, bridge_core::Error> {
        Ok(Self {
            cross: QueryBuilder::new(options.fuzziness)?,
            title: QueryBuilder::new(options.title_fuzziness)?,
            index,
            options,
        })
    }

    pub fn index(&self) -> &C {
        &self.index
    }

    /// [`Self::discover_path`] with the configured depth budget.
    pub async fn discover(&self, topic_a: &str, topic_b: &str, cancel: &CancellationToken) -> Result<CandidatePath> {
        self.discover_path(topic_a, topic_b, self.options.depth_budget, cancel).await
    }

    /// Resolve both topics and search for the articles that connect them.
    ///
    /// The returned path starts with topic A's article and ends with topic
    /// B's, with at least one connecting article in between.
    pub async fn discover_path(
        &self,
        topic_a: &str,
        topic_b: &str,
        depth_budget: u32,
        cancel: &CancellationToken,
    ) -> Result<CandidatePath> {
        let topic_a = Topic::parse(topic_a)?;
        let topic_b = Topic::parse(topic_b)?;
        if depth_budget == 0 {
            return Err(no_connection(&topic_a, &topic_b, NoConnectionReason::NoBudget));
        }

        let start = self.resolve(&topic_a, &topic_b, cancel).await?;
        let end = self.resolve(&topic_b, &topic_a, cancel).await?;
        if start.id == end.id {
            return Err(DiscoveryError::InvalidInput(bridge_core::Error::InvalidInput(format!(
                "'{topic_a}' and '{topic_b}' resolve to the same article '{}'",
                start.title
            ))));
        }

        let exclusions = ExclusionSet::new().extended([start.id.clone(), end.id.clone()]);
        let middle = self.connect(&start.title, &end.title, depth_budget, exclusions, cancel).await?;
        let path = assemble(start, end, middle)?;
        info!(
            from = %topic_a,
            to = %topic_b,
            depth_budget,
            path = ?path.titles(),
            popularity = path.aggregate_popularity(),
            "bridge found"
        );
        Ok(path)
    }

    /// The canonical article for a topic: the first title hit.
    async fn resolve(&self, topic: &Topic, other: &Topic, cancel: &CancellationToken) -> Result<Document> {
        let query = self.title.field_query(topic.as_str(), Field::Title)?;
        let hits = self.run_query(&query, cancel).await?;
        hits.into_iter().next().ok_or_else(|| {
            debug!(topic = %topic, "no article for topic");
            no_connection(topic, other, NoConnectionReason::EndpointNotFound(topic.to_string()))
        })
    }

    fn connect<'a>(
        &'a self,
        topic_a: &'a str,
        topic_b: &'a str,
        depth: u32,
        exclusions: ExclusionSet,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<CandidatePath>> {
        async move {
            if depth == 0 {
                return Ok(CandidatePath::empty());
            }
            if cancel.is_cancelled() {
                return Err(DiscoveryError::Cancelled);
            }
            let exclusions = exclusions.extended([identity_of(topic_a), identity_of(topic_b)]);

            let query = match self.cross.cross_query(topic_a, topic_b) {
                Ok(query) => query,
                Err(e) => {
                    debug!(topic_a, topic_b, error = %e, "skipping unqueryable pair");
                    return Ok(CandidatePath::empty());
                }
            };
            let candidates: Vec<Document> = self
                .run_query(&query, cancel)
                .await?
                .into_iter()
                .take(self.options.candidate_limit)
                .filter(|d| !exclusions.contains(&d.id))
                .collect();
            debug!(topic_a, topic_b, depth, candidates = candidates.len(), "cross reference");

            let mut chains = Vec::with_capacity(candidates.len());
            for middle in candidates {
                let left = self.connect(topic_a, &middle.title, depth - 1, exclusions.clone(), cancel).await?;
                let right_exclusions = exclusions.extended(left.identities().map(str::to_string));
                let right = self.connect(&middle.title, topic_b, depth - 1, right_exclusions, cancel).await?;
                chains.push(CandidatePath::join(left, middle, right));
            }
            Ok(pick_best(chains))
        }
        .boxed()
    }

    /// Run one index query under the per-query deadline.
    ///
    /// Index failures and timeouts yield no hits; only cancellation is an error.
    async fn run_query(&self, query: &StructuredQuery, cancel: &CancellationToken) -> Result<Vec<Document>> {
        let timeout = self.options.timeout;
        let search = self.index.search(query, self.options.max_results, timeout);
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(DiscoveryError::Cancelled),
            outcome = tokio::time::timeout(timeout, search) => outcome,
        };
        match outcome {
            Err(_) => {
                debug!(?timeout, topics = ?query.topics(), "index query timed out");
                Ok(Vec::new())
            }
            Ok(Err(e)) => {
                debug!(error = %e, topics = ?query.topics(), "index query failed");
                Ok(Vec::new())
            }
            Ok(Ok(hits)) => Ok(dedupe(hits)),
        }
    }
}

fn no_connection(from: &Topic, to: &Topic, reason: NoConnectionReason) -> DiscoveryError {
    DiscoveryError::NoConnectionFound { from: from.to_string(), to: to.to_string(), reason }
}
