use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bridge_core::error::IndexError;
use bridge_core::query::StructuredQuery;
use bridge_core::traits::IndexClient;
use bridge_core::types::{Document, IndexStatus};
use bridge_core::MemoryIndex;
use bridge_engine::{DiscoveryError, EngineOptions, NoConnectionReason, PathEngine};
use tokio_util::sync::CancellationToken;

fn doc(title: &str, body: &str, popularity: Option<i64>) -> Document {
    Document::new(title, body, format!("https://en.wikipedia.org/wiki/{title}"), popularity)
}

fn endpoints() -> Vec<Document> {
    vec![
        doc("Astronaut", "A person trained to travel into outer space.", Some(1_200)),
        doc("Llama", "A domesticated camelid of the Andes.", Some(800)),
    ]
}

fn with_endpoints(extra: Vec<Document>) -> MemoryIndex {
    let mut docs = endpoints();
    docs.extend(extra);
    MemoryIndex::new(docs)
}

fn engine<C: IndexClient>(index: C) -> PathEngine<C> {
    PathEngine::new(index, EngineOptions::default()).expect("engine")
}

fn titles(path: &bridge_core::CandidatePath) -> Vec<&str> {
    path.titles()
}

/// Astronaut → Spacesuit → Wool → Alpaca → Llama at depth 2, plus a popular
/// direct link that only ever forms a one-article chain.
fn chain_corpus() -> MemoryIndex {
    with_endpoints(vec![
        doc("Diet", "What an astronaut or a llama eats.", Some(1_000)),
        doc("Wool", "Astronaut blankets are woven from llama fleece.", Some(10)),
        doc("Spacesuit", "An astronaut wears a spacesuit lined with wool.", Some(5)),
        doc("Alpaca", "Alpaca wool is finer than llama fibre.", Some(5)),
    ])
}

#[tokio::test]
async fn astronaut_to_llama_through_diet() {
    let index = with_endpoints(vec![doc("Diet", "What an astronaut or a llama eats.", Some(10))]);
    let engine = engine(index);
    let cancel = CancellationToken::new();

    let path = engine.discover_path("Astronaut", "Llama", 1, &cancel).await.expect("path");
    assert_eq!(titles(&path), vec!["Astronaut", "Diet", "Llama"]);

    let deeper = engine.discover("Astronaut", "Llama", &cancel).await.expect("path");
    assert_eq!(titles(&deeper), vec!["Astronaut", "Diet", "Llama"]);
}

#[tokio::test]
async fn topics_are_normalized_and_fuzzy() {
    let index = with_endpoints(vec![doc("Diet", "What an astronaut or a llama eats.", None)]);
    let path = engine(index)
        .discover_path("  astronaut_ ", "Lama", 1, &CancellationToken::new())
        .await
        .expect("path");
    assert_eq!(titles(&path), vec!["Astronaut", "Diet", "Llama"]);
}

#[tokio::test]
async fn deeper_budget_finds_longer_chain() {
    let engine = engine(chain_corpus());
    let cancel = CancellationToken::new();

    let shallow = engine.discover_path("Astronaut", "Llama", 1, &cancel).await.unwrap();
    assert_eq!(titles(&shallow), vec!["Astronaut", "Diet", "Llama"], "popularity decides at equal length");

    let deep = engine.discover_path("Astronaut", "Llama", 2, &cancel).await.unwrap();
    assert_eq!(titles(&deep), vec!["Astronaut", "Spacesuit", "Wool", "Alpaca", "Llama"]);
}

#[tokio::test]
async fn no_identity_repeats_at_any_depth() {
    let engine = engine(chain_corpus());
    let cancel = CancellationToken::new();
    for depth in 0..=4 {
        match engine.discover_path("Astronaut", "Llama", depth, &cancel).await {
            Ok(path) => assert!(path.has_unique_identities(), "depth {depth}: {:?}", path.titles()),
            Err(DiscoveryError::NoConnectionFound { .. }) => assert_eq!(depth, 0),
            Err(e) => panic!("depth {depth}: {e}"),
        }
    }
}

#[tokio::test]
async fn zero_budget_never_connects() {
    let err = engine(chain_corpus())
        .discover_path("Astronaut", "Llama", 0, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DiscoveryError::NoConnectionFound { reason: NoConnectionReason::NoBudget, .. }));
}

#[tokio::test]
async fn popularity_breaks_ties() {
    let index = with_endpoints(vec![
        doc("Diet", "What an astronaut or a llama eats.", Some(50)),
        doc("Wool", "Astronaut blankets are woven from llama fleece.", Some(100)),
    ]);
    let path = engine(index).discover_path("Astronaut", "Llama", 1, &CancellationToken::new()).await.unwrap();
    assert_eq!(titles(&path), vec!["Astronaut", "Wool", "Llama"]);
}

#[tokio::test]
async fn endpoint_returned_as_candidate_is_excluded() {
    let index = MemoryIndex::new(vec![
        doc("Astronaut", "One astronaut once met a llama.", Some(1_200)),
        doc("Llama", "A llama that met an astronaut.", Some(800)),
        doc("Diet", "What an astronaut or a llama eats.", Some(1)),
    ]);
    let path = engine(index).discover_path("Astronaut", "Llama", 1, &CancellationToken::new()).await.unwrap();
    assert_eq!(titles(&path), vec!["Astronaut", "Diet", "Llama"]);
}

#[tokio::test]
async fn only_endpoints_connecting_is_no_bridge() {
    let index = MemoryIndex::new(vec![
        doc("Astronaut", "One astronaut once met a llama.", None),
        doc("Llama", "A llama that met an astronaut.", None),
    ]);
    let err = engine(index).discover_path("Astronaut", "Llama", 2, &CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, DiscoveryError::NoConnectionFound { reason: NoConnectionReason::Exhausted, .. }));
}

#[tokio::test]
async fn blank_or_identical_topics_are_invalid() {
    let engine = engine(chain_corpus());
    let cancel = CancellationToken::new();
    assert!(matches!(
        engine.discover_path(" ", "Llama", 2, &cancel).await,
        Err(DiscoveryError::InvalidInput(_))
    ));
    assert!(matches!(
        engine.discover_path("Llama", "llama", 2, &cancel).await,
        Err(DiscoveryError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn unknown_topic_reports_missing_endpoint() {
    let err = engine(chain_corpus())
        .discover_path("Astronaut", "Zebra", 2, &CancellationToken::new())
        .await
        .unwrap_err();
    match err {
        DiscoveryError::NoConnectionFound { reason: NoConnectionReason::EndpointNotFound(topic), .. } => {
            assert_eq!(topic, "Zebra");
        }
        other => panic!("unexpected {other:?}"),
    }
}

struct UnavailableIndex;

#[async_trait]
impl IndexClient for UnavailableIndex {
    async fn search(&self, _q: &StructuredQuery, _n: usize, _t: Duration) -> Result<Vec<Document>, IndexError> {
        Err(IndexError::Unavailable("connection refused".to_string()))
    }

    async fn status(&self) -> IndexStatus {
        IndexStatus::default()
    }
}

#[tokio::test]
async fn unavailable_index_is_no_bridge_not_a_fault() {
    let err = engine(UnavailableIndex)
        .discover_path("Astronaut", "Llama", 2, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DiscoveryError::NoConnectionFound { .. }));
}

/// Serves title lookups from memory and misbehaves on cross-topic queries.
struct CrossQueriesFail {
    inner: MemoryIndex,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl CrossQueriesFail {
    fn failing(inner: MemoryIndex) -> Self {
        Self { inner, delay: None, calls: AtomicUsize::new(0) }
    }

    fn slow(inner: MemoryIndex, delay: Duration) -> Self {
        Self { inner, delay: Some(delay), calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl IndexClient for CrossQueriesFail {
    async fn search(&self, q: &StructuredQuery, n: usize, t: Duration) -> Result<Vec<Document>, IndexError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if q.single_topic().is_some() {
            return self.inner.search(q, n, t).await;
        }
        match self.delay {
            Some(delay) => {
                tokio::time::sleep(delay).await;
                self.inner.search(q, n, t).await
            }
            None => Err(IndexError::NotProvisioned("wikipedia".to_string())),
        }
    }

    async fn status(&self) -> IndexStatus {
        self.inner.status().await
    }
}

#[tokio::test]
async fn failed_cross_queries_exhaust_the_search() {
    let index = CrossQueriesFail::failing(chain_corpus());
    let err = engine(index).discover_path("Astronaut", "Llama", 2, &CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, DiscoveryError::NoConnectionFound { reason: NoConnectionReason::Exhausted, .. }));
}

#[tokio::test]
async fn slow_query_is_treated_as_timeout() {
    let index = CrossQueriesFail::slow(chain_corpus(), Duration::from_secs(30));
    let options = EngineOptions { timeout: Duration::from_millis(50), ..EngineOptions::default() };
    let engine = PathEngine::new(index, options).unwrap();
    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        engine.discover_path("Astronaut", "Llama", 2, &CancellationToken::new()),
    )
    .await
    .expect("discovery must not hang on a slow index");
    assert!(matches!(outcome, Err(DiscoveryError::NoConnectionFound { reason: NoConnectionReason::Exhausted, .. })));
}

#[tokio::test]
async fn cancelled_token_stops_discovery() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = engine(chain_corpus()).discover_path("Astronaut", "Llama", 2, &cancel).await.unwrap_err();
    assert!(matches!(err, DiscoveryError::Cancelled));
}

#[tokio::test]
async fn cancellation_interrupts_in_flight_query() {
    let index = CrossQueriesFail::slow(chain_corpus(), Duration::from_secs(30));
    let engine = engine(index);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });
    let outcome = tokio::time::timeout(Duration::from_secs(5), engine.discover_path("Astronaut", "Llama", 2, &cancel))
        .await
        .expect("cancellation must be prompt");
    assert!(matches!(outcome, Err(DiscoveryError::Cancelled)));
}

#[tokio::test]
async fn depth_one_issues_a_single_cross_query() {
    let index = CrossQueriesFail::slow(chain_corpus(), Duration::ZERO);
    let engine = engine(index);
    engine.discover_path("Astronaut", "Llama", 1, &CancellationToken::new()).await.unwrap();
    assert_eq!(engine.index().calls.load(Ordering::SeqCst), 3, "two title lookups and one cross query");
}

#[tokio::test]
async fn concurrent_discoveries_are_independent() {
    let engine = Arc::new(engine(chain_corpus()));
    let cancel = CancellationToken::new();
    let (a, b) = tokio::join!(
        engine.discover_path("Astronaut", "Llama", 2, &cancel),
        engine.discover_path("Astronaut", "Llama", 1, &cancel),
    );
    assert_eq!(a.unwrap().len(), 5);
    assert_eq!(b.unwrap().len(), 3);
}

#[tokio::test]
async fn excluded_hits_still_use_candidate_slots() {
    let corpus = || {
        MemoryIndex::new(vec![
            doc("Astronaut", "One astronaut once met a llama.", Some(1_200)),
            doc("Llama", "A llama that met an astronaut.", Some(800)),
            doc("Diet", "What an astronaut or a llama eats.", Some(1)),
        ])
    };
    let cancel = CancellationToken::new();

    let tight = EngineOptions { candidate_limit: 2, ..EngineOptions::default() };
    let err = PathEngine::new(corpus(), tight)
        .unwrap()
        .discover_path("Astronaut", "Llama", 1, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, DiscoveryError::NoConnectionFound { reason: NoConnectionReason::Exhausted, .. }));

    let roomy = EngineOptions { candidate_limit: 3, ..EngineOptions::default() };
    let path =
        PathEngine::new(corpus(), roomy).unwrap().discover_path("Astronaut", "Llama", 1, &cancel).await.unwrap();
    assert_eq!(titles(&path), vec!["Astronaut", "Diet", "Llama"]);
}
