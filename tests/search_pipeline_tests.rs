//! End-to-end tests driving the search facade and summarization scheduler
//! over the in-memory graph store double.

use std::sync::Arc;

use codegraph::application::interfaces::GraphStore;
use codegraph::application::use_cases::{EmbeddingSummaryWorkerUseCase, SearchFacadeUseCase, SummarizationSchedulerUseCase};
use codegraph::connector::adapter::{MemoryGraphStore, MockEmbeddingProvider};
use codegraph::domain::models::{Edge, Node, NodeLabel, QueryType, RelationshipType, SearchConfig};

async fn seeded_store() -> Arc<MemoryGraphStore> {
    let store = Arc::new(MemoryGraphStore::new());

    let file = Node::new("file-1".into(), NodeLabel::File, "payment_service.rs".into(), "src/payment_service.rs".into());
    let class = Node::new("class-1".into(), NodeLabel::Class, "PaymentService".into(), "PaymentService".into())
        .with_raw_code("struct PaymentService;");
    let method = Node::new("method-1".into(), NodeLabel::Method, "charge".into(), "PaymentService::charge".into())
        .with_raw_code("fn charge(&self, amount: u64) { /* ... */ }");

    store.upsert_nodes(&[file, class, method]).await.unwrap();
    store
        .upsert_edges(&[
            Edge::new("file-1", "class-1", RelationshipType::Contains),
            Edge::new("class-1", "method-1", RelationshipType::Defines),
        ])
        .await
        .unwrap();

    store
}

#[tokio::test]
async fn summarization_then_embedding_then_search_finds_the_method() {
    let store = seeded_store().await;

    let scheduler = SummarizationSchedulerUseCase::new(store.clone(), Arc::new(StubSummaryProvider));
    scheduler.run().await.expect("summarization run");

    let method = store.get_node("method-1").await.unwrap().expect("method exists");
    assert!(method.has_summary());

    let embedder: Arc<dyn codegraph::application::interfaces::EmbeddingProvider> = Arc::new(MockEmbeddingProvider::new());
    let worker = EmbeddingSummaryWorkerUseCase::new(store.clone(), embedder.clone());
    let stats = worker.run_all(50).await.expect("embedding run");
    assert!(stats.embedded > 0);

    let facade = SearchFacadeUseCase::new(store.clone(), embedder);
    let config = SearchConfig::default();
    let outcome = facade.search("PaymentService::charge", &config).await.expect("search");

    assert!(!outcome.results.is_empty());
    assert!(outcome.results.iter().any(|r| r.node_id == "method-1"));
    // "PaymentService" is an extracted entity and "service" also matches the
    // programming-terms lexicon, so the planner classifies this as Hybrid.
    assert_eq!(outcome.intent.query_type, QueryType::Hybrid);
}

#[tokio::test]
async fn reset_clears_stale_processing_leases() {
    let store = seeded_store().await;
    store.mark_summary_processing("method-1").await.unwrap();

    let scheduler = SummarizationSchedulerUseCase::new(store.clone(), Arc::new(StubSummaryProvider));
    let cleared = scheduler.reset().await.expect("reset");
    assert_eq!(cleared, 1);

    let method = store.get_node("method-1").await.unwrap().expect("method exists");
    assert_eq!(method.summary_status(), codegraph::domain::models::SummaryStatus::Unset);
}

struct StubSummaryProvider;

#[async_trait::async_trait]
impl codegraph::application::interfaces::SummaryProvider for StubSummaryProvider {
    async fn generate(&self, _prompt: &str, _max_tokens: u32, _temperature: f32) -> Result<String, codegraph::domain::error::GraphError> {
        Ok("a stubbed summary".to_string())
    }
}
