use std::sync::Arc;

use codegraph::application::interfaces::GraphStore;
use codegraph::connector::adapter::DuckdbGraphStore;
use codegraph::domain::models::{Edge, Node, NodeLabel, RelationshipType};
use serde_json::json;
use tempfile::tempdir;

fn unit_vector(dim: usize, hot_index: usize) -> Vec<f32> {
    let mut v = vec![0.0; dim];
    v[hot_index] = 1.0;
    v
}

#[tokio::test]
async fn duckdb_graph_store_round_trips_a_node_and_its_embedding() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("graph.duckdb");
    let store = Arc::new(DuckdbGraphStore::new(&db_path).expect("duckdb init"));
    store.init_schema().await.expect("init_schema");

    let node = Node::new("fn-1".into(), NodeLabel::Function, "charge".into(), "PaymentService::charge".into())
        .with_raw_code("fn charge() {}");
    store.upsert_nodes(&[node]).await.expect("upsert_nodes");

    let fetched = store.get_node("fn-1").await.expect("get_node").expect("node exists");
    assert_eq!(fetched.name(), "charge");
    assert_eq!(fetched.full_name(), "PaymentService::charge");

    let embedding = unit_vector(768, 3);
    store.set_embedding("fn-1", &embedding).await.expect("set_embedding");

    let hits = store
        .vector_knn(NodeLabel::Function, &embedding, 5, 0.9)
        .await
        .expect("vector_knn");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].node_id, "fn-1");
    assert!(hits[0].similarity > 0.99);
}

#[tokio::test]
async fn duckdb_graph_store_tracks_file_checksums_for_change_detection() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("graph.duckdb");
    let store = Arc::new(DuckdbGraphStore::new(&db_path).expect("duckdb init"));
    store.init_schema().await.expect("init_schema");

    let file = Node::new("file-1".into(), NodeLabel::File, "auth.rs".into(), "src/auth.rs".into())
        .with_property("path", json!("src/auth.rs"))
        .with_property("checksum", json!("deadbeef"))
        .with_property("language", json!("rust"))
        .with_property("size_bytes", json!(128));
    store.upsert_nodes(&[file]).await.expect("upsert_nodes");

    let checksums = store.stored_checksums().await.expect("stored_checksums");
    assert_eq!(checksums.get(&std::path::PathBuf::from("src/auth.rs")).map(String::as_str), Some("deadbeef"));

    let stats = store.stats().await.expect("stats");
    assert_eq!(stats.file_count, 1);
    assert_eq!(stats.languages.get("rust"), Some(&1));
    assert_eq!(stats.total_size_bytes, 128);
}

#[tokio::test]
async fn duckdb_graph_store_deletes_a_files_subgraph_transitively() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("graph.duckdb");
    let store = Arc::new(DuckdbGraphStore::new(&db_path).expect("duckdb init"));
    store.init_schema().await.expect("init_schema");

    let file = Node::new("file-1".into(), NodeLabel::File, "auth.rs".into(), "src/auth.rs".into())
        .with_property("path", json!("src/auth.rs"));
    let class = Node::new("class-1".into(), NodeLabel::Class, "Auth".into(), "Auth".into());
    let method = Node::new("method-1".into(), NodeLabel::Method, "login".into(), "Auth::login".into());

    store.upsert_nodes(&[file, class, method]).await.expect("upsert_nodes");
    store
        .upsert_edges(&[
            Edge::new("file-1".into(), "class-1".into(), RelationshipType::Contains),
            Edge::new("class-1".into(), "method-1".into(), RelationshipType::Defines),
        ])
        .await
        .expect("upsert_edges");

    store.delete_file_subgraph("src/auth.rs").await.expect("delete_file_subgraph");

    assert!(store.get_node("file-1").await.expect("get_node").is_none());
    assert!(store.get_node("class-1").await.expect("get_node").is_none());
    assert!(store.get_node("method-1").await.expect("get_node").is_none());
}

#[tokio::test]
async fn duckdb_graph_store_summarization_progress_tracks_completed_nodes() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("graph.duckdb");
    let store = Arc::new(DuckdbGraphStore::new(&db_path).expect("duckdb init"));
    store.init_schema().await.expect("init_schema");

    let a = Node::new("p-1".into(), NodeLabel::Parameter, "limit".into(), "fetch::limit".into());
    let b = Node::new("p-2".into(), NodeLabel::Parameter, "offset".into(), "fetch::offset".into());
    store.upsert_nodes(&[a, b]).await.expect("upsert_nodes");

    store.set_summary("p-1", "the page size").await.expect("set_summary");

    let progress = store.summarization_progress(NodeLabel::Parameter).await.expect("progress");
    assert_eq!(progress.total, 2);
    assert_eq!(progress.completed, 1);
    assert_eq!(progress.remaining, 1);
}
