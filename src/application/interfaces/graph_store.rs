use async_trait::async_trait;

use crate::domain::error::GraphError;
use crate::domain::models::{Edge, GraphStats, LevelProgress, Node, NodeLabel};

/// A single vector-similarity hit (node id, cosine similarity in `[-1, 1]`).
#[derive(Debug, Clone)]
pub struct VectorHit {
    pub node_id: String,
    pub similarity: f32,
}

/// The single narrow port every use case talks to the graph through
/// (spec §9: "model store access as a narrow interface with `session`/`run`
/// and `vector_knn`"). Consolidates what the teacher splits across four
/// repository traits into one, matching the spec's single abstract driver.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Prepares whatever schema (tables, constraints, indexes) the store needs.
    async fn init_schema(&self) -> Result<(), GraphError>;

    /// Upserts a batch of nodes, keyed by `id`.
    async fn upsert_nodes(&self, nodes: &[Node]) -> Result<(), GraphError>;

    /// Upserts a batch of relationships, keyed by `(source_id, type, target_id)`.
    async fn upsert_edges(&self, edges: &[Edge]) -> Result<(), GraphError>;

    /// Removes a file node and everything it (transitively) contains.
    async fn delete_file_subgraph(&self, file_path: &str) -> Result<(), GraphError>;

    async fn get_node(&self, id: &str) -> Result<Option<Node>, GraphError>;

    async fn find_by_name(&self, name: &str, labels: &[NodeLabel], limit: usize) -> Result<Vec<Node>, GraphError>;

    /// Nodes of the given label that still need summarizing, oldest-ready-first,
    /// excluding anything currently leased as `processing` (spec §4.4).
    async fn nodes_ready_for_summary(&self, label: NodeLabel, batch_size: usize) -> Result<Vec<Node>, GraphError>;

    /// Nodes of the given label that have no embedding yet, regardless of
    /// summary status (spec §4.5/§4.6, C6) — distinct from
    /// `nodes_ready_for_summary`, which excludes already-summarized nodes.
    async fn nodes_missing_embedding(&self, label: NodeLabel, batch_size: usize) -> Result<Vec<Node>, GraphError>;

    /// Summaries of a node's direct children via containment edges (spec §4.4).
    async fn child_summaries(&self, node_id: &str) -> Result<Vec<String>, GraphError>;

    /// Summaries of nodes related via reference edges, capped at `limit` (spec §4.4).
    async fn related_summaries(&self, node_id: &str, limit: usize) -> Result<Vec<String>, GraphError>;

    /// True once every summarizable child of `node_id` already has a summary.
    async fn dependencies_ready(&self, node_id: &str) -> Result<bool, GraphError>;

    async fn mark_summary_processing(&self, node_id: &str) -> Result<(), GraphError>;

    async fn set_summary(&self, node_id: &str, summary: &str) -> Result<(), GraphError>;

    async fn set_embedding(&self, node_id: &str, embedding: &[f32]) -> Result<(), GraphError>;

    /// Clears every stale `processing` lease (spec §4.4 recovery operation).
    async fn reset_processing_status(&self) -> Result<usize, GraphError>;

    async fn summarization_progress(&self, label: NodeLabel) -> Result<LevelProgress, GraphError>;

    /// Approximate nearest neighbours by cosine similarity within `label`'s
    /// physical index, above `min_similarity`.
    async fn vector_knn(
        &self,
        label: NodeLabel,
        query_embedding: &[f32],
        k: usize,
        min_similarity: f32,
    ) -> Result<Vec<VectorHit>, GraphError>;

    /// Outgoing or incoming neighbours of `node_id`, used by graph expansion (spec §4.7).
    async fn neighbors(
        &self,
        node_id: &str,
        relationship_types: &[crate::domain::models::RelationshipType],
        incoming: bool,
    ) -> Result<Vec<(Node, crate::domain::models::RelationshipType)>, GraphError>;

    async fn stats(&self) -> Result<GraphStats, GraphError>;

    /// Stored checksum per known file path, used by the change detector (spec §4.2).
    async fn stored_checksums(&self) -> Result<std::collections::HashMap<std::path::PathBuf, String>, GraphError>;
}
