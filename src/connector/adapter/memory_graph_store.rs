use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::interfaces::{GraphStore, VectorHit};
use crate::domain::error::GraphError;
use crate::domain::models::{Edge, GraphStats, LevelProgress, Node, NodeLabel, RelationshipType};

/// In-memory `GraphStore` double used for fast unit tests and as the
/// exhaustive-scan-plus-cosine fallback when an ANN index is unavailable
/// (spec §6). Grounded on `in_memory_vector_repository.rs`'s
/// `Mutex<Vec<_>>`-backed double.
#[derive(Default)]
pub struct MemoryGraphStore {
    nodes: Mutex<HashMap<String, Node>>,
    edges: Mutex<Vec<Edge>>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            0.0
        } else {
            dot / (norm_a * norm_b)
        }
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn init_schema(&self) -> Result<(), GraphError> {
        Ok(())
    }

    async fn upsert_nodes(&self, nodes: &[Node]) -> Result<(), GraphError> {
        let mut store = self.nodes.lock().unwrap();
        for node in nodes {
            store.insert(node.id().to_string(), node.clone());
        }
        Ok(())
    }

    async fn upsert_edges(&self, edges: &[Edge]) -> Result<(), GraphError> {
        let mut store = self.edges.lock().unwrap();
        for edge in edges {
            if let Some(existing) = store.iter_mut().find(|e| e.merge_key() == edge.merge_key()) {
                *existing = edge.clone();
            } else {
                store.push(edge.clone());
            }
        }
        Ok(())
    }

    async fn delete_file_subgraph(&self, file_path: &str) -> Result<(), GraphError> {
        let file_id = {
            let nodes = self.nodes.lock().unwrap();
            nodes
                .values()
                .find(|n| n.label() == NodeLabel::File && n.property("path").and_then(|v| v.as_str()) == Some(file_path))
                .map(|n| n.id().to_string())
        };

        let Some(file_id) = file_id else {
            return Ok(());
        };

        let mut to_delete = vec![file_id.clone()];
        let mut frontier = vec![file_id];
        let edges = self.edges.lock().unwrap().clone();
        while let Some(current) = frontier.pop() {
            for edge in &edges {
                if edge.source_id() == current && !to_delete.contains(&edge.target_id().to_string()) {
                    to_delete.push(edge.target_id().to_string());
                    frontier.push(edge.target_id().to_string());
                }
            }
        }

        let mut nodes = self.nodes.lock().unwrap();
        for id in &to_delete {
            nodes.remove(id);
        }
        drop(nodes);

        let mut edges = self.edges.lock().unwrap();
        edges.retain(|e| !to_delete.contains(&e.source_id().to_string()) && !to_delete.contains(&e.target_id().to_string()));
        Ok(())
    }

    async fn get_node(&self, id: &str) -> Result<Option<Node>, GraphError> {
        Ok(self.nodes.lock().unwrap().get(id).cloned())
    }

    async fn find_by_name(&self, name: &str, labels: &[NodeLabel], limit: usize) -> Result<Vec<Node>, GraphError> {
        let nodes = self.nodes.lock().unwrap();
        let mut out: Vec<Node> = nodes
            .values()
            .filter(|n| labels.is_empty() || labels.contains(&n.label()))
            .filter(|n| n.name() == name || n.full_name() == name || n.full_name().contains(name))
            .cloned()
            .collect();
        out.truncate(limit);
        Ok(out)
    }

    async fn nodes_ready_for_summary(&self, label: NodeLabel, batch_size: usize) -> Result<Vec<Node>, GraphError> {
        let nodes = self.nodes.lock().unwrap();
        let mut out: Vec<Node> = nodes
            .values()
            .filter(|n| n.label() == label && !n.has_summary())
            .filter(|n| n.summary_status() != crate::domain::models::SummaryStatus::Processing)
            .cloned()
            .collect();
        out.truncate(batch_size);
        Ok(out)
    }

    async fn nodes_missing_embedding(&self, label: NodeLabel, batch_size: usize) -> Result<Vec<Node>, GraphError> {
        let nodes = self.nodes.lock().unwrap();
        let mut out: Vec<Node> = nodes
            .values()
            .filter(|n| n.label() == label && n.embedding().is_none())
            .cloned()
            .collect();
        out.truncate(batch_size);
        Ok(out)
    }

    async fn child_summaries(&self, node_id: &str) -> Result<Vec<String>, GraphError> {
        let edges = self.edges.lock().unwrap();
        let nodes = self.nodes.lock().unwrap();
        Ok(edges
            .iter()
            .filter(|e| e.source_id() == node_id && e.relationship_type().is_containment())
            .filter_map(|e| nodes.get(e.target_id()))
            .filter_map(|n| n.generated_summary().map(|s| s.to_string()))
            .collect())
    }

    async fn related_summaries(&self, node_id: &str, limit: usize) -> Result<Vec<String>, GraphError> {
        let edges = self.edges.lock().unwrap();
        let nodes = self.nodes.lock().unwrap();
        let mut out: Vec<String> = edges
            .iter()
            .filter(|e| e.source_id() == node_id && e.relationship_type().is_reference())
            .filter_map(|e| nodes.get(e.target_id()))
            .filter_map(|n| n.generated_summary().map(|s| s.to_string()))
            .collect();
        out.truncate(limit);
        Ok(out)
    }

    async fn dependencies_ready(&self, node_id: &str) -> Result<bool, GraphError> {
        let edges = self.edges.lock().unwrap();
        let nodes = self.nodes.lock().unwrap();
        Ok(edges
            .iter()
            .filter(|e| e.source_id() == node_id && e.relationship_type().is_containment())
            .filter_map(|e| nodes.get(e.target_id()))
            .filter(|n| n.label().is_summarizable())
            .all(|n| n.has_summary()))
    }

    async fn mark_summary_processing(&self, node_id: &str) -> Result<(), GraphError> {
        let mut nodes = self.nodes.lock().unwrap();
        if let Some(node) = nodes.get_mut(node_id) {
            node.set_summary_status(crate::domain::models::SummaryStatus::Processing);
        }
        Ok(())
    }

    async fn set_summary(&self, node_id: &str, summary: &str) -> Result<(), GraphError> {
        let mut nodes = self.nodes.lock().unwrap();
        if let Some(node) = nodes.get_mut(node_id) {
            node.set_summary(summary);
        }
        Ok(())
    }

    async fn set_embedding(&self, node_id: &str, embedding: &[f32]) -> Result<(), GraphError> {
        let mut nodes = self.nodes.lock().unwrap();
        if let Some(node) = nodes.get_mut(node_id) {
            node.set_embedding(embedding.to_vec());
        }
        Ok(())
    }

    async fn reset_processing_status(&self) -> Result<usize, GraphError> {
        let mut nodes = self.nodes.lock().unwrap();
        let mut count = 0;
        for node in nodes.values_mut() {
            if node.summary_status() == crate::domain::models::SummaryStatus::Processing {
                node.set_summary_status(crate::domain::models::SummaryStatus::Unset);
                count += 1;
            }
        }
        Ok(count)
    }

    async fn summarization_progress(&self, label: NodeLabel) -> Result<LevelProgress, GraphError> {
        let nodes = self.nodes.lock().unwrap();
        let relevant: Vec<&Node> = nodes.values().filter(|n| n.label() == label).collect();
        let total = relevant.len();
        let completed = relevant.iter().filter(|n| n.has_summary()).count();
        let processing = relevant
            .iter()
            .filter(|n| n.summary_status() == crate::domain::models::SummaryStatus::Processing)
            .count();
        Ok(LevelProgress {
            total,
            completed,
            processing,
            remaining: total.saturating_sub(completed).saturating_sub(processing),
        })
    }

    async fn vector_knn(&self, label: NodeLabel, query_embedding: &[f32], k: usize, min_similarity: f32) -> Result<Vec<VectorHit>, GraphError> {
        let nodes = self.nodes.lock().unwrap();
        let mut hits: Vec<VectorHit> = nodes
            .values()
            .filter(|n| n.label() == label)
            .filter_map(|n| n.embedding().map(|e| (n, e)))
            .map(|(n, e)| VectorHit {
                node_id: n.id().to_string(),
                similarity: Self::cosine_similarity(query_embedding, e),
            })
            .filter(|hit| hit.similarity >= min_similarity)
            .collect();
        hits.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);
        Ok(hits)
    }

    async fn neighbors(&self, node_id: &str, relationship_types: &[RelationshipType], incoming: bool) -> Result<Vec<(Node, RelationshipType)>, GraphError> {
        let edges = self.edges.lock().unwrap();
        let nodes = self.nodes.lock().unwrap();
        let mut out = Vec::new();
        for edge in edges.iter() {
            if !relationship_types.contains(&edge.relationship_type()) {
                continue;
            }
            let matches = if incoming { edge.target_id() == node_id } else { edge.source_id() == node_id };
            if !matches {
                continue;
            }
            let other_id = if incoming { edge.source_id() } else { edge.target_id() };
            if let Some(node) = nodes.get(other_id) {
                out.push((node.clone(), edge.relationship_type()));
            }
        }
        Ok(out)
    }

    async fn stats(&self) -> Result<GraphStats, GraphError> {
        let nodes = self.nodes.lock().unwrap();
        let edges = self.edges.lock().unwrap();
        let mut stats = GraphStats::default();

        for node in nodes.values() {
            *stats.node_counts_by_label.entry(node.label().to_string()).or_insert(0) += 1;
            if node.has_summary() {
                stats.summarized_count += 1;
            }
            if node.embedding().is_some() {
                stats.embedded_count += 1;
            }
            if node.label() == NodeLabel::File {
                stats.file_count += 1;
                if let Some(language) = node.property("language").and_then(|v| v.as_str()) {
                    *stats.languages.entry(language.to_string()).or_insert(0) += 1;
                }
                if let Some(size) = node.property("size_bytes").and_then(|v| v.as_u64()) {
                    stats.total_size_bytes += size;
                }
            }
        }

        for edge in edges.iter() {
            *stats.relationship_counts_by_type.entry(edge.relationship_type().to_string()).or_insert(0) += 1;
        }

        Ok(stats)
    }

    async fn stored_checksums(&self) -> Result<HashMap<PathBuf, String>, GraphError> {
        let nodes = self.nodes.lock().unwrap();
        Ok(nodes
            .values()
            .filter(|n| n.label() == NodeLabel::File)
            .filter_map(|n| {
                let path = n.property("path").and_then(|v| v.as_str())?;
                let checksum = n.property("checksum").and_then(|v| v.as_str())?;
                Some((PathBuf::from(path), checksum.to_string()))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_then_get_round_trips_a_node() {
        let store = MemoryGraphStore::new();
        let node = Node::new("n1".into(), NodeLabel::Function, "f".into(), "mod::f".into());
        store.upsert_nodes(&[node]).await.unwrap();
        let fetched = store.get_node("n1").await.unwrap();
        assert!(fetched.is_some());
        assert_eq!(fetched.unwrap().name(), "f");
    }

    #[tokio::test]
    async fn vector_knn_filters_below_threshold() {
        let store = MemoryGraphStore::new();
        let mut node = Node::new("n1".into(), NodeLabel::Function, "f".into(), "mod::f".into());
        node.set_embedding(vec![1.0, 0.0, 0.0]);
        store.upsert_nodes(&[node]).await.unwrap();

        let hits = store.vector_knn(NodeLabel::Function, &[1.0, 0.0, 0.0], 10, 0.99).await.unwrap();
        assert_eq!(hits.len(), 1);

        let hits = store.vector_knn(NodeLabel::Function, &[0.0, 1.0, 0.0], 10, 0.5).await.unwrap();
        assert!(hits.is_empty());
    }
}
