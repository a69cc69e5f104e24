use std::sync::Arc;

use crate::application::interfaces::{EmbeddingProvider, GraphStore};
use crate::domain::error::GraphError;
use crate::domain::models::{Intent, NodeLabel, SearchConfig, SearchResult};

const VECTOR_LABELS: [NodeLabel; 6] = [
    NodeLabel::File,
    NodeLabel::Class,
    NodeLabel::Method,
    NodeLabel::Function,
    NodeLabel::Variable,
    NodeLabel::Interface,
];

/// Embeds a query and runs nearest-neighbour search across every vector
/// label, applying the exact-node-type boost from the parsed intent (spec
/// §4.6, C7). Grounded on `search_code.rs`'s `execute()` and
/// `duckdb_vector_repository.rs`'s `run_semantic`.
pub struct VectorSearchUseCase {
    store: Arc<dyn GraphStore>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl VectorSearchUseCase {
    pub fn new(store: Arc<dyn GraphStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, embedder }
    }

    pub async fn execute(&self, query: &str, intent: &Intent, config: &SearchConfig) -> Result<Vec<SearchResult>, GraphError> {
        let embedding = self.embedder.embed(query).await?;
        let mut results = Vec::new();

        for label in VECTOR_LABELS {
            let hits = self
                .store
                .vector_knn(label, &embedding, config.max_vector_results, config.min_similarity_threshold)
                .await?;

            for hit in hits {
                let Some(node) = self.store.get_node(&hit.node_id).await? else {
                    continue;
                };
                let mut score = hit.similarity;
                if intent.node_types.contains(&label) {
                    score *= config.boost_factor;
                }
                results.push(SearchResult {
                    node_id: node.id().to_string(),
                    label,
                    name: node.name().to_string(),
                    full_name: node.full_name().to_string(),
                    summary: node.generated_summary().map(|s| s.to_string()),
                    score,
                    match_type: "vector".to_string(),
                    related_node_count: 0,
                });
            }
        }

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(config.max_vector_results);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_six_vector_bearing_labels_are_searched() {
        assert_eq!(VECTOR_LABELS.len(), 6);
        assert!(!VECTOR_LABELS.contains(&NodeLabel::Import));
    }
}
