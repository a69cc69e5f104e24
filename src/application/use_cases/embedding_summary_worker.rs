use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::warn;

use crate::application::interfaces::{EmbeddingProvider, GraphStore};
use crate::domain::error::GraphError;
use crate::domain::models::{Node, NodeLabel};

const MAX_CONCURRENT_EMBEDDINGS: usize = 5;
const VECTOR_LABELS: [NodeLabel; 6] = [
    NodeLabel::File,
    NodeLabel::Class,
    NodeLabel::Method,
    NodeLabel::Function,
    NodeLabel::Variable,
    NodeLabel::Interface,
];

/// Embeds every node that has a summary (or falls back to raw code / name)
/// and writes the vector back to the store (spec §4.5, §4.6, C6). Only the
/// six labels that carry a vector index get embedded (spec §9 open question),
/// mirroring `neo4j_setup.py`'s `create_vector_indexes`.
pub struct EmbeddingSummaryWorkerUseCase {
    store: Arc<dyn GraphStore>,
    embedder: Arc<dyn EmbeddingProvider>,
}

#[derive(Debug, Clone, Default)]
pub struct EmbeddingRunStats {
    pub embedded: usize,
    pub fallback: usize,
    pub errors: usize,
}

impl EmbeddingSummaryWorkerUseCase {
    pub fn new(store: Arc<dyn GraphStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, embedder }
    }

    pub async fn run_for_label(&self, label: NodeLabel, batch_size: usize) -> Result<EmbeddingRunStats, GraphError> {
        if !VECTOR_LABELS.contains(&label) {
            return Ok(EmbeddingRunStats::default());
        }

        let mut stats = EmbeddingRunStats::default();
        loop {
            let candidates = self.nodes_needing_embeddings(label, batch_size).await?;
            if candidates.is_empty() {
                break;
            }

            let store = &self.store;
            let embedder = &self.embedder;
            let results: Vec<Option<bool>> = stream::iter(candidates.into_iter().map(|node| async move {
                embed_one(store.as_ref(), embedder.as_ref(), &node).await
            }))
            .buffer_unordered(MAX_CONCURRENT_EMBEDDINGS)
            .collect()
            .await;

            for result in results {
                match result {
                    Some(true) => {
                        stats.embedded += 1;
                        stats.fallback += 1;
                    }
                    Some(false) => stats.embedded += 1,
                    None => stats.errors += 1,
                }
            }
        }

        Ok(stats)
    }

    pub async fn run_all(&self, batch_size: usize) -> Result<EmbeddingRunStats, GraphError> {
        let mut total = EmbeddingRunStats::default();
        for label in VECTOR_LABELS {
            let stats = self.run_for_label(label, batch_size).await?;
            total.embedded += stats.embedded;
            total.fallback += stats.fallback;
            total.errors += stats.errors;
        }
        Ok(total)
    }

    async fn nodes_needing_embeddings(&self, label: NodeLabel, batch_size: usize) -> Result<Vec<Node>, GraphError> {
        self.store.nodes_missing_embedding(label, batch_size).await
    }
}

/// Returns `Some(used_fallback)` on success, `None` if embedding failed.
async fn embed_one(store: &dyn GraphStore, embedder: &dyn EmbeddingProvider, node: &Node) -> Option<bool> {
    let (text, used_fallback) = node.embedding_fallback_text();
    match embedder.embed(&text).await {
        Ok(vector) => match store.set_embedding(node.id(), &vector).await {
            Ok(()) => Some(used_fallback),
            Err(err) => {
                warn!("failed to store embedding for {}: {err}", node.id());
                None
            }
        },
        Err(err) => {
            warn!("failed to embed {}: {err}", node.id());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_vector_bearing_labels_are_embedded() {
        assert!(VECTOR_LABELS.contains(&NodeLabel::Function));
        assert!(!VECTOR_LABELS.contains(&NodeLabel::Parameter));
        assert!(!VECTOR_LABELS.contains(&NodeLabel::Directory));
    }
}
