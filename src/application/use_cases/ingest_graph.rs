use std::sync::Arc;

use tracing::{error, info};

use crate::application::interfaces::GraphStore;
use crate::domain::error::GraphError;
use crate::domain::models::Fragment;

const DEFAULT_BATCH_SIZE: usize = 1000;

#[derive(Debug, Clone, Default)]
pub struct IngestionStats {
    pub nodes_upserted: usize,
    pub relationships_upserted: usize,
    pub fragments_processed: usize,
    pub errors: usize,
}

/// Writes parser fragments into the graph store in batches, isolating a
/// single fragment's failure from the rest (spec §4.3, C4). Grounded on
/// `graph_ingestion.py`'s batch/label-grouping MERGE pattern and the
/// teacher's per-file error isolation in `call_graph.rs`.
pub struct IngestGraphUseCase {
    store: Arc<dyn GraphStore>,
    batch_size: usize,
}

impl IngestGraphUseCase {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            store,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub async fn execute(&self, fragments: &[Fragment]) -> IngestionStats {
        let mut stats = IngestionStats::default();

        for fragment in fragments {
            if !fragment.is_supported_version() {
                error!(
                    "rejecting fragment for {}: unsupported version {}",
                    fragment.language, fragment.version
                );
                stats.errors += 1;
                continue;
            }

            match self.ingest_one(fragment).await {
                Ok((nodes, edges)) => {
                    stats.nodes_upserted += nodes;
                    stats.relationships_upserted += edges;
                    stats.fragments_processed += 1;
                }
                Err(err) => {
                    error!("failed to ingest fragment for {}: {err}", fragment.language);
                    stats.errors += 1;
                }
            }
        }

        info!(
            "ingestion complete: {} nodes, {} relationships across {} fragments ({} errors)",
            stats.nodes_upserted, stats.relationships_upserted, stats.fragments_processed, stats.errors
        );
        stats
    }

    async fn ingest_one(&self, fragment: &Fragment) -> Result<(usize, usize), GraphError> {
        let mut nodes_done = 0;
        for batch in fragment.nodes.chunks(self.batch_size) {
            self.store.upsert_nodes(batch).await?;
            nodes_done += batch.len();
        }

        let mut edges_done = 0;
        for batch in fragment.relationships.chunks(self.batch_size) {
            self.store.upsert_edges(batch).await?;
            edges_done += batch.len();
        }

        Ok((nodes_done, edges_done))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unsupported_fragment_versions_without_panicking() {
        let mut fragment = Fragment::new("python");
        fragment.version = "0.1.0".to_string();
        assert!(!fragment.is_supported_version());
    }
}
