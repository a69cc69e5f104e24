use std::collections::HashMap;

/// Aggregate counters over the whole graph (spec §4.9 `stats()`, grounded on
/// `graph_ingestion.py`'s `get_ingestion_summary`).
#[derive(Debug, Clone, Default)]
pub struct GraphStats {
    pub node_counts_by_label: HashMap<String, usize>,
    pub relationship_counts_by_type: HashMap<String, usize>,
    pub file_count: usize,
    pub languages: HashMap<String, usize>,
    pub total_size_bytes: u64,
    pub summarized_count: usize,
    pub embedded_count: usize,
    /// Embeddings generated from raw code or the bare name rather than a
    /// generated summary (spec §9 Open Question on embedding fallback).
    pub fallback_embedding_count: usize,
}

impl GraphStats {
    pub fn total_nodes(&self) -> usize {
        self.node_counts_by_label.values().sum()
    }

    pub fn total_relationships(&self) -> usize {
        self.relationship_counts_by_type.values().sum()
    }
}

/// Per-level progress during summarization (spec §4.4/§10, grounded on
/// `summarization_orchestrator.py`'s `get_summarization_progress`).
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelProgress {
    pub total: usize,
    pub completed: usize,
    pub processing: usize,
    pub remaining: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_sum_across_labels_and_types() {
        let mut stats = GraphStats::default();
        stats.node_counts_by_label.insert("File".into(), 3);
        stats.node_counts_by_label.insert("Function".into(), 7);
        stats.relationship_counts_by_type.insert("CALLS".into(), 12);
        assert_eq!(stats.total_nodes(), 10);
        assert_eq!(stats.total_relationships(), 12);
    }
}
