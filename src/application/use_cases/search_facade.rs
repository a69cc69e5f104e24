use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::application::interfaces::{EmbeddingProvider, GraphStore};
use crate::domain::error::GraphError;
use crate::domain::models::{
    CallDirection, CallHierarchy, GraphContext, InheritanceHierarchy, Intent, Node, NodeLabel, SearchConfig, SearchResult,
    TraversalSummary,
};

use super::graph_expansion::GraphExpansionUseCase;
use super::query_planner::QueryPlannerUseCase;
use super::vector_search::VectorSearchUseCase;

/// The final answer to a search query: ranked results, the intent that
/// produced them, and any expanded context (spec §4.8-§4.9).
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub intent: Intent,
    pub results: Vec<SearchResult>,
    pub context: Option<GraphContext>,
}

/// The single entry point search goes through: parses the query, dispatches
/// to vector and/or entity-name search depending on query type, merges and
/// scores the results, and optionally expands graph context (spec §4.8-§4.9,
/// C10). Grounded on `search_code.rs` plus `container.rs`'s
/// `search_use_case()` composition, consolidating what the teacher builds as
/// separate RRF-fuse/reranking/query-expansion stages into the spec's own
/// multiplicative scoring formula.
pub struct SearchFacadeUseCase {
    store: Arc<dyn GraphStore>,
    planner: QueryPlannerUseCase,
    vector_search: VectorSearchUseCase,
    expansion: GraphExpansionUseCase,
}

impl SearchFacadeUseCase {
    pub fn new(store: Arc<dyn GraphStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            vector_search: VectorSearchUseCase::new(store.clone(), embedder),
            expansion: GraphExpansionUseCase::new(store.clone()),
            planner: QueryPlannerUseCase::new(),
            store,
        }
    }

    pub async fn search(&self, query: &str, config: &SearchConfig) -> Result<SearchOutcome, GraphError> {
        let intent = self.planner.parse(query);

        let mut by_node: HashMap<String, SearchResult> = HashMap::new();

        let needs_vector = matches!(
            intent.query_type,
            crate::domain::models::QueryType::Semantic
                | crate::domain::models::QueryType::Hybrid
                | crate::domain::models::QueryType::Contextual
        );
        if needs_vector {
            for hit in self.vector_search.execute(query, &intent, config).await? {
                merge_result(&mut by_node, hit);
            }
        }

        let needs_entity = matches!(
            intent.query_type,
            crate::domain::models::QueryType::Entity | crate::domain::models::QueryType::Hybrid
        );
        if needs_entity {
            for entity in &intent.entities {
                let nodes = self
                    .store
                    .find_by_name(entity, &intent.node_types, config.max_entity_results)
                    .await?;
                for node in nodes {
                    let base = if node.name() == entity {
                        1.0
                    } else if node.full_name() == entity {
                        0.9
                    } else if node.name().contains(entity.as_str()) || node.full_name().contains(entity.as_str()) {
                        0.8
                    } else {
                        0.7
                    };
                    merge_result(
                        &mut by_node,
                        SearchResult {
                            node_id: node.id().to_string(),
                            label: node.label(),
                            name: node.name().to_string(),
                            full_name: node.full_name().to_string(),
                            summary: node.generated_summary().map(|s| s.to_string()),
                            score: base * config.boost_entity_matches,
                            match_type: "entity".to_string(),
                            related_node_count: 0,
                        },
                    );
                }
            }
        }

        let mut results: Vec<SearchResult> = by_node.into_values().collect();

        let mut context = None;
        if config.enable_context_expansion && intent.expand_context {
            let top: Vec<SearchResult> = results.iter().take(10).cloned().collect();
            let top_ids: HashSet<String> = top.iter().map(|r| r.node_id.clone()).collect();
            let mut expanded = self.expansion.expand(&top, config.max_expansion_depth).await?;

            let mut hierarchy_nodes = Vec::new();
            if config.expand_call_hierarchy {
                for result in top.iter().filter(|r| matches!(r.label, NodeLabel::Method | NodeLabel::Function)) {
                    let hierarchy = self.expansion.call_hierarchy(&result.node_id, CallDirection::Both, config.max_expansion_depth).await?;
                    hierarchy_nodes.extend(hierarchy.callers);
                    hierarchy_nodes.extend(hierarchy.callees);
                }
            }
            if config.expand_inheritance {
                for result in top.iter().filter(|r| matches!(r.label, NodeLabel::Class | NodeLabel::Interface)) {
                    let hierarchy = self.expansion.inheritance_hierarchy(&result.node_id).await?;
                    hierarchy_nodes.extend(hierarchy.ancestors);
                    hierarchy_nodes.extend(hierarchy.descendants);
                }
            }
            if !hierarchy_nodes.is_empty() {
                let mut all_nodes = expanded.nodes.clone();
                all_nodes.extend(hierarchy_nodes);
                expanded.summary = TraversalSummary::from_nodes(&all_nodes);
            }

            // §4.8: the context term uses the shared context's total size for
            // every expanded result, not a per-node neighbor count.
            let related_count = expanded.nodes.len();
            for result in results.iter_mut().filter(|r| top_ids.contains(&r.node_id)) {
                result.related_node_count = related_count;
            }
            context = Some(expanded);
        }

        for result in &mut results {
            result.score = score_result(result, &intent, config);
        }

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(config.max_total_results);

        Ok(SearchOutcome {
            intent,
            results,
            context,
        })
    }

    /// Returns the same outcome plus a human-readable rationale per result,
    /// for the `explain` CLI command (spec §6, §4.8's `explain_search`).
    pub async fn explain(&self, query: &str, config: &SearchConfig) -> Result<(SearchOutcome, Vec<String>), GraphError> {
        let outcome = self.search(query, config).await?;
        let explanations = outcome
            .results
            .iter()
            .map(|r| {
                format!(
                    "{} ({}): matched via {}, score {:.3}, {} related nodes",
                    r.full_name, r.label, r.match_type, r.score, r.related_node_count
                )
            })
            .collect();
        Ok((outcome, explanations))
    }

    /// Callers/callees of a node along `CALLS` edges (spec §4.7/§4.9).
    pub async fn call_hierarchy(&self, node_id: &str, direction: CallDirection, max_depth: usize) -> Result<CallHierarchy, GraphError> {
        self.expansion.call_hierarchy(node_id, direction, max_depth).await
    }

    /// Ancestors/descendants of a node along `EXTENDS`/`IMPLEMENTS` edges
    /// (spec §4.7/§4.9).
    pub async fn inheritance_hierarchy(&self, node_id: &str) -> Result<InheritanceHierarchy, GraphError> {
        self.expansion.inheritance_hierarchy(node_id).await
    }

    /// The full stored record for a single node (spec §4.9).
    pub async fn node_details(&self, node_id: &str) -> Result<Option<Node>, GraphError> {
        self.store.get_node(node_id).await
    }
}

fn merge_result(by_node: &mut HashMap<String, SearchResult>, incoming: SearchResult) {
    by_node
        .entry(incoming.node_id.clone())
        .and_modify(|existing| {
            if !existing.matched_by(&incoming.match_type) {
                existing.match_type = format!("{}+{}", existing.match_type, incoming.match_type);
            }
            if incoming.score > existing.score {
                existing.score = incoming.score;
            }
        })
        .or_insert(incoming);
}

/// The final hybrid score formula (spec §4.8), grounded verbatim on
/// `hybrid_search.py`'s `_calculate_hybrid_score`.
fn score_result(result: &SearchResult, intent: &Intent, config: &SearchConfig) -> f32 {
    let mut score = result.score;

    let is_exact = intent.entities.iter().any(|e| e == &result.name || e == &result.full_name);
    if is_exact {
        score *= config.boost_exact_matches;
    }

    score *= intent.confidence;

    if intent.node_types.contains(&result.label) {
        score *= config.node_type_match_boost;
    }

    if result.is_multi_match() {
        score *= config.multi_match_boost;
    }

    if result.related_node_count > 0 {
        score += (result.related_node_count as f32 * config.context_boost_factor).min(config.context_boost_cap);
    }

    score.min(config.final_score_cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::NodeLabel;

    fn result(match_type: &str, score: f32) -> SearchResult {
        SearchResult {
            node_id: "n1".into(),
            label: NodeLabel::Function,
            name: "charge".into(),
            full_name: "PaymentService::charge".into(),
            summary: None,
            score,
            match_type: match_type.to_string(),
            related_node_count: 0,
        }
    }

    fn intent(confidence: f32, entities: Vec<&str>) -> Intent {
        Intent {
            query_type: crate::domain::models::QueryType::Hybrid,
            entities: entities.into_iter().map(String::from).collect(),
            node_types: vec![],
            semantic_terms: vec![],
            confidence,
            expand_context: false,
        }
    }

    #[test]
    fn score_is_capped_at_the_configured_ceiling() {
        let config = SearchConfig::default();
        let r = result("vector+entity", 2.0);
        let i = intent(1.0, vec!["PaymentService::charge"]);
        assert_eq!(score_result(&r, &i, &config), config.final_score_cap);
    }

    #[test]
    fn merge_result_concatenates_match_types_and_keeps_max_score() {
        let mut by_node = HashMap::new();
        merge_result(&mut by_node, result("vector", 0.7));
        merge_result(&mut by_node, result("entity", 0.9));
        let merged = &by_node["n1"];
        assert_eq!(merged.match_type, "vector+entity");
        assert_eq!(merged.score, 0.9);
    }
}
