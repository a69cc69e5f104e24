use std::collections::HashMap;

use super::edge::RelationshipType;
use super::node::NodeLabel;

/// A single scored hit returned by the search facade (spec §4.8-§4.9).
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub node_id: String,
    pub label: NodeLabel,
    pub name: String,
    pub full_name: String,
    pub summary: Option<String>,
    pub score: f32,
    /// "+"-joined match sources, e.g. `"vector+entity"` (spec §4.8, grounded
    /// on `hybrid_search.py`'s `_merge_and_score_results`).
    pub match_type: String,
    pub related_node_count: usize,
}

impl SearchResult {
    pub fn matched_by(&self, source: &str) -> bool {
        self.match_type.split('+').any(|part| part == source)
    }

    pub fn is_multi_match(&self) -> bool {
        self.match_type.contains('+')
    }
}

/// A single node reached while expanding context around a search result
/// (spec §4.7, grounded on `graph_traversal.py`'s `GraphNode`).
#[derive(Debug, Clone)]
pub struct ContextNode {
    pub node_id: String,
    pub label: NodeLabel,
    pub name: String,
    pub relationship_type: RelationshipType,
    pub depth: usize,
}

/// Aggregate statistics over an expanded context (spec §4.7, grounded on
/// `graph_traversal.py`'s `_create_traversal_summary`).
#[derive(Debug, Clone, Default)]
pub struct TraversalSummary {
    pub node_type_counts: HashMap<String, usize>,
    pub relationship_type_counts: HashMap<String, usize>,
    pub depth_distribution: HashMap<usize, usize>,
}

impl TraversalSummary {
    pub fn from_nodes(nodes: &[ContextNode]) -> Self {
        let mut summary = Self::default();
        for node in nodes {
            *summary
                .node_type_counts
                .entry(node.label.as_str().to_string())
                .or_insert(0) += 1;
            *summary
                .relationship_type_counts
                .entry(node.relationship_type.as_str().to_string())
                .or_insert(0) += 1;
            *summary.depth_distribution.entry(node.depth).or_insert(0) += 1;
        }
        summary
    }
}

/// The expanded context around a set of search results (spec §4.7).
#[derive(Debug, Clone, Default)]
pub struct GraphContext {
    pub nodes: Vec<ContextNode>,
    pub summary: TraversalSummary,
}

impl GraphContext {
    pub fn new(nodes: Vec<ContextNode>) -> Self {
        let summary = TraversalSummary::from_nodes(&nodes);
        Self { nodes, summary }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Callers/callees of a `Method`/`Function`, each capped at 20 entries and
/// ordered by name (spec §4.7's `get_call_hierarchy`).
#[derive(Debug, Clone, Default)]
pub struct CallHierarchy {
    pub callers: Vec<ContextNode>,
    pub callees: Vec<ContextNode>,
}

/// Ancestors/descendants of a `Class`/`Interface` along `EXTENDS`/
/// `IMPLEMENTS` edges, each capped at 20 entries and ordered by name (spec
/// §4.7's `get_inheritance_hierarchy`).
#[derive(Debug, Clone, Default)]
pub struct InheritanceHierarchy {
    pub ancestors: Vec<ContextNode>,
    pub descendants: Vec<ContextNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(depth: usize, label: NodeLabel, rt: RelationshipType) -> ContextNode {
        ContextNode {
            node_id: "n".into(),
            label,
            name: "n".into(),
            relationship_type: rt,
            depth,
        }
    }

    #[test]
    fn is_multi_match_detects_plus_joined_sources() {
        let result = SearchResult {
            node_id: "a".into(),
            label: NodeLabel::Function,
            name: "f".into(),
            full_name: "f".into(),
            summary: None,
            score: 1.0,
            match_type: "vector+entity".into(),
            related_node_count: 0,
        };
        assert!(result.is_multi_match());
        assert!(result.matched_by("vector"));
        assert!(result.matched_by("entity"));
        assert!(!result.matched_by("semantic"));
    }

    #[test]
    fn traversal_summary_counts_by_label_and_depth() {
        let nodes = vec![
            node(1, NodeLabel::Method, RelationshipType::Calls),
            node(1, NodeLabel::Method, RelationshipType::Calls),
            node(2, NodeLabel::Class, RelationshipType::Extends),
        ];
        let summary = TraversalSummary::from_nodes(&nodes);
        assert_eq!(summary.node_type_counts["Method"], 2);
        assert_eq!(summary.depth_distribution[&1], 2);
        assert_eq!(summary.depth_distribution[&2], 1);
    }
}
