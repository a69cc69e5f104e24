use super::node::NodeLabel;

/// The query-shape classification the planner assigns to a parsed query
/// (spec §4.8, grounded on `hybrid_search.py`'s `QueryType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Semantic,
    Entity,
    Hybrid,
    Contextual,
}

/// Which side of a `CALLS` edge `call_hierarchy` should walk (spec §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallDirection {
    In,
    Out,
    Both,
}

impl CallDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "in" => Some(Self::In),
            "out" => Some(Self::Out),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

/// The parsed intent behind a search query (spec §4.8, grounded on
/// `hybrid_search.py`'s `QueryIntent`).
#[derive(Debug, Clone)]
pub struct Intent {
    pub query_type: QueryType,
    pub entities: Vec<String>,
    pub node_types: Vec<NodeLabel>,
    pub semantic_terms: Vec<String>,
    pub confidence: f32,
    pub expand_context: bool,
}

/// Tunable knobs for hybrid search (spec §4.6-§4.8), defaults grounded on
/// `hybrid_search.py`'s `HybridSearchConfig`.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub max_vector_results: usize,
    pub max_entity_results: usize,
    pub max_total_results: usize,
    pub min_similarity_threshold: f32,
    pub enable_context_expansion: bool,
    pub max_context_nodes: usize,
    /// Multiplier applied to an exact-name match's score in the final
    /// hybrid-score formula (spec §4.8). Distinct from the vector-search
    /// post-filter `boost_factor` below.
    pub boost_exact_matches: f32,
    pub boost_entity_matches: f32,
    /// Multiplier applied to a vector hit whose node label matches an
    /// entity-search hint (spec §4.6), default 1.2.
    pub boost_factor: f32,
    pub node_type_match_boost: f32,
    pub multi_match_boost: f32,
    pub context_boost_factor: f32,
    pub context_boost_cap: f32,
    pub final_score_cap: f32,
    pub expand_call_hierarchy: bool,
    pub expand_inheritance: bool,
    pub max_expansion_depth: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_vector_results: 20,
            max_entity_results: 10,
            max_total_results: 30,
            min_similarity_threshold: 0.6,
            enable_context_expansion: true,
            max_context_nodes: 50,
            boost_exact_matches: 1.5,
            boost_entity_matches: 1.3,
            boost_factor: 1.2,
            node_type_match_boost: 1.2,
            multi_match_boost: 1.1,
            context_boost_factor: 0.002,
            context_boost_cap: 0.1,
            final_score_cap: 2.0,
            expand_call_hierarchy: false,
            expand_inheritance: false,
            max_expansion_depth: 3,
        }
    }
}

/// Words that trigger automatic context expansion when present in a query
/// (spec §4.8, grounded on `hybrid_search.py`'s `context_indicators`).
pub const CONTEXT_INDICATORS: &[&str] = &[
    "calls",
    "called by",
    "uses",
    "used by",
    "implements",
    "extends",
    "inherits",
    "derived",
    "related",
    "similar",
    "dependencies",
    "hierarchy",
    "structure",
    "architecture",
    "flow",
    "interaction",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_spec_constants() {
        let config = SearchConfig::default();
        assert_eq!(config.min_similarity_threshold, 0.6);
        assert_eq!(config.boost_factor, 1.2);
        assert_eq!(config.boost_exact_matches, 1.5);
        assert_eq!(config.context_boost_factor, 0.002);
        assert_eq!(config.final_score_cap, 2.0);
        assert_eq!(config.max_expansion_depth, 3);
    }
}
