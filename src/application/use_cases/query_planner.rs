use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::models::{Intent, NodeLabel, QueryType, CONTEXT_INDICATORS};

/// Closed vocabulary of programming terms that signal a query is about code
/// structure rather than plain-English intent (spec §4.8, grounded verbatim
/// on `hybrid_search.py`'s `programming_terms`).
const PROGRAMMING_TERMS: &[&str] = &[
    "class", "method", "function", "variable", "interface", "enum", "constructor", "property",
    "field", "parameter", "return", "public", "private", "protected", "static", "async", "await",
    "import", "export", "extends", "implements", "inherit", "override", "abstract", "virtual",
    "final", "const", "let", "var", "api", "service", "controller", "model", "dto", "entity",
    "repository", "database", "query", "connection", "client", "http", "request", "response",
    "json", "xml", "rest", "authenticate", "authorize", "login", "logout", "session", "cache",
    "redis", "memory", "storage", "file", "directory", "test", "mock", "stub", "unit",
    "integration", "e2e", "exception", "error", "try", "catch", "throw", "handle", "log",
    "logger", "debug", "info", "warn",
];

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "to", "of", "in", "on", "for",
    "with", "and", "or", "that", "this", "it", "how", "what", "where", "when", "does", "do",
];

fn entity_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            Regex::new(r"\b[A-Z][a-zA-Z0-9]*(?:Service|Controller|Repository|Manager|Handler|Factory|Builder|Helper|Utils?)\b").unwrap(),
            Regex::new(r"\b[A-Z][a-zA-Z0-9]*(?:Entity|Model|DTO|Request|Response|Config(?:uration)?)\b").unwrap(),
            Regex::new(r"\b[A-Z][a-zA-Z0-9]*(?:Exception|Error)\b").unwrap(),
            Regex::new(r"\b[a-z][a-zA-Z0-9]*(?:Api|HTTP|Rest|GraphQL)\b").unwrap(),
            Regex::new(r"\b[A-Z][a-zA-Z0-9]{2,}\b").unwrap(),
        ]
    })
}

fn node_type_mapping(term: &str) -> Option<NodeLabel> {
    match term {
        "class" | "classes" => Some(NodeLabel::Class),
        "interface" | "interfaces" => Some(NodeLabel::Interface),
        "method" | "methods" => Some(NodeLabel::Method),
        "function" | "functions" => Some(NodeLabel::Function),
        "variable" | "variables" => Some(NodeLabel::Variable),
        "file" | "files" => Some(NodeLabel::File),
        _ => None,
    }
}

/// Parses a free-text query into entities, node-type hints, semantic terms
/// and a query-type classification with confidence (spec §4.8, C9).
/// Grounded directly on `hybrid_search.py`'s `QueryParser`, re-expressed with
/// the `regex` crate rather than translated line-for-line from Python.
pub struct QueryPlannerUseCase;

impl QueryPlannerUseCase {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, query: &str) -> Intent {
        let entities = extract_entities(query);
        let lowercase = query.to_lowercase();
        let has_programming_terms = PROGRAMMING_TERMS.iter().any(|term| lowercase.contains(term));
        let node_types = extract_node_types(&lowercase);
        let semantic_terms = extract_semantic_terms(&lowercase);
        let has_semantic = !semantic_terms.is_empty();
        let has_entities = !entities.is_empty();

        let (query_type, confidence) = determine_query_type(has_entities, has_programming_terms, has_semantic);
        let expand_context = CONTEXT_INDICATORS.iter().any(|word| lowercase.contains(word));

        Intent {
            query_type,
            entities,
            node_types,
            semantic_terms,
            confidence,
            expand_context,
        }
    }
}

impl Default for QueryPlannerUseCase {
    fn default() -> Self {
        Self::new()
    }
}

fn extract_entities(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut entities = Vec::new();
    for pattern in entity_patterns() {
        for m in pattern.find_iter(query) {
            let text = m.as_str().to_string();
            if seen.insert(text.clone()) {
                entities.push(text);
            }
        }
    }
    entities
}

fn extract_node_types(lowercase_query: &str) -> Vec<NodeLabel> {
    let mut seen = HashSet::new();
    let mut labels = Vec::new();
    for word in lowercase_query.split_whitespace() {
        let trimmed = word.trim_matches(|c: char| !c.is_alphanumeric());
        if let Some(label) = node_type_mapping(trimmed) {
            if seen.insert(label) {
                labels.push(label);
            }
        }
    }
    labels
}

fn extract_semantic_terms(lowercase_query: &str) -> Vec<String> {
    lowercase_query
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.len() > 2 && !STOPWORDS.contains(w) && !PROGRAMMING_TERMS.contains(w))
        .map(|w| w.to_string())
        .collect()
}

/// The exact decision table from `hybrid_search.py`'s `_determine_query_type`.
fn determine_query_type(has_entities: bool, has_programming_terms: bool, has_semantic: bool) -> (QueryType, f32) {
    if has_entities && has_semantic {
        (QueryType::Hybrid, 0.8)
    } else if has_entities && has_programming_terms {
        (QueryType::Hybrid, 0.7)
    } else if has_entities {
        (QueryType::Entity, 0.9)
    } else if has_programming_terms && has_semantic {
        (QueryType::Contextual, 0.7)
    } else if has_semantic {
        (QueryType::Semantic, 0.6)
    } else {
        (QueryType::Semantic, 0.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_service_suffixed_entities() {
        let entities = extract_entities("how does PaymentService charge a card");
        assert!(entities.iter().any(|e| e == "PaymentService"));
    }

    #[test]
    fn pure_semantic_query_has_no_entities_or_programming_terms() {
        let intent = QueryPlannerUseCase::new().parse("how do payments work around here");
        assert!(intent.entities.is_empty());
        assert_eq!(intent.query_type, QueryType::Semantic);
    }

    #[test]
    fn entity_plus_semantic_query_is_hybrid_at_point_eight() {
        let intent = QueryPlannerUseCase::new().parse("how does PaymentService work internally");
        assert_eq!(intent.query_type, QueryType::Hybrid);
        assert_eq!(intent.confidence, 0.8);
    }

    #[test]
    fn context_indicator_words_trigger_expand_context() {
        let intent = QueryPlannerUseCase::new().parse("what calls PaymentService");
        assert!(intent.expand_context);
    }

    #[test]
    fn node_type_hints_are_extracted_from_plural_and_singular_terms() {
        let intent = QueryPlannerUseCase::new().parse("list all classes and functions here");
        assert!(intent.node_types.contains(&NodeLabel::Class));
        assert!(intent.node_types.contains(&NodeLabel::Function));
    }
}
