use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The closed set of relationship labels in the canonical graph schema (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    Contains,
    Defines,
    Declares,
    Calls,
    Instantiates,
    Extends,
    Implements,
    Imports,
    Scopes,
    Uses,
    References,
    HasMember,
    Exports,
}

impl RelationshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::Contains => "CONTAINS",
            RelationshipType::Defines => "DEFINES",
            RelationshipType::Declares => "DECLARES",
            RelationshipType::Calls => "CALLS",
            RelationshipType::Instantiates => "INSTANTIATES",
            RelationshipType::Extends => "EXTENDS",
            RelationshipType::Implements => "IMPLEMENTS",
            RelationshipType::Imports => "IMPORTS",
            RelationshipType::Scopes => "SCOPES",
            RelationshipType::Uses => "USES",
            RelationshipType::References => "REFERENCES",
            RelationshipType::HasMember => "HAS_MEMBER",
            RelationshipType::Exports => "EXPORTS",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CONTAINS" => Some(RelationshipType::Contains),
            "DEFINES" => Some(RelationshipType::Defines),
            "DECLARES" => Some(RelationshipType::Declares),
            "CALLS" => Some(RelationshipType::Calls),
            "INSTANTIATES" => Some(RelationshipType::Instantiates),
            "EXTENDS" => Some(RelationshipType::Extends),
            "IMPLEMENTS" => Some(RelationshipType::Implements),
            "IMPORTS" => Some(RelationshipType::Imports),
            "SCOPES" => Some(RelationshipType::Scopes),
            "USES" => Some(RelationshipType::Uses),
            "REFERENCES" => Some(RelationshipType::References),
            "HAS_MEMBER" => Some(RelationshipType::HasMember),
            "EXPORTS" => Some(RelationshipType::Exports),
            _ => None,
        }
    }

    /// Relationship types the summarization scheduler treats as "contributes
    /// to this node's children" (spec §4.4 dependency predicate).
    pub fn is_containment(&self) -> bool {
        matches!(
            self,
            RelationshipType::Contains | RelationshipType::Defines | RelationshipType::Declares
        )
    }

    /// Relationship types used to pull in cross-reference context when
    /// enriching a node for summarization (spec §4.4 step 3).
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            RelationshipType::Calls | RelationshipType::Uses | RelationshipType::References
        )
    }
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A directed edge between two nodes, identified by `(source_id, type, target_id)` (spec §3, §4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    source_id: String,
    target_id: String,
    relationship_type: RelationshipType,
    properties: HashMap<String, Value>,
}

impl Edge {
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>, relationship_type: RelationshipType) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            relationship_type,
            properties: HashMap::new(),
        }
    }

    pub fn with_properties(mut self, properties: HashMap<String, Value>) -> Self {
        self.properties = properties;
        self
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn relationship_type(&self) -> RelationshipType {
        self.relationship_type
    }

    pub fn properties(&self) -> &HashMap<String, Value> {
        &self.properties
    }

    /// The key idempotent upsert merges on (spec §4.3: "relationships are
    /// keyed by `(source_id, type, target_id)`").
    pub fn merge_key(&self) -> (String, RelationshipType, String) {
        (self.source_id.clone(), self.relationship_type, self.target_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationship_type_round_trips() {
        for rt in [
            RelationshipType::Contains,
            RelationshipType::Calls,
            RelationshipType::HasMember,
        ] {
            assert_eq!(RelationshipType::parse(rt.as_str()), Some(rt));
        }
    }

    #[test]
    fn unknown_relationship_type_is_rejected() {
        assert_eq!(RelationshipType::parse("FROBNICATES"), None);
    }

    #[test]
    fn merge_key_identifies_an_edge() {
        let edge = Edge::new("a", "b", RelationshipType::Calls);
        assert_eq!(edge.merge_key(), ("a".to_string(), RelationshipType::Calls, "b".to_string()));
    }
}
