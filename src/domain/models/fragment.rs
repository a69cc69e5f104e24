use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::edge::Edge;
use super::node::Node;

/// A single file's parse record inside a `Fragment` (spec §6 wire schema).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedFile {
    pub path: String,
    pub language: String,
    pub checksum: String,
}

/// The wire-level output of a language parser subprocess (spec §6, §4.3).
///
/// Mirrors the parser-subprocess contract directly: one `Fragment` per
/// invocation, carrying every node and relationship the parser extracted
/// from the files it was given plus a version tag so the ingestor can
/// reject output from an incompatible parser revision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragment {
    pub language: String,
    pub version: String,
    pub processed_files: Vec<ProcessedFile>,
    pub nodes: Vec<Node>,
    pub relationships: Vec<Edge>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl Fragment {
    pub const SUPPORTED_VERSION: &'static str = "1.0.0";

    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            version: Self::SUPPORTED_VERSION.to_string(),
            processed_files: Vec::new(),
            nodes: Vec::new(),
            relationships: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn is_supported_version(&self) -> bool {
        self.version == Self::SUPPORTED_VERSION
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_fragment_carries_the_supported_version() {
        let fragment = Fragment::new("rust");
        assert!(fragment.is_supported_version());
        assert!(fragment.is_empty());
    }

    #[test]
    fn unsupported_version_is_detected() {
        let mut fragment = Fragment::new("rust");
        fragment.version = "0.9.0".to_string();
        assert!(!fragment.is_supported_version());
    }
}
