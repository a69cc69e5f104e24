use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The closed set of node labels in the canonical graph schema (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum NodeLabel {
    File,
    Directory,
    Class,
    Interface,
    Method,
    Function,
    Variable,
    Parameter,
    Import,
    Export,
}

impl NodeLabel {
    pub const ALL: [NodeLabel; 10] = [
        NodeLabel::File,
        NodeLabel::Directory,
        NodeLabel::Class,
        NodeLabel::Interface,
        NodeLabel::Method,
        NodeLabel::Function,
        NodeLabel::Variable,
        NodeLabel::Parameter,
        NodeLabel::Import,
        NodeLabel::Export,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeLabel::File => "File",
            NodeLabel::Directory => "Directory",
            NodeLabel::Class => "Class",
            NodeLabel::Interface => "Interface",
            NodeLabel::Method => "Method",
            NodeLabel::Function => "Function",
            NodeLabel::Variable => "Variable",
            NodeLabel::Parameter => "Parameter",
            NodeLabel::Import => "Import",
            NodeLabel::Export => "Export",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "File" => Some(NodeLabel::File),
            "Directory" => Some(NodeLabel::Directory),
            "Class" => Some(NodeLabel::Class),
            "Interface" => Some(NodeLabel::Interface),
            "Method" => Some(NodeLabel::Method),
            "Function" => Some(NodeLabel::Function),
            "Variable" => Some(NodeLabel::Variable),
            "Parameter" => Some(NodeLabel::Parameter),
            "Import" => Some(NodeLabel::Import),
            "Export" => Some(NodeLabel::Export),
            _ => None,
        }
    }

    /// Levels the summarization scheduler treats as summarizable children (spec §4.4).
    pub fn is_summarizable(&self) -> bool {
        !matches!(self, NodeLabel::Import | NodeLabel::Export)
    }

    /// The bottom-up processing order of the summarization scheduler (spec §4.4).
    pub fn summarization_order() -> [NodeLabel; 8] {
        [
            NodeLabel::Parameter,
            NodeLabel::Variable,
            NodeLabel::Method,
            NodeLabel::Function,
            NodeLabel::Class,
            NodeLabel::Interface,
            NodeLabel::File,
            NodeLabel::Directory,
        ]
    }
}

impl std::fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A source location in `start_line`/`end_line` (1-indexed), optionally with columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub start_line: u32,
    pub end_line: u32,
    pub start_column: Option<u32>,
    pub end_column: Option<u32>,
}

impl Location {
    pub fn new(start_line: u32, end_line: u32) -> Self {
        Self {
            start_line,
            end_line,
            start_column: None,
            end_column: None,
        }
    }
}

/// Advisory lease state for summary generation (spec §3 invariant 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStatus {
    Unset,
    Processing,
    Completed,
}

impl SummaryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryStatus::Unset => "unset",
            SummaryStatus::Processing => "processing",
            SummaryStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "processing" => SummaryStatus::Processing,
            "completed" => SummaryStatus::Completed,
            _ => SummaryStatus::Unset,
        }
    }
}

/// A node in the canonical property graph (spec §3).
///
/// Label-specific attributes (`visibility`, `return_type`, `base_classes`, ...)
/// live in `properties` rather than as dedicated fields: the schema is shared
/// across ten labels with mostly-disjoint attribute sets, and a flat JSON bag
/// mirrors how the parser subprocess contract (§6) actually hands them over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    id: String,
    label: NodeLabel,
    name: String,
    full_name: String,
    raw_code: Option<String>,
    location: Option<Location>,
    generated_summary: Option<String>,
    embedding: Option<Vec<f32>>,
    summary_status: SummaryStatus,
    properties: HashMap<String, Value>,
}

impl Node {
    #[allow(clippy::too_many_arguments)]
    pub fn new(id: String, label: NodeLabel, name: String, full_name: String) -> Self {
        Self {
            id,
            label,
            name,
            full_name,
            raw_code: None,
            location: None,
            generated_summary: None,
            embedding: None,
            summary_status: SummaryStatus::Unset,
            properties: HashMap::new(),
        }
    }

    /// Reconstitutes a node from persisted store rows.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: String,
        label: NodeLabel,
        name: String,
        full_name: String,
        raw_code: Option<String>,
        location: Option<Location>,
        generated_summary: Option<String>,
        embedding: Option<Vec<f32>>,
        summary_status: SummaryStatus,
        properties: HashMap<String, Value>,
    ) -> Self {
        Self {
            id,
            label,
            name,
            full_name,
            raw_code,
            location,
            generated_summary,
            embedding,
            summary_status,
            properties,
        }
    }

    pub fn with_raw_code(mut self, code: impl Into<String>) -> Self {
        self.raw_code = Some(code.into());
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_properties(mut self, properties: HashMap<String, Value>) -> Self {
        self.properties = properties;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> NodeLabel {
        self.label
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn raw_code(&self) -> Option<&str> {
        self.raw_code.as_deref()
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn generated_summary(&self) -> Option<&str> {
        self.generated_summary.as_deref()
    }

    pub fn has_summary(&self) -> bool {
        matches!(&self.generated_summary, Some(s) if !s.is_empty())
    }

    pub fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref()
    }

    pub fn summary_status(&self) -> SummaryStatus {
        self.summary_status
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn properties(&self) -> &HashMap<String, Value> {
        &self.properties
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.generated_summary = Some(summary.into());
        self.summary_status = SummaryStatus::Completed;
    }

    pub fn set_embedding(&mut self, embedding: Vec<f32>) {
        self.embedding = Some(embedding);
    }

    pub fn set_summary_status(&mut self, status: SummaryStatus) {
        self.summary_status = status;
    }

    /// Text the embedder falls back to when a summary is absent (spec §4.5, §9).
    ///
    /// True whenever the returned text came from raw code or the bare name
    /// rather than a generated summary, so `stats()` can flag the node.
    pub fn embedding_fallback_text(&self) -> (String, bool) {
        if let Some(summary) = self.generated_summary.as_ref().filter(|s| !s.is_empty()) {
            return (summary.clone(), false);
        }
        if let Some(code) = self.raw_code.as_ref().filter(|c| !c.is_empty()) {
            return (code.chars().take(1000).collect(), true);
        }
        (self.name.clone(), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_label_round_trips_through_str() {
        for label in NodeLabel::ALL {
            assert_eq!(NodeLabel::parse(label.as_str()), Some(label));
        }
    }

    #[test]
    fn summarization_order_is_bottom_up() {
        let order = NodeLabel::summarization_order();
        assert_eq!(order[0], NodeLabel::Parameter);
        assert_eq!(order[order.len() - 1], NodeLabel::Directory);
    }

    #[test]
    fn embedding_fallback_prefers_summary_then_code_then_name() {
        let mut node = Node::new(
            "n1".into(),
            NodeLabel::Function,
            "charge_card".into(),
            "PaymentService::charge_card".into(),
        );
        let (text, is_fallback) = node.embedding_fallback_text();
        assert_eq!(text, "charge_card");
        assert!(is_fallback);

        node = node.with_raw_code("fn charge_card() {}");
        let (text, is_fallback) = node.embedding_fallback_text();
        assert_eq!(text, "fn charge_card() {}");
        assert!(is_fallback);

        node.set_summary("Charges a card via the payment gateway.");
        let (text, is_fallback) = node.embedding_fallback_text();
        assert_eq!(text, "Charges a card via the payment gateway.");
        assert!(!is_fallback);
    }

    #[test]
    fn set_summary_marks_status_completed() {
        let mut node = Node::new(
            "n1".into(),
            NodeLabel::Method,
            "m".into(),
            "C::m".into(),
        );
        assert_eq!(node.summary_status(), SummaryStatus::Unset);
        node.set_summary("does a thing");
        assert_eq!(node.summary_status(), SummaryStatus::Completed);
        assert!(node.has_summary());
    }
}
