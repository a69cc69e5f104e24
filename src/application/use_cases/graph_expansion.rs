use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use crate::application::interfaces::GraphStore;
use crate::domain::error::GraphError;
use crate::domain::models::{
    CallDirection, CallHierarchy, ContextNode, GraphContext, InheritanceHierarchy, NodeLabel, RelationshipType, SearchResult,
};

/// One step the traversal is allowed to take from a node of a given label:
/// which relationship type, and whether it should be followed on its
/// incoming side (spec §4.7, grounded on `graph_traversal.py`'s closed
/// `TraversalRule` table).
fn rules_for(label: NodeLabel) -> &'static [(RelationshipType, bool)] {
    use RelationshipType::*;
    match label {
        NodeLabel::File => &[(Contains, false), (Imports, false), (Imports, true)],
        NodeLabel::Class => &[
            (Contains, true),
            (Defines, false),
            (Extends, false),
            (Implements, false),
            (Extends, true),
            (Implements, true),
            (Instantiates, true),
        ],
        NodeLabel::Interface => &[
            (Contains, true),
            (Defines, false),
            (Extends, false),
            (Implements, true),
            (Extends, true),
        ],
        NodeLabel::Method => &[
            (Defines, true),
            (Declares, false),
            (Calls, false),
            (Instantiates, false),
            (Calls, true),
        ],
        NodeLabel::Function => &[
            (Contains, true),
            (Declares, false),
            (Calls, false),
            (Instantiates, false),
            (Calls, true),
        ],
        NodeLabel::Variable => &[(Declares, true), (Scopes, false), (Scopes, true)],
        NodeLabel::Parameter => &[(Declares, true), (Scopes, false), (Scopes, true)],
        NodeLabel::Directory | NodeLabel::Import | NodeLabel::Export => &[],
    }
}

const MAX_RELATED_NODES: usize = 50;
const MAX_HIERARCHY_NODES: usize = 20;

/// Expands graph context around a set of search results via bounded BFS
/// (spec §4.7, C8). Grounded on `impact_analysis.rs`'s BFS shape
/// (`VecDeque` queue, `HashSet` visited, first-seen-depth-wins) combined
/// with `graph_traversal.py`'s per-label rule table.
pub struct GraphExpansionUseCase {
    store: Arc<dyn GraphStore>,
}

impl GraphExpansionUseCase {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    pub async fn expand(&self, results: &[SearchResult], max_depth: usize) -> Result<GraphContext, GraphError> {
        let mut visited: HashSet<String> = results.iter().map(|r| r.node_id.clone()).collect();
        let mut queue: VecDeque<(String, NodeLabel, usize)> =
            results.iter().map(|r| (r.node_id.clone(), r.label, 0)).collect();
        let mut collected = Vec::new();

        while let Some((node_id, label, depth)) = queue.pop_front() {
            if collected.len() >= MAX_RELATED_NODES || depth >= max_depth {
                continue;
            }

            for &(rel_type, incoming) in rules_for(label) {
                let neighbors = self
                    .store
                    .neighbors(&node_id, std::slice::from_ref(&rel_type), incoming)
                    .await?;

                for (neighbor, rel) in neighbors {
                    if visited.contains(neighbor.id()) {
                        continue;
                    }
                    visited.insert(neighbor.id().to_string());
                    collected.push(ContextNode {
                        node_id: neighbor.id().to_string(),
                        label: neighbor.label(),
                        name: neighbor.name().to_string(),
                        relationship_type: rel,
                        depth: depth + 1,
                    });
                    queue.push_back((neighbor.id().to_string(), neighbor.label(), depth + 1));
                    if collected.len() >= MAX_RELATED_NODES {
                        break;
                    }
                }
                if collected.len() >= MAX_RELATED_NODES {
                    break;
                }
            }
        }

        collected.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.name.cmp(&b.name)));
        Ok(GraphContext::new(collected))
    }

    /// Callers and/or callees of `node_id` along `CALLS` edges, each capped
    /// at 20 entries (spec §4.7's `get_call_hierarchy`).
    pub async fn call_hierarchy(&self, node_id: &str, direction: CallDirection, max_depth: usize) -> Result<CallHierarchy, GraphError> {
        let callers = if matches!(direction, CallDirection::In | CallDirection::Both) {
            self.bfs(node_id, &[RelationshipType::Calls], true, max_depth, MAX_HIERARCHY_NODES).await?
        } else {
            Vec::new()
        };
        let callees = if matches!(direction, CallDirection::Out | CallDirection::Both) {
            self.bfs(node_id, &[RelationshipType::Calls], false, max_depth, MAX_HIERARCHY_NODES).await?
        } else {
            Vec::new()
        };
        Ok(CallHierarchy { callers, callees })
    }

    /// Ancestors and descendants of `node_id` along `EXTENDS`/`IMPLEMENTS`
    /// edges, each capped at 20 entries (spec §4.7's
    /// `get_inheritance_hierarchy`).
    pub async fn inheritance_hierarchy(&self, node_id: &str) -> Result<InheritanceHierarchy, GraphError> {
        let rels = [RelationshipType::Extends, RelationshipType::Implements];
        let ancestors = self.bfs(node_id, &rels, false, usize::MAX, MAX_HIERARCHY_NODES).await?;
        let descendants = self.bfs(node_id, &rels, true, usize::MAX, MAX_HIERARCHY_NODES).await?;
        Ok(InheritanceHierarchy { ancestors, descendants })
    }

    /// Plain BFS along a fixed set of relationship types in one direction,
    /// capped at `cap` nodes and ordered by name, used by the two
    /// specialized hierarchy forms above (as opposed to `expand`'s
    /// per-label rule table).
    async fn bfs(
        &self,
        start: &str,
        relationship_types: &[RelationshipType],
        incoming: bool,
        max_depth: usize,
        cap: usize,
    ) -> Result<Vec<ContextNode>, GraphError> {
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(start.to_string());
        let mut queue: VecDeque<(String, usize)> = VecDeque::new();
        queue.push_back((start.to_string(), 0));
        let mut collected = Vec::new();

        while let Some((node_id, depth)) = queue.pop_front() {
            if depth >= max_depth || collected.len() >= cap {
                continue;
            }

            let neighbors = self.store.neighbors(&node_id, relationship_types, incoming).await?;
            for (neighbor, rel) in neighbors {
                if visited.contains(neighbor.id()) {
                    continue;
                }
                visited.insert(neighbor.id().to_string());
                collected.push(ContextNode {
                    node_id: neighbor.id().to_string(),
                    label: neighbor.label(),
                    name: neighbor.name().to_string(),
                    relationship_type: rel,
                    depth: depth + 1,
                });
                queue.push_back((neighbor.id().to_string(), depth + 1));
                if collected.len() >= cap {
                    break;
                }
            }
        }

        collected.sort_by(|a, b| a.name.cmp(&b.name));
        collected.truncate(cap);
        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_rules_cover_containment_and_imports_both_ways() {
        let rules = rules_for(NodeLabel::File);
        assert!(rules.contains(&(RelationshipType::Contains, false)));
        assert!(rules.contains(&(RelationshipType::Imports, true)));
    }

    #[test]
    fn leaf_labels_have_no_expansion_rules() {
        assert!(rules_for(NodeLabel::Import).is_empty());
        assert!(rules_for(NodeLabel::Directory).is_empty());
    }
}
