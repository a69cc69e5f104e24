pub mod edge;
pub mod file_change;
pub mod fragment;
pub mod node;
pub mod search;
pub mod search_result;
pub mod stats;
pub mod workspace;

pub use edge::{Edge, RelationshipType};
pub use file_change::{detect_file_changes, should_ignore_path, FileChange, FileChangeStatus};
pub use fragment::{Fragment, ProcessedFile};
pub use node::{Location, Node, NodeLabel, SummaryStatus};
pub use search::{CallDirection, Intent, QueryType, SearchConfig, CONTEXT_INDICATORS};
pub use search_result::{CallHierarchy, ContextNode, GraphContext, InheritanceHierarchy, SearchResult, TraversalSummary};
pub use stats::{GraphStats, LevelProgress};
pub use workspace::Workspace;
