pub mod anthropic_summary_provider;
pub mod duckdb_graph_store;
pub mod memory_graph_store;
pub mod mock_embedding_provider;
pub mod subprocess_parser;

pub use anthropic_summary_provider::AnthropicSummaryProvider;
pub use duckdb_graph_store::DuckdbGraphStore;
pub use memory_graph_store::MemoryGraphStore;
pub use mock_embedding_provider::MockEmbeddingProvider;
pub use subprocess_parser::SubprocessParserRunner;
