pub mod embedding_provider;
pub mod graph_store;
pub mod parser_runner;
pub mod summary_provider;

pub use embedding_provider::EmbeddingProvider;
pub use graph_store::{GraphStore, VectorHit};
pub use parser_runner::ParserRunner;
pub use summary_provider::SummaryProvider;
