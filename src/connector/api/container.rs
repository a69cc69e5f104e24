use std::path::PathBuf;
use std::sync::Arc;

use crate::application::interfaces::{EmbeddingProvider, GraphStore, ParserRunner, SummaryProvider};
use crate::application::use_cases::{
    ChunkOrchestratorUseCase, EmbeddingSummaryWorkerUseCase, IndexWorkspaceUseCase, SearchFacadeUseCase,
    SummarizationSchedulerUseCase,
};
use crate::connector::adapter::{AnthropicSummaryProvider, DuckdbGraphStore, MemoryGraphStore, MockEmbeddingProvider, SubprocessParserRunner};
use crate::domain::error::GraphError;

/// Runtime configuration for the composition root (spec §10 configuration).
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    pub data_dir: PathBuf,
    pub in_memory: bool,
    pub parser_binaries: Vec<(String, String)>,
    pub parser_timeout_secs: u64,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("~/.codegraph"),
            in_memory: false,
            parser_binaries: vec![
                ("python".to_string(), "codegraph-parser-python".to_string()),
                ("rust".to_string(), "codegraph-parser-rust".to_string()),
                ("typescript".to_string(), "codegraph-parser-typescript".to_string()),
                ("javascript".to_string(), "codegraph-parser-javascript".to_string()),
                ("csharp".to_string(), "codegraph-parser-csharp".to_string()),
                ("go".to_string(), "codegraph-parser-go".to_string()),
                ("java".to_string(), "codegraph-parser-java".to_string()),
            ],
            parser_timeout_secs: 120,
        }
    }
}

/// Wires every adapter behind its port and hands out use cases (spec §9's
/// composition-root guidance). Grounded on `connector/api/container.rs`,
/// consolidating the teacher's four separate repositories behind the single
/// `GraphStore` port.
pub struct Container {
    config: ContainerConfig,
    store: Arc<dyn GraphStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    summary_provider: Arc<dyn SummaryProvider>,
    parsers: Vec<Arc<dyn ParserRunner>>,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Result<Self, GraphError> {
        let store: Arc<dyn GraphStore> = if config.in_memory {
            Arc::new(MemoryGraphStore::new())
        } else {
            std::fs::create_dir_all(&config.data_dir).map_err(GraphError::IoError)?;
            let db_path = config.data_dir.join("codegraph.duckdb");
            Arc::new(DuckdbGraphStore::new(&db_path)?)
        };

        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(MockEmbeddingProvider::new());
        let summary_provider: Arc<dyn SummaryProvider> = Arc::new(AnthropicSummaryProvider::from_env());

        let parsers: Vec<Arc<dyn ParserRunner>> = config
            .parser_binaries
            .iter()
            .map(|(language, binary)| Arc::new(SubprocessParserRunner::new(language.clone(), binary.clone(), 4)) as Arc<dyn ParserRunner>)
            .collect();

        Ok(Self {
            config,
            store,
            embedder,
            summary_provider,
            parsers,
        })
    }

    pub fn data_dir(&self) -> &std::path::Path {
        &self.config.data_dir
    }

    pub fn store(&self) -> Arc<dyn GraphStore> {
        self.store.clone()
    }

    pub fn index_use_case(&self) -> IndexWorkspaceUseCase {
        let orchestrator = ChunkOrchestratorUseCase::new(self.parsers.clone())
            .with_timeout(std::time::Duration::from_secs(self.config.parser_timeout_secs));
        IndexWorkspaceUseCase::new(self.store.clone(), orchestrator)
    }

    pub fn summarization_scheduler(&self) -> SummarizationSchedulerUseCase {
        SummarizationSchedulerUseCase::new(self.store.clone(), self.summary_provider.clone())
    }

    pub fn embedding_worker(&self) -> EmbeddingSummaryWorkerUseCase {
        EmbeddingSummaryWorkerUseCase::new(self.store.clone(), self.embedder.clone())
    }

    pub fn search_facade(&self) -> SearchFacadeUseCase {
        SearchFacadeUseCase::new(self.store.clone(), self.embedder.clone())
    }
}
