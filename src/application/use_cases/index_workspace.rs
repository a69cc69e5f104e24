use std::path::Path;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::application::interfaces::GraphStore;
use crate::domain::error::GraphError;

use super::chunk_orchestrator::ChunkOrchestratorUseCase;
use super::ingest_graph::IngestionStats;
use super::scan_changes::ScanChangesUseCase;
use super::IngestGraphUseCase;

/// Overall result of an `index` run (spec §6 `index <dir>`).
#[derive(Debug, Clone)]
pub struct IndexRunReport {
    pub files_scanned: usize,
    pub files_changed: usize,
    pub fragments_parsed: usize,
    pub ingestion: IngestionStats,
}

/// Per-run overrides for the `index` command (spec §10's `--force`/
/// `--max-concurrent`).
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexOptions {
    pub force: bool,
    pub max_concurrent: Option<usize>,
}

/// Top-level orchestration of the index pipeline: scan for changes, parse
/// them through per-language subprocesses, ingest the result (spec §4.1-§4.3,
/// C2→C3→C4). Grounded on `index_repository.rs`'s
/// `index()`/`incremental_index()` shape: a progress bar, continue-on-error
/// semantics, and a final per-run report.
pub struct IndexWorkspaceUseCase {
    store: Arc<dyn GraphStore>,
    scanner: ScanChangesUseCase,
    orchestrator: ChunkOrchestratorUseCase,
    ingestor: IngestGraphUseCase,
}

impl IndexWorkspaceUseCase {
    pub fn new(store: Arc<dyn GraphStore>, orchestrator: ChunkOrchestratorUseCase) -> Self {
        Self {
            scanner: ScanChangesUseCase::new(store.clone()),
            ingestor: IngestGraphUseCase::new(store.clone()),
            orchestrator,
            store,
        }
    }

    pub async fn execute(&self, root: &Path) -> Result<IndexRunReport, GraphError> {
        self.execute_with_options(root, IndexOptions::default()).await
    }

    pub async fn execute_with_options(&self, root: &Path, options: IndexOptions) -> Result<IndexRunReport, GraphError> {
        self.store.init_schema().await?;

        let changes = self.scanner.execute_with_options(root, options.force).await?;
        let changed_count = changes.iter().filter(|c| c.needs_processing()).count();
        info!("scanned {root:?}: {} files total, {changed_count} need processing", changes.len());

        let bar = ProgressBar::new(changed_count as u64);
        if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}") {
            bar.set_style(style);
        }
        bar.set_message("parsing");

        let fragments = match options.max_concurrent {
            Some(max_concurrent) => self.orchestrator.execute_with_concurrency(&changes, max_concurrent).await,
            None => self.orchestrator.execute(&changes).await,
        };
        bar.set_message("ingesting");

        let ingestion = self.ingestor.execute(&fragments).await;
        bar.finish_with_message("done");

        for change in changes.iter().filter(|c| c.status == crate::domain::models::FileChangeStatus::Deleted) {
            if let Err(err) = self.store.delete_file_subgraph(&change.path.to_string_lossy()).await {
                tracing::warn!("failed to delete subgraph for {}: {err}", change.path.display());
            }
        }

        Ok(IndexRunReport {
            files_scanned: changes.len(),
            files_changed: changed_count,
            fragments_parsed: fragments.len(),
            ingestion,
        })
    }
}
