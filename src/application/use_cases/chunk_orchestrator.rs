use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use tracing::{error, info, warn};

use crate::application::interfaces::ParserRunner;
use crate::domain::error::GraphError;
use crate::domain::models::{FileChange, Fragment};

use super::scan_changes::language_for_extension;

const DEFAULT_BATCH_SIZE: usize = 50;
const DEFAULT_PARSE_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_MAX_CONCURRENT_PARSERS: usize = 4;

/// Groups changed files by language and fans them out to the matching
/// parser subprocess, bounded by a semaphore and a per-batch timeout
/// (spec §4.3, C3). Grounded on `scip/indexer.rs` and `phase_runner.rs`'s
/// subprocess-orchestration idiom, extended with bounded concurrency and
/// guaranteed cleanup on every exit path (timeout, parser error, or success).
pub struct ChunkOrchestratorUseCase {
    runners: HashMap<String, Arc<dyn ParserRunner>>,
    batch_size: usize,
    timeout: Duration,
    max_concurrent: usize,
}

impl ChunkOrchestratorUseCase {
    pub fn new(runners: Vec<Arc<dyn ParserRunner>>) -> Self {
        let runners = runners
            .into_iter()
            .map(|r| (r.language().to_string(), r))
            .collect();
        Self {
            runners,
            batch_size: DEFAULT_BATCH_SIZE,
            timeout: DEFAULT_PARSE_TIMEOUT,
            max_concurrent: DEFAULT_MAX_CONCURRENT_PARSERS,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    /// Parses every changed file needing processing, returning one fragment
    /// per (language, batch). A batch whose parser is unavailable, times out,
    /// or errors is logged and skipped rather than aborting the whole run.
    /// `max_concurrent_override` lets a single run (e.g. `index --max-concurrent`)
    /// adjust the fan-out without rebuilding the orchestrator.
    pub async fn execute(&self, changes: &[FileChange]) -> Vec<Fragment> {
        self.execute_with_concurrency(changes, self.max_concurrent).await
    }

    pub async fn execute_with_concurrency(&self, changes: &[FileChange], max_concurrent: usize) -> Vec<Fragment> {
        let mut by_language: HashMap<&str, Vec<PathBuf>> = HashMap::new();
        for change in changes.iter().filter(|c| c.needs_processing()) {
            let Some(ext) = change.extension.as_deref() else {
                continue;
            };
            let Some(language) = language_for_extension(ext) else {
                continue;
            };
            by_language.entry(language).or_default().push(change.absolute_path.clone());
        }

        let mut batches: Vec<(String, Vec<PathBuf>)> = Vec::new();
        for (language, files) in by_language {
            for chunk in files.chunks(self.batch_size) {
                batches.push((language.to_string(), chunk.to_vec()));
            }
        }

        let runners = &self.runners;
        let timeout = self.timeout;
        let results: Vec<Option<Fragment>> = stream::iter(batches.into_iter().map(|(language, files)| async move {
            let Some(runner) = runners.get(language.as_str()) else {
                warn!("no parser registered for language {language}, skipping {} files", files.len());
                return None;
            };
            if !runner.is_available().await {
                warn!("parser for {language} is unavailable, skipping {} files", files.len());
                return None;
            }
            let refs: Vec<&std::path::Path> = files.iter().map(|p| p.as_path()).collect();
            match runner.parse_files(&refs, timeout).await {
                Ok(fragment) => {
                    info!(
                        "parsed {} files for {language}: {} nodes, {} relationships",
                        files.len(),
                        fragment.nodes.len(),
                        fragment.relationships.len()
                    );
                    Some(fragment)
                }
                Err(err) => {
                    error!("parser for {language} failed on batch of {}: {err}", files.len());
                    None
                }
            }
        }))
        .buffer_unordered(max_concurrent)
        .collect()
        .await;

        results.into_iter().flatten().collect()
    }
}

#[allow(dead_code)]
fn validate_fragment(fragment: &Fragment) -> Result<(), GraphError> {
    if !fragment.is_supported_version() {
        return Err(GraphError::parse(format!(
            "unsupported fragment version {} for language {}",
            fragment.version, fragment.language
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubRunner {
        language: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ParserRunner for StubRunner {
        fn language(&self) -> &str {
            self.language
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn parse_files(&self, files: &[&Path], _timeout: Duration) -> Result<Fragment, GraphError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut fragment = Fragment::new(self.language);
            for file in files {
                fragment.processed_files.push(crate::domain::models::ProcessedFile {
                    path: file.to_string_lossy().to_string(),
                    language: self.language.to_string(),
                    checksum: "stub".to_string(),
                });
            }
            Ok(fragment)
        }
    }

    #[tokio::test]
    async fn skips_files_with_no_registered_parser() {
        let orchestrator = ChunkOrchestratorUseCase::new(vec![]);
        let changes = vec![FileChange {
            path: PathBuf::from("a.rs"),
            absolute_path: PathBuf::from("a.rs"),
            status: crate::domain::models::FileChangeStatus::New,
            old_checksum: None,
            new_checksum: Some("x".into()),
            size: 1,
            extension: Some("rs".into()),
        }];
        let fragments = orchestrator.execute(&changes).await;
        assert!(fragments.is_empty());
    }

    #[tokio::test]
    async fn dispatches_changed_files_to_the_matching_runner() {
        let runner = Arc::new(StubRunner {
            language: "rust",
            calls: AtomicUsize::new(0),
        });
        let orchestrator = ChunkOrchestratorUseCase::new(vec![runner.clone()]);
        let changes = vec![FileChange {
            path: PathBuf::from("a.rs"),
            absolute_path: PathBuf::from("a.rs"),
            status: crate::domain::models::FileChangeStatus::New,
            old_checksum: None,
            new_checksum: Some("x".into()),
            size: 1,
            extension: Some("rs".into()),
        }];
        let fragments = orchestrator.execute(&changes).await;
        assert_eq!(fragments.len(), 1);
        assert_eq!(runner.calls.load(Ordering::SeqCst), 1);
    }
}
