use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::application::interfaces::ParserRunner;
use crate::domain::error::GraphError;
use crate::domain::models::Fragment;

/// Shells out to a per-language parser binary and decodes its JSON
/// `Fragment` output on stdout (spec §4.3, §6). Grounded on
/// `scip/indexer.rs`'s binary-availability probe and actionable errors,
/// extended with a concurrency cap, a hard timeout, and guaranteed
/// temp-file cleanup on every exit path (gaps the teacher's sequential
/// single-binary SCIP runner doesn't need to handle).
pub struct SubprocessParserRunner {
    language: String,
    binary: String,
    semaphore: Arc<Semaphore>,
}

impl SubprocessParserRunner {
    pub fn new(language: impl Into<String>, binary: impl Into<String>, max_concurrent: usize) -> Self {
        Self {
            language: language.into(),
            binary: binary.into(),
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }
}

#[async_trait]
impl ParserRunner for SubprocessParserRunner {
    fn language(&self) -> &str {
        &self.language
    }

    async fn is_available(&self) -> bool {
        tokio::process::Command::new(&self.binary)
            .arg("--version")
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    async fn parse_files(&self, files: &[&Path], timeout: Duration) -> Result<Fragment, GraphError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| GraphError::internal(format!("parser semaphore closed: {e}")))?;

        let input_file = tempfile_list(files)?;
        let input_path = input_file.path().to_path_buf();

        let mut child = tokio::process::Command::new(&self.binary)
            .arg("--input-list")
            .arg(&input_path)
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .map_err(|e| GraphError::parse(format!("failed to spawn {} parser: {e}", self.language)))?;

        let result = tokio::time::timeout(timeout, child.wait_with_output()).await;
        // `input_file` (a `NamedTempFile`) is dropped here regardless of the
        // branch taken below, deleting the temp file on every exit path.
        drop(input_file);

        let output = match result {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => return Err(GraphError::parse(format!("{} parser failed: {err}", self.language))),
            Err(_) => {
                warn!("{} parser timed out after {:?}, killing", self.language, timeout);
                return Err(GraphError::parse(format!("{} parser timed out after {:?}", self.language, timeout)));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GraphError::parse(format!(
                "{} parser exited with {:?}: {}",
                self.language,
                output.status.code(),
                stderr.trim()
            )));
        }

        let fragment: Fragment = serde_json::from_slice(&output.stdout)
            .map_err(|e| GraphError::parse(format!("failed to decode {} parser output: {e}", self.language)))?;

        info!(
            "{} parser processed {} files: {} nodes, {} relationships",
            self.language,
            files.len(),
            fragment.nodes.len(),
            fragment.relationships.len()
        );

        Ok(fragment)
    }
}

fn tempfile_list(files: &[&Path]) -> Result<tempfile::NamedTempFile, GraphError> {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new().map_err(GraphError::IoError)?;
    for path in files {
        writeln!(file, "{}", path.display()).map_err(GraphError::IoError)?;
    }
    file.flush().map_err(GraphError::IoError)?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unavailable_binary_is_reported_as_unavailable() {
        let runner = SubprocessParserRunner::new("nowhere", "definitely-not-a-real-binary-xyz", 1);
        assert!(!runner.is_available().await);
    }
}
