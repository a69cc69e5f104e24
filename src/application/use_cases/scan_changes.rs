use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;
use tracing::warn;

use crate::application::interfaces::GraphStore;
use crate::domain::error::GraphError;
use crate::domain::models::{detect_file_changes, should_ignore_path, FileChange};

const CHECKSUM_CHUNK_SIZE: usize = 8192;

/// The file extensions a language is recognized from (spec §4.2, grounded on
/// `file_traversal.py`'s `SUPPORTED_EXTENSIONS`).
pub fn language_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "py" => Some("python"),
        "cs" => Some("csharp"),
        "js" | "jsx" | "mjs" | "cjs" => Some("javascript"),
        "ts" | "tsx" => Some("typescript"),
        "rs" => Some("rust"),
        "go" => Some("go"),
        "java" => Some("java"),
        _ => None,
    }
}

/// Walks a workspace root, computes a checksum per file, and diffs against
/// stored checksums to classify new/modified/unchanged/deleted (spec §4.2,
/// C2). Grounded on `file_traversal.py`'s `scan_directory`/`detect_file_changes`.
pub struct ScanChangesUseCase {
    store: Arc<dyn GraphStore>,
}

impl ScanChangesUseCase {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, root: &Path) -> Result<Vec<FileChange>, GraphError> {
        self.execute_with_options(root, false).await
    }

    /// `force` skips the stored-checksum diff entirely so every matching file
    /// in `root` is treated as needing processing, regardless of whether it
    /// changed (spec §10's `index --force`).
    pub async fn execute_with_options(&self, root: &Path, force: bool) -> Result<Vec<FileChange>, GraphError> {
        let current = self.scan_directory(root).await?;
        let stored = if force { HashMap::new() } else { self.store.stored_checksums().await? };
        Ok(detect_file_changes(&current, &stored))
    }

    async fn scan_directory(&self, root: &Path) -> Result<HashMap<PathBuf, (String, u64)>, GraphError> {
        let mut results = HashMap::new();
        let mut walker = walkdir::WalkDir::new(root).into_iter();

        loop {
            let entry = match walker.next() {
                Some(Ok(entry)) => entry,
                Some(Err(err)) => {
                    warn!("skipping unreadable path during scan: {err}");
                    continue;
                }
                None => break,
            };

            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if should_ignore_path(rel) {
                if entry.file_type().is_dir() {
                    walker.skip_current_dir();
                }
                continue;
            }

            if !entry.file_type().is_file() {
                continue;
            }

            let Some(ext) = entry.path().extension().map(|e| e.to_string_lossy().to_string()) else {
                continue;
            };
            if language_for_extension(&ext).is_none() {
                continue;
            }

            match checksum_file(entry.path()).await {
                Ok(checksum) => {
                    let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                    results.insert(rel.to_path_buf(), (checksum, size));
                }
                Err(err) => warn!("failed to checksum {}: {err}", entry.path().display()),
            }
        }

        Ok(results)
    }
}

async fn checksum_file(path: &Path) -> Result<String, GraphError> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHECKSUM_CHUNK_SIZE];
    loop {
        let read = file.read(&mut buf).await?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_supported_extensions() {
        assert_eq!(language_for_extension("py"), Some("python"));
        assert_eq!(language_for_extension("tsx"), Some("typescript"));
        assert_eq!(language_for_extension("exe"), None);
    }

    #[tokio::test]
    async fn checksum_is_stable_for_identical_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.rs");
        tokio::fs::write(&path, b"fn main() {}").await.unwrap();
        let first = checksum_file(&path).await.unwrap();
        let second = checksum_file(&path).await.unwrap();
        assert_eq!(first, second);
    }
}
