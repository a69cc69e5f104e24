use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use crate::domain::error::GraphError;
use crate::domain::models::Fragment;

/// The subprocess contract for a language parser (spec §4.3, §6).
///
/// Implementations own the one responsibility of invoking an external
/// per-language binary on a batch of files and decoding its wire output;
/// they never touch the graph store directly.
#[async_trait]
pub trait ParserRunner: Send + Sync {
    /// The language this runner handles, e.g. `"python"` or `"rust"`.
    fn language(&self) -> &str;

    /// True if the backing binary is present and callable.
    async fn is_available(&self) -> bool;

    /// Parses `files` and returns the fragment the subprocess produced.
    /// Implementations are expected to enforce `timeout`, kill the child on
    /// expiry, and clean up any temp files on every exit path.
    async fn parse_files(&self, files: &[&Path], timeout: Duration) -> Result<Fragment, GraphError>;
}
