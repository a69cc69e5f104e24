use async_trait::async_trait;

use crate::domain::error::GraphError;

/// Generates a natural-language summary from a prompt (spec §4.5).
///
/// Implementations are expected to fail soft: any provider error should be
/// caught by the caller and treated as "leave this node unsummarized for
/// now", never as a reason to abort the whole scheduler run.
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    async fn generate(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String, GraphError>;
}
