use async_trait::async_trait;

use crate::domain::error::GraphError;

/// Turns text into a fixed-dimension embedding vector (spec §4.5, §4.6).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn dimensions(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, GraphError>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, GraphError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}
