use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use rand::Rng;
use rand::SeedableRng;
use tracing::debug;

use crate::application::interfaces::EmbeddingProvider;
use crate::domain::error::GraphError;

const DEFAULT_DIMENSIONS: usize = 768;

/// Deterministic embedding provider used when no real embedding model is
/// configured: hashes the input text into a seed and generates a unit-length
/// pseudo-random vector from it, so identical text always embeds to the
/// same point (spec §4.5/§4.6). Grounded on `mock_embedding.rs`, with the
/// default dimension raised to match the 768-dimension vector columns
/// (`jina-embeddings-v2-base-code`) the rest of the pipeline assumes.
pub struct MockEmbeddingProvider {
    dimensions: usize,
}

impl MockEmbeddingProvider {
    pub fn new() -> Self {
        Self { dimensions: DEFAULT_DIMENSIONS }
    }

    pub fn with_dimensions(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn generate(&self, text: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();

        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let mut vector: Vec<f32> = (0..self.dimensions).map(|_| rng.gen_range(-1.0..1.0)).collect();

        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for x in &mut vector {
                *x /= magnitude;
            }
        }
        vector
    }
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, GraphError> {
        let vector = self.generate(text);
        debug!("generated mock embedding with {} dimensions", vector.len());
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identical_text_embeds_identically() {
        let provider = MockEmbeddingProvider::new();
        let a = provider.embed("hello world").await.unwrap();
        let b = provider.embed("hello world").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn default_dimensions_match_the_store_schema() {
        let provider = MockEmbeddingProvider::new();
        let vector = provider.embed("test").await.unwrap();
        assert_eq!(vector.len(), 768);
    }

    #[tokio::test]
    async fn embeddings_are_unit_normalized() {
        let provider = MockEmbeddingProvider::new();
        let vector = provider.embed("test").await.unwrap();
        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 0.001);
    }
}
