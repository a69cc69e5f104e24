use anyhow::Result;

use super::super::Container;

pub struct SummarizeController<'a> {
    container: &'a Container,
}

impl<'a> SummarizeController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn summarize(&self) -> Result<String> {
        let scheduler = self.container.summarization_scheduler();
        scheduler.run().await?;

        let embedder = self.container.embedding_worker();
        let stats = embedder.run_all(50).await?;

        Ok(format!(
            "Summarization complete. Embedded {} nodes ({} via fallback text, {} errors)",
            stats.embedded, stats.fallback, stats.errors
        ))
    }
}
