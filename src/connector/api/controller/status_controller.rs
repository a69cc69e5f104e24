use anyhow::Result;

use super::super::Container;

pub struct StatusController<'a> {
    container: &'a Container,
}

impl<'a> StatusController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn status(&self) -> Result<String> {
        let store = self.container.store();
        let stats = store.stats().await?;

        let mut out = format!(
            "{} files, {} nodes, {} relationships\n{} summarized, {} embedded ({} via fallback)\n",
            stats.file_count,
            stats.total_nodes(),
            stats.total_relationships(),
            stats.summarized_count,
            stats.embedded_count,
            stats.fallback_embedding_count
        );

        out.push_str("\nBy label:\n");
        let mut labels: Vec<_> = stats.node_counts_by_label.iter().collect();
        labels.sort_by_key(|(label, _)| label.to_string());
        for (label, count) in labels {
            out.push_str(&format!("  {label}: {count}\n"));
        }

        out.push_str("\nSummarization progress:\n");
        let scheduler = self.container.summarization_scheduler();
        for (label, progress) in scheduler.progress().await? {
            out.push_str(&format!(
                "  {label}: {}/{} ({} processing, {} remaining)\n",
                progress.completed, progress.total, progress.processing, progress.remaining
            ));
        }

        Ok(out)
    }
}
