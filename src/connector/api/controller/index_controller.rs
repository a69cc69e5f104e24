use anyhow::Result;

use crate::application::use_cases::IndexOptions;

use super::super::Container;

pub struct IndexController<'a> {
    container: &'a Container,
}

impl<'a> IndexController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn index(&self, dir: String, force: bool, max_concurrent: Option<usize>) -> Result<String> {
        let use_case = self.container.index_use_case();
        let options = IndexOptions { force, max_concurrent };
        let report = use_case.execute_with_options(std::path::Path::new(&dir), options).await?;

        Ok(format!(
            "Indexed {}: {} files scanned, {} changed, {} fragments parsed, {} nodes / {} relationships upserted ({} errors)",
            dir,
            report.files_scanned,
            report.files_changed,
            report.fragments_parsed,
            report.ingestion.nodes_upserted,
            report.ingestion.relationships_upserted,
            report.ingestion.errors
        ))
    }
}
