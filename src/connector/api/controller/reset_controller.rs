use anyhow::Result;

use super::super::Container;

pub struct ResetController<'a> {
    container: &'a Container,
}

impl<'a> ResetController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Without `--confirm`, only clears stale `processing` leases. With it,
    /// re-initializes the schema, which drops and recreates every table.
    pub async fn reset(&self, confirm: bool) -> Result<String> {
        if !confirm {
            let scheduler = self.container.summarization_scheduler();
            let cleared = scheduler.reset().await?;
            return Ok(format!(
                "Cleared {cleared} stale processing leases. Pass --confirm to wipe the graph entirely."
            ));
        }

        let store = self.container.store();
        store.init_schema().await?;
        Ok("Graph reset: schema re-initialized".to_string())
    }
}
