use anyhow::Result;

use crate::domain::models::SearchConfig;

use super::super::Container;

pub struct ExplainController<'a> {
    container: &'a Container,
}

impl<'a> ExplainController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn explain(&self, query: String) -> Result<String> {
        let facade = self.container.search_facade();
        let config = SearchConfig::default();

        let (outcome, explanations) = facade.explain(&query, &config).await?;
        if explanations.is_empty() {
            return Ok(format!("No results for \"{query}\""));
        }

        let mut out = format!(
            "Query parsed as {:?} (confidence {:.2}, entities {:?}, semantic terms {:?})\n",
            outcome.intent.query_type, outcome.intent.confidence, outcome.intent.entities, outcome.intent.semantic_terms
        );
        for line in explanations {
            out.push_str(&format!("  {line}\n"));
        }
        Ok(out)
    }
}
