use anyhow::Result;

use crate::domain::models::{NodeLabel, SearchConfig};

use super::super::Container;

#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub min_score: Option<f32>,
    pub node_types: Vec<String>,
    pub context: bool,
    pub call_hierarchy: bool,
    pub inheritance: bool,
}

pub struct SearchController<'a> {
    container: &'a Container,
}

impl<'a> SearchController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn search(&self, query: String, num: usize, options: SearchOptions) -> Result<String> {
        let facade = self.container.search_facade();
        let mut config = SearchConfig::default();
        config.max_total_results = num;
        if let Some(min_score) = options.min_score {
            config.min_similarity_threshold = min_score;
        }
        config.enable_context_expansion = options.context || options.call_hierarchy || options.inheritance;
        config.expand_call_hierarchy = options.call_hierarchy;
        config.expand_inheritance = options.inheritance;

        let node_types: Vec<NodeLabel> = options.node_types.iter().filter_map(|s| NodeLabel::parse(s)).collect();

        let mut outcome = facade.search(&query, &config).await?;
        if !node_types.is_empty() {
            outcome.results.retain(|r| node_types.contains(&r.label));
        }
        if outcome.results.is_empty() {
            return Ok(format!("No results for \"{query}\""));
        }

        let mut out = format!(
            "{} results for \"{query}\" ({:?}, confidence {:.2}):\n",
            outcome.results.len(),
            outcome.intent.query_type,
            outcome.intent.confidence
        );
        for result in &outcome.results {
            out.push_str(&format!(
                "  [{:.3}] {} ({}) via {}\n",
                result.score, result.full_name, result.label, result.match_type
            ));
            if let Some(summary) = &result.summary {
                out.push_str(&format!("        {summary}\n"));
            }
        }
        Ok(out)
    }
}
