use anyhow::Result;

use crate::cli::Commands;

use super::container::Container;
use super::controller::{ExplainController, IndexController, ResetController, SearchController, SearchOptions, StatusController, SummarizeController};

/// Dispatches a parsed CLI command to the controller that handles it
/// (spec §6). Grounded on `router.rs`; the `Api` command is not dispatched
/// here since it needs an owned `Arc<Container>` to hand to axum as request
/// state, so `main` handles it directly instead.
pub struct Router<'a> {
    index_controller: IndexController<'a>,
    summarize_controller: SummarizeController<'a>,
    status_controller: StatusController<'a>,
    reset_controller: ResetController<'a>,
    search_controller: SearchController<'a>,
    explain_controller: ExplainController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            index_controller: IndexController::new(container),
            summarize_controller: SummarizeController::new(container),
            status_controller: StatusController::new(container),
            reset_controller: ResetController::new(container),
            search_controller: SearchController::new(container),
            explain_controller: ExplainController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Index { dir, force, max_concurrent } => self.index_controller.index(dir, force, max_concurrent).await,
            Commands::Summarize => self.summarize_controller.summarize().await,
            Commands::Status => self.status_controller.status().await,
            Commands::Reset { confirm } => self.reset_controller.reset(confirm).await,
            Commands::Search { query, num, min_score, node_type, context, call_hierarchy, inheritance } => {
                let options = SearchOptions {
                    min_score,
                    node_types: node_type,
                    context,
                    call_hierarchy,
                    inheritance,
                };
                self.search_controller.search(query, num, options).await
            }
            Commands::Explain { query } => self.explain_controller.explain(query).await,
            Commands::Api { .. } => unreachable!("Api command is handled separately in main"),
        }
    }
}
