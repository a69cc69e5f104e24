use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::application::interfaces::{GraphStore, SummaryProvider};
use crate::domain::error::GraphError;
use crate::domain::models::{LevelProgress, Node, NodeLabel};

const NODE_FETCH_BATCH_SIZE: usize = 50;
const MAX_CONCURRENT_GENERATIONS: usize = 5;
const INTER_LEVEL_DELAY: Duration = Duration::from_secs(1);
const MAX_RELATED_SUMMARIES: usize = 5;
const SUMMARY_MAX_TOKENS: u32 = 500;
const SUMMARY_TEMPERATURE: f32 = 0.1;

/// Level-specific guidance injected into the summarization prompt (spec §4.4,
/// §4.5), grounded verbatim on `summarization_orchestrator.py`'s
/// `_create_hierarchical_prompt` focus text.
fn focus_guidance(label: NodeLabel) -> &'static str {
    match label {
        NodeLabel::Parameter => "type, purpose, constraints, default values",
        NodeLabel::Variable => "type, purpose, scope, usage pattern",
        NodeLabel::Method | NodeLabel::Function => "purpose, parameters, return value, side effects, algorithm",
        NodeLabel::Class | NodeLabel::Interface => "responsibility, key methods, relationships, design patterns",
        NodeLabel::File => "main purpose, key classes/functions, external dependencies",
        NodeLabel::Directory => "overall role within the codebase, notable sub-modules",
        NodeLabel::Import | NodeLabel::Export => "what is brought in or exposed, and why",
    }
}

fn build_prompt(node: &Node, children: &[String], related: &[String]) -> String {
    let mut prompt = format!(
        "Summarize this {} named `{}`.\nFocus on: {}.\n",
        node.label(),
        node.name(),
        focus_guidance(node.label())
    );
    if let Some(code) = node.raw_code() {
        prompt.push_str(&format!("\nSource:\n```\n{code}\n```\n"));
    }
    if !children.is_empty() {
        prompt.push_str("\nChild summaries:\n");
        for child in children {
            prompt.push_str(&format!("- {child}\n"));
        }
    }
    if !related.is_empty() {
        prompt.push_str("\nRelated context:\n");
        for rel in related {
            prompt.push_str(&format!("- {rel}\n"));
        }
    }
    prompt
}

/// Drives bottom-up hierarchical summarization across all eight node levels
/// (spec §4.4, C5). Grounded directly on
/// `summarization_orchestrator.py`'s `run_hierarchical_summarization`: level
/// order, a dependency-readiness gate, an advisory `processing` lease per
/// node, bounded-concurrency LLM submission, and a pause between levels.
pub struct SummarizationSchedulerUseCase {
    store: Arc<dyn GraphStore>,
    provider: Arc<dyn SummaryProvider>,
}

impl SummarizationSchedulerUseCase {
    pub fn new(store: Arc<dyn GraphStore>, provider: Arc<dyn SummaryProvider>) -> Self {
        Self { store, provider }
    }

    pub async fn run(&self) -> Result<(), GraphError> {
        for label in NodeLabel::summarization_order() {
            self.process_level(label).await?;
            tokio::time::sleep(INTER_LEVEL_DELAY).await;
        }
        Ok(())
    }

    async fn process_level(&self, label: NodeLabel) -> Result<(), GraphError> {
        loop {
            let candidates = self.store.nodes_ready_for_summary(label, NODE_FETCH_BATCH_SIZE).await?;
            let mut ready = Vec::new();
            for node in candidates {
                if self.store.dependencies_ready(node.id()).await? {
                    ready.push(node);
                }
            }
            if ready.is_empty() {
                break;
            }

            let store = &self.store;
            let provider = &self.provider;
            stream::iter(ready.into_iter().map(|node| async move {
                if let Err(err) = summarize_one(store.as_ref(), provider.as_ref(), &node).await {
                    warn!("failed to summarize {} ({}): {err}", node.full_name(), node.id());
                }
            }))
            .buffer_unordered(MAX_CONCURRENT_GENERATIONS)
            .collect::<Vec<_>>()
            .await;
        }
        Ok(())
    }

    /// Clears every stale `processing` lease, e.g. after a crashed run (spec §4.4).
    pub async fn reset(&self) -> Result<usize, GraphError> {
        let cleared = self.store.reset_processing_status().await?;
        info!("cleared {cleared} stale processing leases");
        Ok(cleared)
    }

    pub async fn progress(&self) -> Result<Vec<(NodeLabel, LevelProgress)>, GraphError> {
        let mut out = Vec::with_capacity(8);
        for label in NodeLabel::summarization_order() {
            out.push((label, self.store.summarization_progress(label).await?));
        }
        Ok(out)
    }
}

async fn summarize_one(store: &dyn GraphStore, provider: &dyn SummaryProvider, node: &Node) -> Result<(), GraphError> {
    store.mark_summary_processing(node.id()).await?;
    let children = store.child_summaries(node.id()).await?;
    let related = store.related_summaries(node.id(), MAX_RELATED_SUMMARIES).await?;
    let prompt = build_prompt(node, &children, &related);
    let summary = provider.generate(&prompt, SUMMARY_MAX_TOKENS, SUMMARY_TEMPERATURE).await?;
    store.set_summary(node.id(), &summary).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_guidance_matches_the_spec_text_per_level() {
        assert_eq!(focus_guidance(NodeLabel::Parameter), "type, purpose, constraints, default values");
        assert_eq!(
            focus_guidance(NodeLabel::Function),
            "purpose, parameters, return value, side effects, algorithm"
        );
        assert_eq!(focus_guidance(NodeLabel::File), "main purpose, key classes/functions, external dependencies");
    }

    #[test]
    fn prompt_includes_code_and_child_context_when_present() {
        let node = Node::new("n1".into(), NodeLabel::Function, "parse".into(), "mod::parse".into())
            .with_raw_code("fn parse() {}");
        let prompt = build_prompt(&node, &["helper does X".to_string()], &[]);
        assert!(prompt.contains("fn parse() {}"));
        assert!(prompt.contains("helper does X"));
    }
}
