use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::application::interfaces::SummaryProvider;
use crate::domain::error::GraphError;

/// Default target: LM Studio running locally on its standard port (spec §4.5).
const DEFAULT_BASE_URL: &str = "http://localhost:1234";
const MESSAGES_PATH: &str = "/v1/messages";
const ANTHROPIC_API_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "ministral-3b-2512";

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(serde::Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

/// A [`SummaryProvider`] that calls any Anthropic-API-compatible server to
/// generate node summaries (spec §4.5). Grounded on
/// `llm_query_expander.rs`'s client shape: local-first default URL, env-var
/// overrides, graceful fallback on any failure. Unlike the query expander,
/// this provider always needs the model's actual text back (there is no
/// "fall back to the original query" escape hatch), so a failed call
/// surfaces as a `GraphError::ProviderError` the scheduler logs and skips.
pub struct AnthropicSummaryProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
}

impl AnthropicSummaryProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base: String = base_url.into();
        let url = format!("{}{}", base.trim_end_matches('/'), MESSAGES_PATH);
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            url,
        }
    }

    /// Construct from environment variables, with local-first defaults:
    ///
    /// | Variable            | Default                 | Purpose                   |
    /// |---------------------|--------------------------|---------------------------|
    /// | `ANTHROPIC_BASE_URL`| `http://localhost:1234` | LM Studio / any server    |
    /// | `ANTHROPIC_MODEL`   | `ministral-3b-2512`     | Model loaded in LM Studio |
    /// | `ANTHROPIC_API_KEY` | `""` (empty)            | Not required for local    |
    pub fn from_env() -> Self {
        let base = std::env::var("ANTHROPIC_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let key = std::env::var("ANTHROPIC_API_KEY").unwrap_or_default();
        Self::new(key, model, base)
    }
}

#[async_trait]
impl SummaryProvider for AnthropicSummaryProvider {
    async fn generate(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String, GraphError> {
        let request = ApiRequest {
            model: &self.model,
            max_tokens,
            temperature,
            messages: vec![ApiMessage { role: "user", content: prompt }],
        };

        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| GraphError::provider(format!("summary request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::provider(format!("summary API returned {status}: {body}")));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| GraphError::provider(format!("failed to deserialize summary response: {e}")))?;

        let Some(block) = api_response.content.into_iter().next() else {
            warn!("summary API returned no content blocks");
            return Err(GraphError::provider("empty summary response"));
        };

        debug!("summary response: {}", block.text);
        Ok(block.text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_falls_back_to_local_defaults() {
        std::env::remove_var("ANTHROPIC_BASE_URL");
        std::env::remove_var("ANTHROPIC_MODEL");
        std::env::remove_var("ANTHROPIC_API_KEY");
        let provider = AnthropicSummaryProvider::from_env();
        assert!(provider.url.starts_with(DEFAULT_BASE_URL));
        assert_eq!(provider.model, DEFAULT_MODEL);
    }
}
