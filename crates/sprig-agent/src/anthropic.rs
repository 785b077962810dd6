//! Direct Anthropic Messages API client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sprig_core::traits::TextGenerator;
use tracing::{debug, warn};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const MAX_TOKENS: u32 = 256;

/// `TextGenerator` backed by the Anthropic Messages API.
pub struct AnthropicGenerator {
    client: Client,
    model: String,
    api_key: String,
}

impl std::fmt::Debug for AnthropicGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicGenerator")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct ApiRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ApiMessage>,
}

#[derive(Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

impl AnthropicGenerator {
    /// Create a generator reading `ANTHROPIC_API_KEY` from the environment.
    pub fn from_env(model: &str) -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .context("ANTHROPIC_API_KEY is not set")?;
        Ok(Self::with_key(api_key, model))
    }

    /// Create from an explicit key (for testing).
    pub fn with_key(api_key: impl Into<String>, model: &str) -> Self {
        Self {
            client: Client::new(),
            model: strip_provider_prefix(model).to_owned(),
            api_key: api_key.into(),
        }
    }
}

/// Strip a "provider/" prefix from a model id
/// (e.g. "anthropic/claude-sonnet-4-20250514" -> "claude-sonnet-4-20250514").
fn strip_provider_prefix(model: &str) -> &str {
    let model = if model.is_empty() { DEFAULT_MODEL } else { model };
    model.rsplit_once('/').map_or(model, |(_, name)| name)
}

/// Collect the text blocks of a Messages API response body.
fn collect_text(response: &ApiResponse) -> String {
    response
        .content
        .iter()
        .filter(|block| block.block_type == "text")
        .map(|block| block.text.as_str())
        .collect()
}

#[async_trait]
impl TextGenerator for AnthropicGenerator {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = ApiRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![ApiMessage {
                role: "user",
                content: prompt.to_owned(),
            }],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "calling Anthropic API");

        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .context("sending request to Anthropic API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Anthropic API error {status}: {body}");
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .context("decoding Anthropic API response")?;

        let text = collect_text(&parsed);
        if text.is_empty() {
            warn!("Anthropic API returned empty content");
        }
        Ok(text)
    }
}
