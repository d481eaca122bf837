//! Summarization provider abstraction and implementations.
//!
//! Defines the [`Summarizer`] trait, a [`ProviderRegistry`] that maps model
//! identifiers to provider instances, and the [`DeepSeekSummarizer`] backed
//! by the DeepSeek chat-completion API.
//!
//! Adding a model means registering another entry in the registry; nothing
//! in the call path branches on model names.
//!
//! The outbound call is a single attempt with a configurable timeout. The
//! provider requires a bearer credential in the `DEEPSEEK_API_KEY`
//! environment variable.

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::SummarizerConfig;

const SYSTEM_PROMPT: &str = "You are a professional article summarization assistant. \
Write a clear, concise summary of the article the user provides, no longer than \
200 characters. Output only the summary text, with no extra explanation or commentary.";

/// Display metadata for a registered model, served by the models listing.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub description: String,
}

/// Trait for summarization providers.
#[async_trait]
pub trait Summarizer: Send + Sync + std::fmt::Debug {
    /// The model identifier this provider answers to (e.g. `"deepseek-chat"`).
    fn model_id(&self) -> &str;

    /// Display metadata for the models listing.
    fn info(&self) -> ModelInfo;

    /// Produce summary text for the given document content.
    async fn summarize(&self, content: &str) -> Result<String>;
}

/// Capability-indexed mapping from model identifier to provider.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn Summarizer>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the standard providers for the given configuration.
    pub fn with_defaults(config: &SummarizerConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DeepSeekSummarizer::new(config)));
        registry
    }

    pub fn register(&mut self, provider: Arc<dyn Summarizer>) {
        self.providers
            .insert(provider.model_id().to_string(), provider);
    }

    /// Look up the provider for a model id, failing for unknown models.
    pub fn find(&self, model: &str) -> Result<Arc<dyn Summarizer>> {
        match self.providers.get(model) {
            Some(p) => Ok(p.clone()),
            None => bail!("unsupported model: {}", model),
        }
    }

    /// `{model id → {name, description}}` for every registered provider.
    pub fn models(&self) -> BTreeMap<String, ModelInfo> {
        self.providers
            .iter()
            .map(|(id, p)| (id.clone(), p.info()))
            .collect()
    }
}

// ============ DeepSeek Provider ============

/// Summarizer backed by the DeepSeek chat-completion API.
///
/// Sends `POST {api_base}/chat/completions` with a fixed system prompt and
/// the document content as the user message, and extracts
/// `choices[0].message.content` from the response.
#[derive(Debug)]
pub struct DeepSeekSummarizer {
    api_base: String,
    timeout_secs: u64,
}

impl DeepSeekSummarizer {
    pub fn new(config: &SummarizerConfig) -> Self {
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
        }
    }
}

#[async_trait]
impl Summarizer for DeepSeekSummarizer {
    fn model_id(&self) -> &str {
        "deepseek-chat"
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            name: "DeepSeek Chat".to_string(),
            description: "General-purpose chat model provided by DeepSeek".to_string(),
        }
    }

    async fn summarize(&self, content: &str) -> Result<String> {
        let api_key = std::env::var("DEEPSEEK_API_KEY")
            .map_err(|_| anyhow::anyhow!("DEEPSEEK_API_KEY not set"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()?;

        let body = serde_json::json!({
            "model": "deepseek-chat",
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": format!("Summarize the following article:\n\n{}", content) },
            ],
            "stream": false,
        });

        let response = client
            .post(format!("{}/chat/completions", self.api_base))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("DeepSeek API error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response.json().await?;
        parse_chat_response(&json)
    }
}

/// Extract the assistant message text from a chat-completion response.
fn parse_chat_response(json: &serde_json::Value) -> Result<String> {
    let text = json
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str());

    match text {
        Some(t) if !t.is_empty() => Ok(t.to_string()),
        _ => bail!("Invalid chat-completion response: missing message content"),
    }
}
