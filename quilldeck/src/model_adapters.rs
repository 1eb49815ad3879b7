// quilldeck/src/model_adapters.rs
//!
//! Model Adapters: remote summarization backends
//!
//! The document service talks to a remote model through the `ModelAdapter`
//! trait. The shipped implementation, `ChatCompletionsAdapter`, speaks the
//! OpenAI-compatible `/chat/completions` protocol and performs exactly one
//! blocking request per call: no retries, no streaming.

use crate::config::LlmConfig;
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// LLM generation result
#[derive(Debug, Clone)]
pub struct LlmGeneration {
    pub response: String,
    pub usage: TokenUsage,
}

/// Model adapter trait - common interface for remote backends
pub trait ModelAdapter: Send + Sync {
    /// Generate text from a prompt. `timeout` overrides the adapter's own bound.
    fn generate(&self, prompt: &str, timeout: Option<Duration>) -> Result<LlmGeneration>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

/// Builds the single user message sent for a summary request.
pub fn summarization_prompt(content: &str, style: &str, max_chars: usize) -> String {
    format!(
        "Please summarize the following content in {style} style within {max_chars} characters:\n\n{content}"
    )
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub finish_reason: Option<String>,
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

// ============================================================================
// OpenAI-Compatible Chat Completions Adapter
// ============================================================================

pub struct ChatCompletionsAdapter {
    api_key: String,
    api_base: String,
    model: String,
    timeout: Duration,
    agent: ureq::Agent,
}

impl std::fmt::Debug for ChatCompletionsAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsAdapter")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ChatCompletionsAdapter {
    /// Fails fast when the base URL or API key is missing.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            bail!("LLM base URL is not configured");
        }
        if config.api_key.trim().is_empty() {
            bail!("LLM API key is not configured");
        }

        if config.timeout_secs == 0 {
            bail!("LLM timeout must be at least one second");
        }

        let timeout = config.timeout();
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();

        Ok(Self {
            api_key: config.api_key.clone(),
            api_base: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout,
            agent,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }

    pub fn build_request(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        }
    }
}

impl ModelAdapter for ChatCompletionsAdapter {
    fn generate(&self, prompt: &str, timeout: Option<Duration>) -> Result<LlmGeneration> {
        let payload = self.build_request(prompt);
        let url = self.endpoint();

        tracing::debug!(url = %url, model = %self.model, prompt_chars = prompt.chars().count(), "sending chat completion request");

        let response = self
            .agent
            .post(&url)
            .timeout(timeout.unwrap_or(self.timeout))
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .set("Content-Type", "application/json")
            .send_json(&payload);

        // Handle HTTP errors, keeping the body for context
        let response = match response {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp
                    .into_string()
                    .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
                bail!("{} API returned HTTP {}: {}", self.provider_name(), code, body);
            }
            Err(e) => {
                return Err(anyhow!(e))
                    .with_context(|| format!("failed to call {} API", self.provider_name()));
            }
        };

        let status = response.status();
        if !(200..300).contains(&status) {
            let body = response.into_string().unwrap_or_default();
            bail!("{} API returned HTTP {}: {}", self.provider_name(), status, body);
        }

        let parsed: ChatResponse = response
            .into_json()
            .with_context(|| format!("failed to parse {} API response", self.provider_name()))?;

        let usage = parsed.usage.unwrap_or_default();
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("{} API returned no choices in response", self.provider_name()))?;

        tracing::debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            "chat completion received"
        );

        Ok(LlmGeneration {
            response: choice.message.content,
            usage,
        })
    }

    fn provider_name(&self) -> &'static str {
        "chat completion"
    }
}
