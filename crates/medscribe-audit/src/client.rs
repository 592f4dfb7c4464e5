//! Model-call collaborator: the transport seam and its production client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;

/// One synchronous text-generation capability.
///
/// Auditors depend on this trait rather than a concrete client, so tests can
/// substitute fakes that error, stall, or return prose. Errors from the
/// transport (timeout, auth failure, quota) surface through the `Result`;
/// what happens next is the caller's failure policy, not the client's.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Perform one text-generation call and return the raw response text.
    async fn generate(&self, prompt: &str, model_id: &str) -> Result<String>;
}

#[async_trait]
impl<T: ModelClient + ?Sized> ModelClient for &T {
    async fn generate(&self, prompt: &str, model_id: &str) -> Result<String> {
        (**self).generate(prompt, model_id).await
    }
}

/// OpenAI-compatible chat-completions client.
///
/// Constructed explicitly and passed into auditors; no module-level
/// singleton.
#[derive(Debug, Clone)]
pub struct ChatClient {
    api_key: String,
    http_client: reqwest::Client,
    base_url: String,
    max_tokens: usize,
}

/// Chat API request
#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: usize,
    temperature: f32,
    response_format: ResponseFormat,
}

/// Response format specification
#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

/// Chat message
#[derive(Debug, Clone, Serialize)]
struct Message {
    role: String,
    content: String,
}

/// Chat API response
#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

/// Response choice
#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

/// Response message content
#[derive(Debug, Clone, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

const SYSTEM_PROMPT: &str = "You are a clinical data extraction reviewer. \
Check extracted record fields against the dictated transcript and respond \
with structured JSON only.";

impl ChatClient {
    /// Create a client with an explicit API key.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    #[must_use = "creating a client that is not used is a waste of resources"]
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = env::var("MEDSCRIBE_API_BASE")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        Ok(Self {
            api_key: api_key.into(),
            http_client,
            base_url,
            max_tokens: 2048,
        })
    }

    /// Create a client from environment variables.
    ///
    /// - `MEDSCRIBE_API_KEY`: bearer token (required)
    /// - `MEDSCRIBE_API_BASE`: API base URL (default `https://api.openai.com/v1`)
    ///
    /// # Errors
    /// Returns an error if `MEDSCRIBE_API_KEY` is not set.
    #[must_use = "creating a client that is not used is a waste of resources"]
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("MEDSCRIBE_API_KEY")
            .context("MEDSCRIBE_API_KEY environment variable not set")?;
        Self::new(api_key)
    }

    /// Override the maximum response token count.
    #[inline]
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl ModelClient for ChatClient {
    async fn generate(&self, prompt: &str, model_id: &str) -> Result<String> {
        let request = ChatRequest {
            model: model_id.to_string(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
            // Zero temperature for maximum determinism
            temperature: 0.0,
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
        };

        tracing::debug!(model = model_id, prompt_len = prompt.len(), "model call");

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send model API request")?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to read model API response")?;

        if !status.is_success() {
            anyhow::bail!("model API request failed with status {status}: {response_text}");
        }

        let chat_response: ChatResponse =
            serde_json::from_str(&response_text).context("Failed to parse model API response")?;

        let message_content = chat_response
            .choices
            .first()
            .context("No choices in model response")?
            .message
            .content
            .clone()
            .context("No content in model response")?;

        tracing::debug!(response_len = message_content.len(), "model call complete");

        Ok(message_content)
    }
}
