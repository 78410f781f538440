//! Summarization model seam.
//!
//! [`SummaryModel`] is the only thing the orchestrator knows about a model.
//! [`ChatCompletionModel`] implements it against any OpenAI-compatible
//! `/chat/completions` endpoint (vLLM, SGLang, text-generation-inference).

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Length and decoding limits for one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationBounds {
    /// Upper bound on generated tokens
    pub max_length: u32,
    /// Lower bound on generated tokens
    pub min_length: u32,
    /// Greedy decoding, no sampling
    pub deterministic: bool,
}

impl Default for GenerationBounds {
    fn default() -> Self {
        Self {
            max_length: 220,
            min_length: 80,
            deterministic: true,
        }
    }
}

/// Error types for model calls
#[derive(Debug, Error)]
pub enum ModelError {
    /// Transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the backend
    #[error("Server error: HTTP {status} - {body}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// No response within the configured timeout
    #[error("Timeout after {0}s")]
    Timeout(u64),

    /// Backend answered without any text
    #[error("Empty response")]
    EmptyResponse,

    /// Backend answered with something other than a completion
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Backend could not be reached or configured
    #[error("Model unavailable: {0}")]
    Unavailable(String),
}

/// A text summarizer that may fail.
///
/// Calls block; callers on an async runtime should move them to a blocking
/// thread.
pub trait SummaryModel: Send + Sync {
    /// Summarize `text` within `bounds`.
    fn summarize(&self, text: &str, bounds: GenerationBounds) -> Result<String, ModelError>;

    /// Short name for logs.
    fn name(&self) -> &str {
        "model"
    }
}

/// Model backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Use the model at all
    pub enabled: bool,

    /// Base URL, e.g. `http://127.0.0.1:8000/v1`
    pub endpoint: String,

    /// Model name sent with each request
    pub model: String,

    /// Environment variable holding a bearer token
    pub api_key_env: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Check `GET {endpoint}/models` once at startup
    pub probe_on_startup: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "http://127.0.0.1:8000/v1".to_string(),
            model: "google/flan-t5-small".to_string(),
            api_key_env: None,
            timeout_secs: 30,
            probe_on_startup: true,
        }
    }
}

impl ModelConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(format!(
                "summarizer endpoint must be an http(s) URL, got {:?}",
                self.endpoint
            ));
        }
        if self.model.trim().is_empty() {
            return Err("summarizer model name cannot be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("summarizer timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    min_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// OpenAI-compatible chat completion backend
pub struct ChatCompletionModel {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout_secs: u64,
}

impl ChatCompletionModel {
    /// Build the HTTP client from configuration
    pub fn new(config: &ModelConfig) -> Result<Self, ModelError> {
        config.validate().map_err(ModelError::Unavailable)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let api_key = match &config.api_key_env {
            Some(var) => Some(std::env::var(var).map_err(|_| {
                ModelError::Unavailable(format!("environment variable {var} is not set"))
            })?),
            None => None,
        };

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            timeout_secs: config.timeout_secs,
        })
    }

    fn request(&self, builder: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> ModelError {
        if err.is_timeout() {
            ModelError::Timeout(self.timeout_secs)
        } else {
            ModelError::Http(err)
        }
    }

    /// Check that the backend answers `GET {endpoint}/models`
    pub fn probe(&self) -> Result<(), ModelError> {
        let url = format!("{}/models", self.endpoint);
        let response = self
            .request(self.client.get(&url))
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ModelError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

impl SummaryModel for ChatCompletionModel {
    fn summarize(&self, text: &str, bounds: GenerationBounds) -> Result<String, ModelError> {
        let url = format!("{}/chat/completions", self.endpoint);
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: text.to_string(),
            }],
            max_tokens: bounds.max_length,
            min_tokens: bounds.min_length,
            temperature: bounds.deterministic.then_some(0.0),
            stream: false,
        };

        let response = self
            .request(self.client.post(&url).json(&request))
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ModelError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response.json().map_err(|e| {
            if e.is_timeout() {
                ModelError::Timeout(self.timeout_secs)
            } else {
                ModelError::Malformed(e.to_string())
            }
        })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(ModelError::EmptyResponse);
        }
        Ok(content)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
