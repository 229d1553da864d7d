//! OpenAI-compatible HTTP providers for embeddings and generation.
//!
//! Any service exposing the OpenAI wire shapes works here (OpenAI, Groq,
//! local inference gateways). Calls are blocking; callers own timeout policy
//! beyond the per-request default and any retry behavior.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::ask::GenerationProvider;
use crate::embed::EmbeddingProvider;
use crate::error::{ReportQaError, Result};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings shared by both providers.
#[derive(Debug, Clone)]
pub struct HttpProviderConfig {
    /// Base URL up to the API root, e.g. `https://api.groq.com/openai/v1`.
    pub base_url: String,
    pub api_key: String,
    /// Opaque model identifier passed through to the service.
    pub model: String,
    pub timeout: Duration,
}

impl HttpProviderConfig {
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }
}

/// `POST /embeddings` provider.
pub struct OpenAiEmbedder {
    client: reqwest::blocking::Client,
    config: HttpProviderConfig,
    dimension: usize,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    pub fn new(config: HttpProviderConfig, dimension: usize) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| ReportQaError::Embedding {
                reason: format!("failed to build HTTP client: {err}"),
            })?;
        Ok(Self {
            client,
            config,
            dimension,
        })
    }
}

impl EmbeddingProvider for OpenAiEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(self.config.endpoint("embeddings"))
            .bearer_auth(&self.config.api_key)
            .json(&json!({ "model": self.config.model, "input": text }))
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|err| ReportQaError::Embedding {
                reason: err.to_string(),
            })?;

        let parsed: EmbeddingResponse =
            response.json().map_err(|err| ReportQaError::Embedding {
                reason: format!("malformed embedding response: {err}"),
            })?;
        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|datum| datum.embedding)
            .ok_or_else(|| ReportQaError::Embedding {
                reason: "provider returned no embedding".to_string(),
            })?;

        if vector.len() != self.dimension {
            return Err(ReportQaError::EmbeddingDimension {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.config.model
    }
}

/// `POST /chat/completions` provider with temperature pinned to zero by
/// default to maximize determinism.
pub struct OpenAiGenerator {
    client: reqwest::blocking::Client,
    config: HttpProviderConfig,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl OpenAiGenerator {
    pub fn new(config: HttpProviderConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| ReportQaError::Generation {
                reason: format!("failed to build HTTP client: {err}"),
            })?;
        Ok(Self {
            client,
            config,
            temperature: 0.0,
        })
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

impl GenerationProvider for OpenAiGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.config.model,
            "temperature": self.temperature,
            "messages": [{ "role": "user", "content": prompt }],
        });
        let response = self
            .client
            .post(self.config.endpoint("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|err| ReportQaError::Generation {
                reason: err.to_string(),
            })?;

        let parsed: ChatResponse = response.json().map_err(|err| ReportQaError::Generation {
            reason: format!("malformed completion response: {err}"),
        })?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ReportQaError::Generation {
                reason: "provider returned no choices".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_url_without_double_slashes() {
        let config = HttpProviderConfig::new("https://api.example.com/v1/", "key", "model-x");
        assert_eq!(
            config.endpoint("embeddings"),
            "https://api.example.com/v1/embeddings"
        );
        let bare = HttpProviderConfig::new("https://api.example.com/v1", "key", "model-x");
        assert_eq!(
            bare.endpoint("chat/completions"),
            "https://api.example.com/v1/chat/completions"
        );
    }
}
