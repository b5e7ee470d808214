use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::llm::backend::{Backend, BackendError, GenerationRequest};

/// Configuration for the Ollama chat client.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server.
    pub base_url: String,
    /// Model to run (e.g. "cogito:8b").
    pub model: String,
    /// Temperature (lower = more deterministic)
    pub temperature: f64,
    /// Base context-window budget in tokens.
    pub num_ctx: u32,
    /// Base response-length budget in tokens.
    pub num_predict: u32,
    /// HTTP timeout in seconds; local models can be slow.
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "cogito:8b".to_string(),
            temperature: 0.1,
            num_ctx: 8192,
            num_predict: 2000,
            timeout_secs: 300,
        }
    }
}

impl OllamaConfig {
    /// Create config from environment variables, falling back to defaults.
    ///
    /// Honors OLLAMA_BASE_URL and OLLAMA_MODEL.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("OLLAMA_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(model) = std::env::var("OLLAMA_MODEL") {
            config.model = model;
        }
        config
    }
}

/// Ollama API client.
///
/// Owns one reqwest client reused across every section call in a run.
pub struct OllamaClient {
    client: Client,
    config: OllamaConfig,
}

impl OllamaClient {
    pub fn new(mut config: OllamaConfig) -> Self {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            config,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl Backend for OllamaClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        let body = OllamaChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                OllamaMessage {
                    role: "system".to_string(),
                    content: request.system.clone(),
                },
                OllamaMessage {
                    role: "user".to_string(),
                    content: request.user.clone(),
                },
            ],
            stream: false,
            // Constrains decoding to well-formed JSON; schema conformance is
            // still checked by the caller.
            format: "json".to_string(),
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_ctx: request.num_ctx.unwrap_or(self.config.num_ctx),
                num_predict: request.num_predict.unwrap_or(self.config.num_predict),
            },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.config.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api { status, body });
        }

        let decoded: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        if decoded.message.content.trim().is_empty() {
            return Err(BackendError::EmptyResponse);
        }

        Ok(decoded.message.content)
    }
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    format: String,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f64,
    num_ctx: u32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = OllamaConfig::default();
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.model, "cogito:8b");
        assert_eq!(config.num_ctx, 8192);
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = OllamaClient::new(OllamaConfig {
            base_url: "http://10.0.0.5:11434/".to_string(),
            ..Default::default()
        });
        assert_eq!(client.config.base_url, "http://10.0.0.5:11434");
    }
}
