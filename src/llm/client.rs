//! Ollama client for text embeddings.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::config::LlmConfig;
use super::embedder::{Embedder, Embedding};

/// Ollama embedding client.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

/// Ollama `/api/embed` request format.
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

/// Ollama `/api/embed` response format.
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Embedding>,
}

impl LlmClient {
    /// Create a new client with the given configuration.
    ///
    /// A trailing `/` on the endpoint is dropped so paths join cleanly.
    pub fn new(mut config: LlmConfig) -> Result<Self, LlmError> {
        config.endpoint = config.endpoint.trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Get the config.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Check if the Ollama service is reachable.
    pub async fn is_available(&self) -> bool {
        if !self.config.enabled {
            return false;
        }
        let url = format!("{}/api/tags", self.config.endpoint);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// List available models.
    pub async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/api/tags", self.config.endpoint);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        #[derive(Deserialize)]
        struct TagsResponse {
            models: Vec<ModelInfo>,
        }

        #[derive(Deserialize)]
        struct ModelInfo {
            name: String,
        }

        let tags: TagsResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Call `/api/embed` with a batch of inputs.
    async fn call_embed(&self, input: &[String]) -> Result<Vec<Embedding>, LlmError> {
        if !self.config.enabled {
            return Err(LlmError::Disabled);
        }

        let request = EmbedRequest {
            model: &self.config.model,
            input,
        };

        let url = format!("{}/api/embed", self.config.endpoint);
        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::NOT_FOUND && body.contains("not found") {
                return Err(LlmError::ModelNotFound(self.config.model.clone()));
            }
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let embed_resp: EmbedResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(embed_resp.embeddings)
    }
}

#[async_trait]
impl Embedder for LlmClient {
    async fn embed(&self, text: &str) -> Result<Embedding, LlmError> {
        let input = [text.to_string()];
        let mut embeddings = self.call_embed(&input).await?;
        let embedding = embeddings.pop().ok_or(LlmError::CountMismatch {
            expected: 1,
            actual: 0,
        })?;
        if embedding.is_empty() {
            return Err(LlmError::EmptyEmbedding);
        }
        Ok(embedding)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, LlmError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Embedding {} texts with {}", texts.len(), self.config.model);
        let embeddings = self.call_embed(texts).await?;

        if embeddings.len() != texts.len() {
            return Err(LlmError::CountMismatch {
                expected: texts.len(),
                actual: embeddings.len(),
            });
        }
        if embeddings.iter().any(|e| e.is_empty()) {
            return Err(LlmError::EmptyEmbedding);
        }

        info!(
            "Embedded {} texts ({} dimensions)",
            embeddings.len(),
            embeddings[0].len()
        );
        Ok(embeddings)
    }
}

/// Errors that can occur during embedding operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Failed to connect to the Ollama service
    #[error("Connection error: {0}")]
    Connection(String),
    /// API returned an error
    #[error("API error: {0}")]
    Api(String),
    /// Failed to parse response
    #[error("Parse error: {0}")]
    Parse(String),
    /// Model not pulled on the server
    #[error("Model not found: {0}")]
    ModelNotFound(String),
    /// The server answered with a zero-length vector
    #[error("Empty embedding returned")]
    EmptyEmbedding,
    /// Fewer or more vectors than inputs
    #[error("Expected {expected} embeddings, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
    /// Embedding is disabled in config
    #[error("Embedding service is disabled")]
    Disabled,
}
