//! Ollama client configuration.

use serde::{Deserialize, Serialize};

use crate::config::env_first;

/// Configuration for the Ollama embedding client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Whether the embedding service may be called
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Ollama API endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Embedding model name
    #[serde(default = "default_model")]
    pub model: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Texts sent per embedding request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Embedding requests kept in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_batch_size() -> usize {
    32
}

fn default_concurrency() -> usize {
    1
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            batch_size: default_batch_size(),
            concurrency: default_concurrency(),
        }
    }
}

impl LlmConfig {
    /// Check if the config equals the default (for skip_serializing_if).
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `OLLAMA_ENABLED`: "true" or "false"
    /// - `OLLAMA_URL` (or `ollama-url`): API endpoint
    /// - `OLLAMA_MODEL` (or `model-name`): embedding model
    /// - `OLLAMA_TIMEOUT`: request timeout in seconds
    /// - `OLLAMA_BATCH_SIZE`: texts per request
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("OLLAMA_ENABLED") {
            self.enabled = val.eq_ignore_ascii_case("true") || val == "1";
        }
        if let Some(endpoint) = env_first(&["OLLAMA_URL", "ollama-url"]) {
            self.endpoint = endpoint;
        }
        if let Some(model) = env_first(&["OLLAMA_MODEL", "model-name"]) {
            self.model = model;
        }
        if let Ok(val) = std::env::var("OLLAMA_TIMEOUT") {
            if let Ok(n) = val.parse() {
                self.timeout_secs = n;
            }
        }
        if let Ok(val) = std::env::var("OLLAMA_BATCH_SIZE") {
            if let Ok(n) = val.parse() {
                self.batch_size = n;
            }
        }
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Effective batch size, never zero.
    pub fn batch_size(&self) -> usize {
        self.batch_size.max(1)
    }
}
