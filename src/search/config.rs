//! Elasticsearch connection and retrieval configuration.

use serde::{Deserialize, Serialize};

use crate::config::env_first;

/// Index name used when none is configured.
pub const DEFAULT_INDEX: &str = "default";

/// Configuration for the Elasticsearch client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Cluster URL
    #[serde(default = "default_url")]
    pub url: String,
    /// API key sent as `Authorization: ApiKey <key>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Index holding the movie segments
    #[serde(default = "default_index")]
    pub index: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Candidates considered per shard by kNN search
    #[serde(default = "default_num_candidates")]
    pub num_candidates: usize,
    /// Documents per bulk request
    #[serde(default = "default_bulk_size")]
    pub bulk_size: usize,
    /// Accept self-signed certificates (local clusters)
    #[serde(default)]
    pub insecure: bool,
}

fn default_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_index() -> String {
    DEFAULT_INDEX.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_num_candidates() -> usize {
    100
}

fn default_bulk_size() -> usize {
    500
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            api_key: None,
            index: default_index(),
            timeout_secs: default_timeout_secs(),
            num_candidates: default_num_candidates(),
            bulk_size: default_bulk_size(),
            insecure: false,
        }
    }
}

impl SearchConfig {
    /// Check if the config equals the default (for skip_serializing_if).
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `ELASTICSEARCH_URL` (or `server-url`)
    /// - `ELASTICSEARCH_API_KEY` (or `api-key`)
    /// - `ELASTICSEARCH_INDEX`
    /// - `ELASTICSEARCH_INSECURE`: "true" or "1"
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = env_first(&["ELASTICSEARCH_URL", "server-url"]) {
            self.url = url;
        }
        if let Some(key) = env_first(&["ELASTICSEARCH_API_KEY", "api-key"]) {
            self.api_key = Some(key);
        }
        if let Some(index) = env_first(&["ELASTICSEARCH_INDEX"]) {
            self.index = index;
        }
        if let Ok(val) = std::env::var("ELASTICSEARCH_INSECURE") {
            self.insecure = val.eq_ignore_ascii_case("true") || val == "1";
        }
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    pub fn with_index(mut self, index: &str) -> Self {
        self.index = index.to_string();
        self
    }

    /// Effective bulk size, never zero.
    pub fn bulk_size(&self) -> usize {
        self.bulk_size.max(1)
    }
}
