//! Configuration management for movie search using the prefer crate.
//!
//! Precedence, lowest first: built-in defaults, config file, environment,
//! command-line flags.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::LlmConfig;
use crate::search::{SearchConfig, SearchMode};

/// Name used for config file discovery (`moviesearch.toml`, `.json`, ...).
pub const CONFIG_NAME: &str = "moviesearch";

/// Query run by the demo when none is given.
pub const DEFAULT_QUERY: &str =
    "Find movies where the main character is stuck in a time loop and reliving the same day.";

/// Return the first non-empty value among several environment variables.
pub fn env_first(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.is_empty())
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config {path}: {message}")]
    Parse {
        format: &'static str,
        path: String,
        message: String,
    },
}

/// Movie catalogue location and format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// CSV file with the movie catalogue
    #[serde(default = "default_csv_path")]
    pub csv_path: String,
    /// Whether the first CSV line is a header
    #[serde(default = "default_has_header")]
    pub has_header: bool,
}

fn default_csv_path() -> String {
    "data/scifi_1000.csv".to_string()
}

fn default_has_header() -> bool {
    true
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            has_header: default_has_header(),
        }
    }
}

/// Defaults for query-time retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Search mode used when `--mode` is not given
    #[serde(default)]
    pub mode: SearchMode,
    /// Hits returned per query
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Drop hits scoring below this value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
}

fn default_max_results() -> usize {
    3
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::default(),
            max_results: default_max_results(),
            min_score: None,
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Catalogue settings.
    #[serde(default)]
    pub data: DataConfig,
    /// Elasticsearch connection.
    #[serde(default, skip_serializing_if = "SearchConfig::is_default")]
    pub elasticsearch: SearchConfig,
    /// Ollama embedding settings.
    #[serde(default, skip_serializing_if = "LlmConfig::is_default")]
    pub ollama: LlmConfig,
    /// Retrieval defaults.
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Discover a config file with prefer, falling back to defaults.
    pub async fn load() -> Self {
        match prefer::load(CONFIG_NAME).await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("Ignoring config file: {}", e);
                            Self::default_with_env()
                        }
                    }
                } else {
                    Self::default_with_env()
                }
            }
            Err(_) => Self::default_with_env(),
        }
    }

    /// Defaults with environment overrides applied.
    pub fn default_with_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load config from a specific file, choosing the format by extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })?;

        let mut config = Self::parse(&contents, path)?;
        config.source_path = Some(path.to_path_buf());
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config.with_env_overrides())
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_error = |format: &'static str, message: String| ConfigError::Parse {
            format,
            path: path.display().to_string(),
            message,
        };

        match ext {
            "toml" => toml::from_str(contents).map_err(|e| parse_error("TOML", e.to_string())),
            "yaml" | "yml" => {
                serde_yaml::from_str(contents).map_err(|e| parse_error("YAML", e.to_string()))
            }
            _ => serde_json::from_str(contents).map_err(|e| parse_error("JSON", e.to_string())),
        }
    }

    /// Apply environment variable overrides to every section.
    ///
    /// `MOVIES_CSV` overrides the catalogue path.
    pub fn with_env_overrides(mut self) -> Self {
        self.elasticsearch = self.elasticsearch.with_env_overrides();
        self.ollama = self.ollama.with_env_overrides();
        if let Some(path) = env_first(&["MOVIES_CSV"]) {
            self.data.csv_path = path;
        }
        self
    }

    /// Directory of the config file, if one was loaded.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path (with `~` expansion) relative to a base directory.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Catalogue path, relative paths resolved against the config file.
    pub fn csv_path(&self) -> PathBuf {
        let base = self.base_dir().unwrap_or_else(|| PathBuf::from("."));
        self.resolve_path(&self.data.csv_path, &base)
    }
}

/// Options controlling config loading.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file (overrides discovery).
    pub config_path: Option<PathBuf>,
}

/// Load configuration.
///
/// An explicit config file must load; a discovered one that fails to parse
/// is ignored with a warning.
pub async fn load_config(options: LoadOptions) -> Result<Config, ConfigError> {
    match options.config_path {
        Some(ref path) => Config::load_from_path(path).await,
        None => Ok(Config::load().await),
    }
}
