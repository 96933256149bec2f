//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod demo;
mod helpers;
mod index;
mod models;
mod search;
mod status;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{load_config, Config, LoadOptions};
use crate::search::SearchMode;

#[derive(Parser)]
#[command(name = "moviesearch")]
#[command(about = "Vector and hybrid movie search over Elasticsearch with Ollama embeddings")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Connection overrides shared by every command.
///
/// Each flag falls back to its environment variable, so a flag or variable
/// beats the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct ConnectionArgs {
    /// Elasticsearch URL (e.g., http://localhost:9200)
    #[arg(long, global = true, env = "ELASTICSEARCH_URL")]
    pub es_url: Option<String>,

    /// Elasticsearch API key
    #[arg(long, global = true, env = "ELASTICSEARCH_API_KEY", hide_env_values = true)]
    pub es_api_key: Option<String>,

    /// Index holding the movie segments
    #[arg(long, global = true, env = "ELASTICSEARCH_INDEX")]
    pub index: Option<String>,

    /// Ollama API endpoint (e.g., http://localhost:11434)
    #[arg(long, global = true, env = "OLLAMA_URL")]
    pub ollama_url: Option<String>,

    /// Embedding model name (e.g., nomic-embed-text)
    #[arg(long, global = true, env = "OLLAMA_MODEL")]
    pub model: Option<String>,
}

impl ConnectionArgs {
    /// Apply command-line overrides on top of file and environment config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref url) = self.es_url {
            config.elasticsearch.url = url.clone();
        }
        if let Some(ref key) = self.es_api_key {
            config.elasticsearch.api_key = Some(key.clone());
        }
        if let Some(ref index) = self.index {
            config.elasticsearch.index = index.clone();
        }
        if let Some(ref endpoint) = self.ollama_url {
            config.ollama = config.ollama.clone().with_endpoint(endpoint);
        }
        if let Some(ref model) = self.model {
            config.ollama.model = model.clone();
        }
    }
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Load the CSV catalogue, embed every movie and store it in the index
    Index {
        /// CSV file (defaults to the configured catalogue)
        csv: Option<PathBuf>,
        /// Treat the first line as data rather than a header
        #[arg(long)]
        no_header: bool,
        /// Delete the index before indexing
        #[arg(long)]
        recreate: bool,
    },

    /// Search the index
    Search {
        /// Natural-language query
        query: String,
        /// Search mode (defaults to the configured mode)
        #[arg(short, long, value_enum)]
        mode: Option<SearchMode>,
        /// Number of results
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Drop hits scoring below this value
        #[arg(long)]
        min_score: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Index the catalogue, then compare vector and hybrid search for one query
    Demo {
        /// CSV file (defaults to the configured catalogue)
        csv: Option<PathBuf>,
        /// Query to run (defaults to the time-loop query)
        #[arg(short, long)]
        query: Option<String>,
        /// Number of results per mode
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Treat the first line as data rather than a header
        #[arg(long)]
        no_header: bool,
        /// Search an existing index without indexing first
        #[arg(long)]
        skip_index: bool,
    },

    /// List available Ollama models
    Models,

    /// Check Elasticsearch and Ollama connectivity
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
    };
    let mut config = load_config(options).await?;
    cli.connection.apply(&mut config);

    match cli.command {
        Commands::Index {
            csv,
            no_header,
            recreate,
        } => index::cmd_index(&config, csv, no_header, recreate).await,
        Commands::Search {
            query,
            mode,
            limit,
            min_score,
            json,
        } => {
            let options = search::SearchOptions {
                mode: mode.unwrap_or(config.retrieval.mode),
                limit: limit.unwrap_or(config.retrieval.max_results),
                min_score: min_score.or(config.retrieval.min_score),
                json,
            };
            search::cmd_search(&config, &query, options).await
        }
        Commands::Demo {
            csv,
            query,
            limit,
            no_header,
            skip_index,
        } => {
            let options = demo::DemoOptions {
                csv,
                query: query.unwrap_or_else(|| crate::config::DEFAULT_QUERY.to_string()),
                limit: limit.unwrap_or(config.retrieval.max_results),
                no_header,
                skip_index,
            };
            demo::cmd_demo(&config, options).await
        }
        Commands::Models => models::cmd_models(&config).await,
        Commands::Status { json } => status::cmd_status(&config, json).await,
    }
}
