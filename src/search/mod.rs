//! Elasticsearch integration: index storage and retrieval.

mod client;
mod config;
mod retriever;
mod store;

pub use client::{bulk_body, index_mapping, ClusterInfo, RawHit, SearchClient};
pub use config::{SearchConfig, DEFAULT_INDEX};
pub use retriever::{build_request, ContentRetriever, SearchMode};
pub use store::{segment_document, EmbeddingStore};

use thiserror::Error;

use crate::llm::LlmError;

/// Errors that can occur talking to Elasticsearch.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid Elasticsearch configuration: {0}")]
    InvalidConfig(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Elasticsearch returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Bulk indexing failed: {0}")]
    Bulk(String),

    #[error("Vector has {actual} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Got {embeddings} embeddings for {segments} segments")]
    LengthMismatch { embeddings: usize, segments: usize },

    #[error("Failed to embed query: {0}")]
    Embedding(#[from] LlmError),
}
