//! Ollama integration for text embeddings.

mod client;
mod config;
mod embedder;

pub use client::{LlmClient, LlmError};
pub use config::LlmConfig;
pub use embedder::{Embedder, Embedding};
