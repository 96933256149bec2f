//! movie-search - vector and hybrid search over a movie catalogue.
//!
//! Reads movies from CSV, embeds them with a local Ollama server and stores
//! them in Elasticsearch, where they can be queried by kNN, by full text, or
//! by both fused with reciprocal rank fusion.

pub mod cli;
pub mod config;
pub mod import;
pub mod llm;
pub mod models;
pub mod search;
pub mod services;
