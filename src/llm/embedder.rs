//! Embedding abstraction shared by the store and the retriever.

use async_trait::async_trait;

use super::client::LlmError;

/// A dense embedding vector.
pub type Embedding = Vec<f32>;

/// Turns text into vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Embedding, LlmError>;

    /// Embed several texts, returning one vector per input in order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, LlmError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }
}
