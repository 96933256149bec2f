//! Movie indexing service.
//!
//! Embeds movies through the configured [`Embedder`] and stores them in the
//! search index. Separated from UI concerns - emits events for progress
//! tracking.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::llm::{Embedder, Embedding, LlmError};
use crate::models::{Movie, TextSegment};
use crate::search::{EmbeddingStore, SearchError};

/// Events emitted while indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexEvent {
    /// Indexing started
    Started { total_movies: usize },
    /// A batch of movies was embedded
    BatchEmbedded { count: usize },
    /// All segments were written to the index
    Stored { count: usize },
    /// The index was refreshed and is searchable
    Refreshed,
}

/// Result of an indexing run.
#[derive(Debug, Clone)]
pub struct IndexReport {
    /// Number of movies written to the index.
    pub indexed: usize,
    /// Document ids, in the order of the input movies.
    pub ids: Vec<String>,
}

/// Errors that abort an indexing run.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Embedding failed: {0}")]
    Embedding(#[from] LlmError),

    #[error("Storing segments failed: {0}")]
    Store(#[from] SearchError),
}

/// Service that turns movies into searchable segments.
pub struct IndexService {
    embedder: Arc<dyn Embedder>,
    store: EmbeddingStore,
    batch_size: usize,
    concurrency: usize,
}

impl IndexService {
    /// Create a new indexing service.
    pub fn new(embedder: Arc<dyn Embedder>, store: EmbeddingStore) -> Self {
        Self {
            embedder,
            store,
            batch_size: 32,
            concurrency: 1,
        }
    }

    /// Texts sent per embedding call.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Embedding calls kept in flight at once.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Drop everything previously indexed.
    pub async fn reset(&self) -> Result<(), IndexError> {
        Ok(self.store.clear().await?)
    }

    /// Embed, store and refresh.
    pub async fn index_movies(
        &self,
        movies: &[Movie],
        event_tx: mpsc::Sender<IndexEvent>,
    ) -> Result<IndexReport, IndexError> {
        let _ = event_tx
            .send(IndexEvent::Started {
                total_movies: movies.len(),
            })
            .await;

        if movies.is_empty() {
            info!("No movies to index");
            return Ok(IndexReport {
                indexed: 0,
                ids: Vec::new(),
            });
        }

        let segments: Vec<TextSegment> = movies
            .iter()
            .map(|movie| TextSegment::new(movie.embedding_text(), movie.metadata()))
            .collect();
        let texts: Vec<String> = segments.iter().map(|s| s.text.clone()).collect();

        let embeddings = self.embed_all(&texts, &event_tx).await?;

        let ids = self.store.add_all(&embeddings, &segments).await?;
        let _ = event_tx
            .send(IndexEvent::Stored { count: ids.len() })
            .await;

        self.store.refresh().await?;
        let _ = event_tx.send(IndexEvent::Refreshed).await;

        info!("Indexed {} movies into {}", ids.len(), self.store.index());
        Ok(IndexReport {
            indexed: ids.len(),
            ids,
        })
    }

    /// Embed texts in batches, keeping input order.
    async fn embed_all(
        &self,
        texts: &[String],
        event_tx: &mpsc::Sender<IndexEvent>,
    ) -> Result<Vec<Embedding>, LlmError> {
        let mut batches = stream::iter(texts.chunks(self.batch_size))
            .map(|chunk| self.embedder.embed_batch(chunk))
            .buffered(self.concurrency);

        let mut embeddings = Vec::with_capacity(texts.len());
        while let Some(batch) = batches.next().await {
            let batch = batch?;
            debug!("Embedded batch of {}", batch.len());
            let _ = event_tx
                .send(IndexEvent::BatchEmbedded { count: batch.len() })
                .await;
            embeddings.extend(batch);
        }
        Ok(embeddings)
    }
}
