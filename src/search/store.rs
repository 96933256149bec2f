//! Vector store backed by an Elasticsearch index.

use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use super::client::SearchClient;
use super::SearchError;
use crate::llm::Embedding;
use crate::models::TextSegment;

/// Stores text segments with their embeddings.
#[derive(Debug, Clone)]
pub struct EmbeddingStore {
    client: SearchClient,
    index: String,
    bulk_size: usize,
}

impl EmbeddingStore {
    pub fn new(client: SearchClient, index: impl Into<String>, bulk_size: usize) -> Self {
        Self {
            client,
            index: index.into(),
            bulk_size: bulk_size.max(1),
        }
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn client(&self) -> &SearchClient {
        &self.client
    }

    /// Store segments with their embeddings, returning the new document ids.
    ///
    /// The index is created on first use with the dimension of the first
    /// vector; every vector must have that dimension.
    pub async fn add_all(
        &self,
        embeddings: &[Embedding],
        segments: &[TextSegment],
    ) -> Result<Vec<String>, SearchError> {
        if embeddings.len() != segments.len() {
            return Err(SearchError::LengthMismatch {
                embeddings: embeddings.len(),
                segments: segments.len(),
            });
        }
        let Some(first) = embeddings.first() else {
            return Ok(Vec::new());
        };

        let dims = first.len();
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dims) {
            return Err(SearchError::DimensionMismatch {
                expected: dims,
                actual: bad.len(),
            });
        }

        self.ensure_index(dims).await?;

        let docs: Vec<(String, Value)> = embeddings
            .iter()
            .zip(segments)
            .map(|(embedding, segment)| {
                (
                    Uuid::new_v4().to_string(),
                    segment_document(segment, embedding),
                )
            })
            .collect();

        for (n, chunk) in docs.chunks(self.bulk_size).enumerate() {
            debug!("Bulk chunk {} ({} documents)", n + 1, chunk.len());
            self.client.bulk(&self.index, chunk).await?;
        }

        info!("Stored {} segments in {}", docs.len(), self.index);
        Ok(docs.into_iter().map(|(id, _)| id).collect())
    }

    /// Make stored segments visible to search.
    pub async fn refresh(&self) -> Result<(), SearchError> {
        self.client.refresh(&self.index).await
    }

    /// Drop the index and everything in it.
    pub async fn clear(&self) -> Result<(), SearchError> {
        self.client.delete_index(&self.index).await
    }

    async fn ensure_index(&self, dims: usize) -> Result<(), SearchError> {
        if !self.client.index_exists(&self.index).await? {
            self.client.create_index(&self.index, dims).await?;
        }
        Ok(())
    }
}

/// Source document stored for one segment.
pub fn segment_document(segment: &TextSegment, embedding: &[f32]) -> Value {
    json!({
        "text": segment.text,
        "vector": embedding,
        "metadata": segment.metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metadata;
    use crate::search::SearchConfig;

    fn store() -> EmbeddingStore {
        let client = SearchClient::new(&SearchConfig::default()).unwrap();
        EmbeddingStore::new(client, "movies", 0)
    }

    #[test]
    fn test_segment_document_shape() {
        let mut metadata = Metadata::new();
        metadata.insert("movie_name".to_string(), json!("Looper"));
        let segment = TextSegment::new("Movie[...]", metadata);
        let doc = segment_document(&segment, &[0.5, -0.25]);
        assert_eq!(
            doc,
            json!({
                "text": "Movie[...]",
                "vector": [0.5, -0.25],
                "metadata": {"movie_name": "Looper"}
            })
        );
    }

    #[test]
    fn test_bulk_size_never_zero() {
        assert_eq!(store().bulk_size, 1);
    }

    #[tokio::test]
    async fn test_length_mismatch_is_rejected() {
        let segments = vec![TextSegment::new("a", Metadata::new())];
        let err = store().add_all(&[], &segments).await.unwrap_err();
        assert!(matches!(
            err,
            SearchError::LengthMismatch {
                embeddings: 0,
                segments: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_input_is_noop() {
        assert!(store().add_all(&[], &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mixed_dimensions_are_rejected() {
        let segments = vec![
            TextSegment::new("a", Metadata::new()),
            TextSegment::new("b", Metadata::new()),
        ];
        let embeddings = vec![vec![0.1, 0.2], vec![0.3]];
        let err = store().add_all(&embeddings, &segments).await.unwrap_err();
        assert!(matches!(
            err,
            SearchError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }
}
