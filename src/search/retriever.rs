//! Query-time retrieval: vector, hybrid and full-text search.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::client::{RawHit, SearchClient};
use super::SearchError;
use crate::llm::Embedder;
use crate::models::{Metadata, SearchHit, TextSegment};

/// How a query is matched against the index.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Approximate nearest neighbours on the embedding
    #[default]
    Knn,
    /// BM25 and kNN fused with reciprocal rank fusion
    Hybrid,
    /// BM25 on the segment text only
    #[serde(rename = "text")]
    #[value(name = "text")]
    FullText,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Knn => "knn",
            Self::Hybrid => "hybrid",
            Self::FullText => "text",
        }
    }

    /// Whether the query has to be embedded.
    pub fn needs_vector(&self) -> bool {
        !matches!(self, Self::FullText)
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "knn" | "vector" => Ok(Self::Knn),
            "hybrid" | "rrf" => Ok(Self::Hybrid),
            "text" | "fulltext" | "full-text" | "bm25" => Ok(Self::FullText),
            other => Err(format!("unknown search mode: {}", other)),
        }
    }
}

/// Retrieves the segments most relevant to a query.
pub struct ContentRetriever {
    client: SearchClient,
    embedder: Arc<dyn Embedder>,
    index: String,
    mode: SearchMode,
    max_results: usize,
    min_score: Option<f64>,
    num_candidates: usize,
}

impl ContentRetriever {
    pub fn new(
        client: SearchClient,
        embedder: Arc<dyn Embedder>,
        index: impl Into<String>,
        mode: SearchMode,
    ) -> Self {
        Self {
            client,
            embedder,
            index: index.into(),
            mode,
            max_results: 3,
            min_score: None,
            num_candidates: 100,
        }
    }

    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    pub fn min_score(mut self, min_score: Option<f64>) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn num_candidates(mut self, num_candidates: usize) -> Self {
        self.num_candidates = num_candidates;
        self
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// Run the query and return hits ordered by relevance.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        let vector = if self.mode.needs_vector() {
            Some(self.embedder.embed(query).await?)
        } else {
            None
        };

        let body = build_request(
            self.mode,
            query,
            vector.as_deref(),
            self.max_results,
            self.num_candidates,
        );
        debug!("Running {} search on {}", self.mode, self.index);

        let hits = self.client.search(&self.index, &body).await?;
        let mut results = hits
            .into_iter()
            .map(hit_from_raw)
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(min) = self.min_score {
            results.retain(|hit| hit.score >= min);
        }
        results.truncate(self.max_results);
        Ok(results)
    }
}

fn knn_clause(vector: &[f32], k: usize, num_candidates: usize) -> Value {
    json!({
        "field": "vector",
        "query_vector": vector,
        "k": k,
        "num_candidates": num_candidates.max(k),
    })
}

fn match_clause(query: &str) -> Value {
    json!({ "match": { "text": query } })
}

/// Build the `_search` body for a mode.
///
/// `vector` is required for [`SearchMode::Knn`] and [`SearchMode::Hybrid`];
/// without one those modes fall back to full-text matching.
pub fn build_request(
    mode: SearchMode,
    query: &str,
    vector: Option<&[f32]>,
    k: usize,
    num_candidates: usize,
) -> Value {
    match (mode, vector) {
        (SearchMode::Knn, Some(vector)) => json!({
            "size": k,
            "knn": knn_clause(vector, k, num_candidates),
        }),
        (SearchMode::Hybrid, Some(vector)) => json!({
            "size": k,
            "retriever": {
                "rrf": {
                    "retrievers": [
                        { "standard": { "query": match_clause(query) } },
                        { "knn": knn_clause(vector, k, num_candidates) }
                    ],
                    "rank_window_size": num_candidates.max(k),
                }
            }
        }),
        _ => json!({
            "size": k,
            "query": match_clause(query),
        }),
    }
}

/// Convert a raw hit into a search hit.
pub fn hit_from_raw(hit: RawHit) -> Result<SearchHit, SearchError> {
    let text = hit
        .source
        .get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| SearchError::Parse(format!("hit {} has no text", hit.id)))?
        .to_string();

    let metadata: Metadata = match hit.source.get("metadata") {
        Some(Value::Object(map)) => map.clone(),
        _ => {
            return Err(SearchError::Parse(format!(
                "hit {} has no metadata object",
                hit.id
            )))
        }
    };

    Ok(SearchHit {
        id: hit.id,
        score: hit.score.unwrap_or(0.0),
        segment: TextSegment::new(text, metadata),
    })
}
