//! Text segments and the hits returned when searching them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::movie::MOVIE_NAME_KEY;

/// Free-form metadata attached to a segment.
pub type Metadata = Map<String, Value>;

/// A unit of text stored in the index together with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSegment {
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl TextSegment {
    pub fn new(text: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }

    /// Look up a string metadata value.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}

/// A segment returned by a search, with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// Document id in the index.
    pub id: String,
    pub score: f64,
    pub segment: TextSegment,
}

impl SearchHit {
    /// Movie title of the hit, if the segment carries one.
    pub fn movie_name(&self) -> Option<&str> {
        self.segment.metadata_str(MOVIE_NAME_KEY)
    }
}
