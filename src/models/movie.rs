//! Movie catalogue records.
//!
//! A movie is read from one CSV row and becomes one text segment in the
//! search index.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::segment::Metadata;

/// Metadata key holding the movie title on every stored segment.
pub const MOVIE_NAME_KEY: &str = "movie_name";

/// One row of the movie catalogue.
///
/// Field order matches the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub movie_id: String,
    pub movie_name: String,
    /// Release year, absent when the cell is empty.
    pub year: Option<i32>,
    pub genre: String,
    pub description: String,
    pub director: String,
}

impl Movie {
    /// Text that is embedded and matched by full-text search.
    pub fn embedding_text(&self) -> String {
        self.to_string()
    }

    /// Metadata stored alongside the segment.
    pub fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert(
            MOVIE_NAME_KEY.to_string(),
            Value::String(self.movie_name.clone()),
        );
        metadata.insert(
            "movie_id".to_string(),
            Value::String(self.movie_id.clone()),
        );
        if let Some(year) = self.year {
            metadata.insert("year".to_string(), Value::from(year));
        }
        metadata.insert("genre".to_string(), Value::String(self.genre.clone()));
        metadata.insert(
            "director".to_string(),
            Value::String(self.director.clone()),
        );
        metadata
    }
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Movie[movie_id={}, movie_name={}, year=", self.movie_id, self.movie_name)?;
        match self.year {
            Some(year) => write!(f, "{}", year)?,
            None => f.write_str("null")?,
        }
        write!(
            f,
            ", genre={}, description={}, director={}]",
            self.genre, self.description, self.director
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groundhog() -> Movie {
        Movie {
            movie_id: "42".to_string(),
            movie_name: "Groundhog Day".to_string(),
            year: Some(1993),
            genre: "Comedy, Fantasy".to_string(),
            description: "A weatherman relives the same day.".to_string(),
            director: "Harold Ramis".to_string(),
        }
    }

    #[test]
    fn test_embedding_text_lists_every_field() {
        assert_eq!(
            groundhog().embedding_text(),
            "Movie[movie_id=42, movie_name=Groundhog Day, year=1993, genre=Comedy, Fantasy, \
             description=A weatherman relives the same day., director=Harold Ramis]"
        );
    }

    #[test]
    fn test_missing_year_renders_null() {
        let movie = Movie {
            year: None,
            ..groundhog()
        };
        assert!(movie.embedding_text().contains("year=null,"));
        assert!(!movie.metadata().contains_key("year"));
    }

    #[test]
    fn test_metadata_carries_movie_name() {
        let metadata = groundhog().metadata();
        assert_eq!(metadata[MOVIE_NAME_KEY], "Groundhog Day");
        assert_eq!(metadata["year"], 1993);
        assert_eq!(metadata["director"], "Harold Ramis");
    }
}
