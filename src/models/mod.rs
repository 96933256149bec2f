//! Data models for movie search.

mod movie;
mod segment;

pub use movie::{Movie, MOVIE_NAME_KEY};
pub use segment::{Metadata, SearchHit, TextSegment};
