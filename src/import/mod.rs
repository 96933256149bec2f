//! Movie catalogue import from CSV.
//!
//! Columns are positional: `movie_id, movie_name, year, genre, description,
//! director`. Rows that cannot be mapped onto a [`Movie`] are skipped and
//! logged, never fatal.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::Movie;

/// Number of columns in a catalogue row.
pub const COLUMN_COUNT: usize = 6;

/// Errors that abort a catalogue load.
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error while reading CSV: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single row was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("expected 6 columns, found {0}")]
    ColumnCount(usize),

    #[error("year is not an integer: {0:?}")]
    InvalidYear(String),

    #[error("malformed record: {0}")]
    Malformed(String),
}

/// Movies read from a catalogue.
#[derive(Debug, Default)]
pub struct LoadedMovies {
    /// Accepted rows, in file order.
    pub movies: Vec<Movie>,
    /// Rows rejected as malformed.
    pub skipped: usize,
}

/// Reads movie records from CSV.
#[derive(Debug, Clone)]
pub struct MovieReader {
    has_header: bool,
    delimiter: u8,
}

impl Default for MovieReader {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
        }
    }
}

impl MovieReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the first line is a header row.
    ///
    /// A header read as data is rejected like any other malformed row, so
    /// `false` still works for files that carry one.
    pub fn has_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Load every movie from a file on disk.
    pub fn read_path(&self, path: &Path) -> Result<LoadedMovies, CsvError> {
        let file = File::open(path).map_err(|source| CsvError::Open {
            path: path.display().to_string(),
            source,
        })?;
        debug!("Reading movie catalogue from {}", path.display());
        self.read(file)
    }

    /// Load every movie from a reader.
    pub fn read<R: Read>(&self, reader: R) -> Result<LoadedMovies, CsvError> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(self.has_header)
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(reader);

        let mut loaded = LoadedMovies::default();
        for (index, record) in csv_reader.records().enumerate() {
            let row = match record {
                Ok(record) => parse_record(&record),
                Err(e) if e.is_io_error() => match e.into_kind() {
                    csv::ErrorKind::Io(io) => return Err(CsvError::Io(io)),
                    other => Err(RowError::Malformed(format!("{:?}", other))),
                },
                Err(e) => Err(RowError::Malformed(e.to_string())),
            };

            match row {
                Ok(movie) => loaded.movies.push(movie),
                Err(e) => {
                    warn!("Skipping row {}: {}", index + 1, e);
                    loaded.skipped += 1;
                }
            }
        }

        debug!(
            "Loaded {} movies ({} rows skipped)",
            loaded.movies.len(),
            loaded.skipped
        );
        Ok(loaded)
    }
}

/// Map one CSV record onto a movie.
pub fn parse_record(record: &StringRecord) -> Result<Movie, RowError> {
    if record.len() != COLUMN_COUNT {
        return Err(RowError::ColumnCount(record.len()));
    }

    let year = match record[2].trim() {
        "" => None,
        raw => Some(
            raw.parse::<i32>()
                .map_err(|_| RowError::InvalidYear(raw.to_string()))?,
        ),
    };

    Ok(Movie {
        movie_id: record[0].to_string(),
        movie_name: record[1].to_string(),
        year,
        genre: record[3].to_string(),
        description: record[4].to_string(),
        director: record[5].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOGUE: &str = "\
movie_id,movie_name,year,genre,description,director
1,Groundhog Day,1993,Comedy,\"A weatherman relives the same day, again and again.\",Harold Ramis
2,Edge of Tomorrow,2014,Action,A soldier dies and wakes up on the same day.,Doug Liman
3,Primer,,Drama,Engineers build a time machine.,Shane Carruth
";

    #[test]
    fn test_reads_rows_in_order() {
        let loaded = MovieReader::new().read(CATALOGUE.as_bytes()).unwrap();
        assert_eq!(loaded.skipped, 0);
        let names: Vec<_> = loaded.movies.iter().map(|m| m.movie_name.as_str()).collect();
        assert_eq!(names, vec!["Groundhog Day", "Edge of Tomorrow", "Primer"]);
        assert_eq!(
            loaded.movies[0].description,
            "A weatherman relives the same day, again and again."
        );
    }

    #[test]
    fn test_empty_year_is_none() {
        let loaded = MovieReader::new().read(CATALOGUE.as_bytes()).unwrap();
        assert_eq!(loaded.movies[2].year, None);
        assert_eq!(loaded.movies[1].year, Some(2014));
    }

    #[test]
    fn test_header_read_as_data_is_skipped() {
        let loaded = MovieReader::new()
            .has_header(false)
            .read(CATALOGUE.as_bytes())
            .unwrap();
        assert_eq!(loaded.movies.len(), 3);
        assert_eq!(loaded.skipped, 1);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let data = "\
movie_id,movie_name,year,genre,description,director
1,Looper,2012,Action,Hitmen kill targets sent from the future.,Rian Johnson
2,Broken,not-a-year,Drama,Bad year.,Nobody
3,Too,Few,Columns
4,Source Code,2011,Thriller,A soldier relives a train bombing.,Duncan Jones
";
        let loaded = MovieReader::new().read(data.as_bytes()).unwrap();
        assert_eq!(loaded.skipped, 2);
        let ids: Vec<_> = loaded.movies.iter().map(|m| m.movie_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[test]
    fn test_undecodable_row_is_skipped() {
        let mut data = b"movie_id,movie_name,year,genre,description,director\n".to_vec();
        data.extend_from_slice(b"1,Looper,2012,Action,Hitmen from the future.,Rian Johnson\n");
        data.extend_from_slice(b"2,B\xff\xfe,2001,Drama,Bad bytes.,Nobody\n");
        data.extend_from_slice(b"3,Primer,2004,Drama,Engineers build a time machine.,Shane Carruth\n");

        let loaded = MovieReader::new().read(data.as_slice()).unwrap();
        assert_eq!(loaded.skipped, 1);
        let ids: Vec<_> = loaded.movies.iter().map(|m| m.movie_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_parse_record_rejects_bad_year() {
        let record = StringRecord::from(vec!["1", "X", "19x3", "g", "d", "r"]);
        assert_eq!(
            parse_record(&record),
            Err(RowError::InvalidYear("19x3".to_string()))
        );
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = MovieReader::new()
            .read_path(Path::new("/nonexistent/movies.csv"))
            .unwrap_err();
        assert!(matches!(err, CsvError::Open { .. }));
    }
}
