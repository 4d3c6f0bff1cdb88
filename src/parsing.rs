//! Dataset loading
//!
//! This module handles loading the semicolon-delimited track CSV into [`Track`] rows.

use crate::common::data_structures::Track;
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur during dataset loading
#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("Failed to read input file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
}

type Result<T> = core::result::Result<T, ParsingError>;

/// Tracks loaded from the dataset, with bookkeeping about dropped rows
#[derive(Debug)]
pub struct LoadedTracks {
    pub tracks: Vec<Track>,
    /// Exact duplicate rows that were dropped
    pub duplicates: usize,
    /// Rows that could not be parsed and were skipped
    pub skipped: usize,
}

/// Load the track dataset from a CSV file
///
/// # Arguments
/// * `file_path` - Path to the `;`-delimited CSV file
///
/// # Returns
/// * `Ok(LoadedTracks)` - Deduplicated tracks with cleaned artist strings
/// * `Err(ParsingError)` - If the file could not be opened or is not valid CSV
pub fn load_tracks(file_path: &Path) -> Result<LoadedTracks> {
    let file = File::open(file_path)?;
    load_tracks_from_reader(file)
}

/// Load the track dataset from any reader
///
/// Exact duplicate rows are dropped before parsing, keeping the first occurrence.
/// Columns are matched by header name, so extra columns are ignored.
pub fn load_tracks_from_reader<R: Read>(reader: R) -> Result<LoadedTracks> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut tracks = Vec::new();
    let mut duplicates = 0;
    let mut skipped = 0;

    for record in csv_reader.records() {
        let record = record?;
        let key: Vec<String> = record.iter().map(str::to_owned).collect();
        if !seen.insert(key) {
            duplicates += 1;
            continue;
        }

        match record.deserialize::<Track>(Some(&headers)) {
            Ok(mut track) => {
                track.artists = clean_artists(&track.artists);
                tracks.push(track);
            }
            Err(e) => {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                warn!(line, error = %e, "skipping malformed track row");
                skipped += 1;
            }
        }
    }

    debug!(
        tracks = tracks.len(),
        duplicates, skipped, "loaded track dataset"
    );

    Ok(LoadedTracks {
        tracks,
        duplicates,
        skipped,
    })
}

/// Turns a stored artist list such as `['A', 'B']` into `A, B`
///
/// Drops the first and last characters and removes every single quote.
pub fn clean_artists(raw: &str) -> String {
    let mut chars = raw.chars();
    chars.next();
    chars.next_back();
    chars.as_str().replace('\'', "")
}

/// Accepts `0`/`1`, `true`/`false` and `0.0`/`1.0` for boolean-like columns
pub(crate) fn deserialize_flag<'de, D>(deserializer: D) -> core::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Ok(false);
    }
    trimmed
        .parse::<f64>()
        .map(|value| value == 1.0)
        .map_err(|_| serde::de::Error::custom(format!("invalid flag value `{raw}`")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    const HEADER: &str = "artists;year;explicit;valence;acousticness;danceability;energy;instrumentalness;key;liveness;loudness;popularity;speechiness;tempo;length;name";

    fn csv_with_rows(rows: &[&str]) -> String {
        let mut content = String::from(HEADER);
        for row in rows {
            content.push('\n');
            content.push_str(row);
        }
        content
    }

    #[rstest]
    #[case("['Frank Sinatra', 'Axel Stordahl']", "Frank Sinatra, Axel Stordahl")]
    #[case("['Queen']", "Queen")]
    #[case("[]", "")]
    #[case("x", "")]
    fn test_clean_artists(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(clean_artists(raw), expected);
    }

    #[test]
    fn test_load_tracks_parses_rows() {
        let content = csv_with_rows(&[
            "['Queen'];1975;0;0.3;0.2;0.4;0.8;0.0;5;0.3;-7.5;70;0.05;140.5;355;Bohemian Rhapsody",
        ]);
        let loaded = load_tracks_from_reader(content.as_bytes()).unwrap();

        assert_eq!(loaded.tracks.len(), 1);
        let track = &loaded.tracks[0];
        assert_eq!(track.artists, "Queen");
        assert_eq!(track.year, 1975);
        assert!(!track.explicit);
        assert_eq!(track.loudness, -7.5);
        assert_eq!(track.length, 355.0);
    }

    #[test]
    fn test_load_tracks_drops_exact_duplicates() {
        let row = "['Queen'];1975;0;0.3;0.2;0.4;0.8;0.0;5;0.3;-7.5;70;0.05;140.5;355;Song";
        let other = "['Queen'];1975;0;0.3;0.2;0.4;0.8;0.0;5;0.3;-7.5;70;0.05;140.5;355;Other";
        let content = csv_with_rows(&[row, row, other]);
        let loaded = load_tracks_from_reader(content.as_bytes()).unwrap();

        assert_eq!(loaded.tracks.len(), 2);
        assert_eq!(loaded.duplicates, 1);
    }

    #[test]
    fn test_load_tracks_skips_malformed_rows() {
        let content = csv_with_rows(&[
            "['Queen'];1975;1;0.3;0.2;0.4;0.8;0.0;5;0.3;-7.5;70;0.05;140.5;355;Good",
            "['Queen'];unknown;0;0.3;0.2;0.4;0.8;0.0;5;0.3;-7.5;70;0.05;140.5;355;Bad",
        ]);
        let loaded = load_tracks_from_reader(content.as_bytes()).unwrap();

        assert_eq!(loaded.tracks.len(), 1);
        assert_eq!(loaded.skipped, 1);
        assert!(loaded.tracks[0].explicit);
    }

    #[rstest]
    #[case("1", true)]
    #[case("0", false)]
    #[case("1.0", true)]
    #[case("True", true)]
    #[case("false", false)]
    fn test_explicit_flag_variants(#[case] flag: &str, #[case] expected: bool) {
        let row = format!("['A'];2000;{flag};0.3;0.2;0.4;0.8;0.0;5;0.3;-7.5;70;0.05;140.5;355;S");
        let content = csv_with_rows(&[&row]);
        let loaded = load_tracks_from_reader(content.as_bytes()).unwrap();
        assert_eq!(loaded.tracks[0].explicit, expected);
    }

    #[test]
    fn test_load_tracks_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let content = csv_with_rows(&[
            "['A'];2000;0;0.3;0.2;0.4;0.8;0.0;5;0.3;-7.5;70;0.05;140.5;355;S",
        ]);
        file.write_all(content.as_bytes()).unwrap();

        let loaded = load_tracks(file.path()).unwrap();
        assert_eq!(loaded.tracks.len(), 1);
    }

    #[test]
    fn test_load_tracks_missing_file() {
        let result = load_tracks(Path::new("definitely/not/here.csv"));
        assert!(matches!(result, Err(ParsingError::FileRead(_))));
    }
}
