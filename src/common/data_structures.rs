use serde::Deserialize;
use std::borrow::Borrow;

/// A single track row of the dataset
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Track {
    /// Credited artists, e.g. `Frank Sinatra, Axel Stordahl`
    pub artists: String,
    /// Release year
    pub year: i32,
    /// Whether the track is flagged as explicit
    #[serde(deserialize_with = "crate::parsing::deserialize_flag")]
    pub explicit: bool,
    pub valence: f64,
    pub acousticness: f64,
    pub danceability: f64,
    pub energy: f64,
    pub instrumentalness: f64,
    pub key: f64,
    pub liveness: f64,
    pub loudness: f64,
    pub popularity: f64,
    pub speechiness: f64,
    pub tempo: f64,
    /// Track length
    pub length: f64,
}

/// Numeric audio features charted for every report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Valence,
    Acousticness,
    Danceability,
    Energy,
    Instrumentalness,
    Key,
    Liveness,
    Loudness,
    Popularity,
    Speechiness,
    Tempo,
    Length,
}

impl Category {
    /// All categories, in report order
    pub const ALL: [Category; 12] = [
        Category::Valence,
        Category::Acousticness,
        Category::Danceability,
        Category::Energy,
        Category::Instrumentalness,
        Category::Key,
        Category::Liveness,
        Category::Loudness,
        Category::Popularity,
        Category::Speechiness,
        Category::Tempo,
        Category::Length,
    ];

    /// Lowercase name, used for chart titles and image file names
    pub fn name(self) -> &'static str {
        match self {
            Category::Valence => "valence",
            Category::Acousticness => "acousticness",
            Category::Danceability => "danceability",
            Category::Energy => "energy",
            Category::Instrumentalness => "instrumentalness",
            Category::Key => "key",
            Category::Liveness => "liveness",
            Category::Loudness => "loudness",
            Category::Popularity => "popularity",
            Category::Speechiness => "speechiness",
            Category::Tempo => "tempo",
            Category::Length => "length",
        }
    }

    /// Reads this category's value from a track
    pub fn value(self, track: &Track) -> f64 {
        match self {
            Category::Valence => track.valence,
            Category::Acousticness => track.acousticness,
            Category::Danceability => track.danceability,
            Category::Energy => track.energy,
            Category::Instrumentalness => track.instrumentalness,
            Category::Key => track.key,
            Category::Liveness => track.liveness,
            Category::Loudness => track.loudness,
            Category::Popularity => track.popularity,
            Category::Speechiness => track.speechiness,
            Category::Tempo => track.tempo,
            Category::Length => track.length,
        }
    }

    /// Collects this category's finite values over a set of tracks
    ///
    /// Missing measurements (NaN or infinite cells) are skipped.
    pub fn values<T: Borrow<Track>>(self, tracks: &[T]) -> Vec<f64> {
        tracks
            .iter()
            .map(|track| self.value(Borrow::<Track>::borrow(track)))
            .filter(|value| value.is_finite())
            .collect()
    }
}

/// A numeric column taking part in the correlation matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Year,
    Explicit,
    Feature(Category),
}

impl Measure {
    /// Every numeric column of the table: year, explicit flag, then all categories
    pub fn all() -> Vec<Measure> {
        let mut measures = vec![Measure::Year, Measure::Explicit];
        measures.extend(Category::ALL.iter().copied().map(Measure::Feature));
        measures
    }

    pub fn name(self) -> &'static str {
        match self {
            Measure::Year => "year",
            Measure::Explicit => "explicit",
            Measure::Feature(category) => category.name(),
        }
    }

    pub fn value(self, track: &Track) -> f64 {
        match self {
            Measure::Year => track.year as f64,
            Measure::Explicit => {
                if track.explicit {
                    1.0
                } else {
                    0.0
                }
            }
            Measure::Feature(category) => category.value(track),
        }
    }
}

/// Builds tracks for unit tests without spelling out every field
#[cfg(test)]
pub(crate) fn test_track(artists: &str, year: i32, explicit: bool, popularity: f64) -> Track {
    Track {
        artists: artists.to_string(),
        year,
        explicit,
        valence: 0.5,
        acousticness: 0.5,
        danceability: 0.5,
        energy: 0.5,
        instrumentalness: 0.0,
        key: 5.0,
        liveness: 0.1,
        loudness: -10.0,
        popularity,
        speechiness: 0.05,
        tempo: 120.0,
        length: 200.0,
    }
}
