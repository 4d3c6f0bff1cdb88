//! Decade tokens such as `80s` and the year ranges they select

use crate::common::data_structures::Track;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

/// Accepted decade tokens with their first year, in chronological order
pub const DECADE_TOKENS: [(&str, i32); 10] = [
    ("20s", 1920),
    ("30s", 1930),
    ("40s", 1940),
    ("50s", 1950),
    ("60s", 1960),
    ("70s", 1970),
    ("80s", 1980),
    ("90s", 1990),
    ("00s", 2000),
    ("10s", 2010),
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecadeError {
    #[error("Input arguments are incorrect.")]
    Unknown(String),

    #[error("Decades must be different to be compared to.")]
    Identical,
}

/// A ten-year period selected by a decade token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decade {
    token: &'static str,
    start: i32,
}

impl Decade {
    pub fn token(&self) -> &'static str {
        self.token
    }

    pub fn start_year(&self) -> i32 {
        self.start
    }

    pub fn end_year(&self) -> i32 {
        self.start + 9
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.start_year()..=self.end_year()
    }

    pub fn contains(&self, year: i32) -> bool {
        self.years().contains(&year)
    }

    /// Tracks released within this decade
    pub fn tracks_in(&self, tracks: &[Track]) -> Vec<Track> {
        tracks
            .iter()
            .filter(|track| self.contains(track.year))
            .cloned()
            .collect()
    }

    /// Human readable range, e.g. `1920 - 1929`
    pub fn label(&self) -> String {
        format!("{} - {}", self.start_year(), self.end_year())
    }
}

impl FromStr for Decade {
    type Err = DecadeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DECADE_TOKENS
            .iter()
            .find(|(token, _)| *token == s)
            .map(|&(token, start)| Decade { token, start })
            .ok_or_else(|| DecadeError::Unknown(s.to_string()))
    }
}

impl fmt::Display for Decade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token)
    }
}

/// Parses the two decades to compare, rejecting unknown or identical tokens
pub fn parse_decade_pair(first: &str, second: &str) -> Result<(Decade, Decade), DecadeError> {
    let first: Decade = first.parse()?;
    let second: Decade = second.parse()?;
    if first == second {
        return Err(DecadeError::Identical);
    }
    Ok((first, second))
}

/// Hint listing every accepted token
pub fn decade_hint() -> String {
    let tokens: Vec<&str> = DECADE_TOKENS.iter().map(|(token, _)| *token).collect();
    format!("HINT: Try two different of those: {}", tokens.join(" "))
}
