//! Aggregations over the track table
//!
//! Histogram binning, descriptive statistics, explicit share, artist rankings
//! and per-year series. Everything here is a single pass over an in-memory slice.

use super::data_structures::Track;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::ops::RangeInclusive;

/// Number of bins used by every histogram in the reports
pub const HISTOGRAM_BINS: usize = 10;

/// A single histogram bin covering `[start, end)`; the final bin also includes `end`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Descriptive statistics of a single column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1); zero for a single value
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

/// An artist with its ranking score
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistScore<T> {
    pub artists: String,
    pub score: T,
}

/// Bins values into `bins` equal-width bins spanning the data range
///
/// A constant input is spread over `[v - 0.5, v + 0.5]`. Non-finite values are
/// ignored; input without any finite value yields no bins.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let values = finite(values);
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let (mut min, mut max) = min_max(&values);
    if min == max {
        min -= 0.5;
        max += 0.5;
    }

    let width = (max - min) / bins as f64;
    let mut result: Vec<HistogramBin> = (0..bins)
        .map(|index| HistogramBin {
            start: min + width * index as f64,
            end: if index + 1 == bins {
                max
            } else {
                min + width * (index + 1) as f64
            },
            count: 0,
        })
        .collect();

    for value in values {
        let index = (((value - min) / width) as usize).min(bins - 1);
        result[index].count += 1;
    }

    result
}

/// Arithmetic mean of the finite values, or `None` when there are none
pub fn mean(values: &[f64]) -> Option<f64> {
    let values = finite(values);
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Computes count, mean, median, standard deviation and extremes
///
/// Non-finite values are left out of every statistic, including `count`.
pub fn describe(values: &[f64]) -> Option<Summary> {
    let values = finite(values);
    let mean = mean(&values)?;
    let count = values.len();

    let mut sorted = values.clone();
    sorted.sort_unstable_by(f64::total_cmp);
    let median = if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    } else {
        sorted[count / 2]
    };

    let std_dev = if count > 1 {
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        variance.sqrt()
    } else {
        0.0
    };

    Some(Summary {
        count,
        mean,
        median,
        std_dev,
        min: sorted[0],
        max: sorted[count - 1],
    })
}

/// Percentage (0-100) of explicit tracks, or `None` when there are no tracks
pub fn explicit_percentage<T: Borrow<Track>>(tracks: &[T]) -> Option<f64> {
    if tracks.is_empty() {
        return None;
    }
    let explicit = tracks
        .iter()
        .filter(|track| Borrow::<Track>::borrow(*track).explicit)
        .count();
    Some(100.0 * explicit as f64 / tracks.len() as f64)
}

/// Ranks artists by their number of tracks, descending
///
/// Ties are broken by artist name, ascending.
pub fn top_artists_by_count(tracks: &[Track], limit: usize) -> Vec<ArtistScore<usize>> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for track in tracks {
        *counts.entry(track.artists.as_str()).or_default() += 1;
    }

    let mut ranking: Vec<ArtistScore<usize>> = counts
        .into_iter()
        .map(|(artists, score)| ArtistScore {
            artists: artists.to_string(),
            score,
        })
        .collect();
    ranking.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.artists.cmp(&b.artists)));
    ranking.truncate(limit);
    ranking
}

/// Ranks artists by the sum of their tracks' popularity, descending
///
/// Ties are broken by artist name, ascending. Non-finite popularity values add nothing.
pub fn top_artists_by_popularity(tracks: &[Track], limit: usize) -> Vec<ArtistScore<f64>> {
    let mut sums: HashMap<&str, f64> = HashMap::new();
    for track in tracks {
        let sum = sums.entry(track.artists.as_str()).or_default();
        if track.popularity.is_finite() {
            *sum += track.popularity;
        }
    }

    let mut ranking: Vec<ArtistScore<f64>> = sums
        .into_iter()
        .map(|(artists, score)| ArtistScore {
            artists: artists.to_string(),
            score,
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.artists.cmp(&b.artists))
    });
    ranking.truncate(limit);
    ranking
}

/// Tracks of every year in a range, grouped once by reference
#[derive(Debug)]
pub struct YearGroups<'a> {
    years: RangeInclusive<i32>,
    by_year: HashMap<i32, Vec<&'a Track>>,
}

impl<'a> YearGroups<'a> {
    pub fn new(tracks: &'a [Track], years: RangeInclusive<i32>) -> Self {
        let mut by_year: HashMap<i32, Vec<&'a Track>> = HashMap::new();
        for track in tracks.iter().filter(|track| years.contains(&track.year)) {
            by_year.entry(track.year).or_default().push(track);
        }
        Self { years, by_year }
    }

    /// Applies `aggregate` to the tracks of every year in the range
    ///
    /// Years without any track yield `None`, so they show up as gaps in charts.
    pub fn series<F>(&self, aggregate: F) -> Vec<(i32, Option<f64>)>
    where
        F: Fn(&[&'a Track]) -> Option<f64>,
    {
        self.years
            .clone()
            .map(|year| {
                let value = self
                    .by_year
                    .get(&year)
                    .and_then(|year_tracks| aggregate(year_tracks.as_slice()));
                (year, value)
            })
            .collect()
    }
}

/// Finite values of a slice, in order
fn finite(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|value| value.is_finite()).collect()
}

/// Smallest and largest value of a non-empty slice
pub(crate) fn min_max(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::data_structures::{test_track, Category};

    #[test]
    fn test_histogram_counts_sum_to_input() {
        let values: Vec<f64> = (0..=100).map(|v| v as f64).collect();
        let bins = histogram(&values, HISTOGRAM_BINS);

        assert_eq!(bins.len(), 10);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 101);
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[9].end, 100.0);
        // The maximum lands in the closed final bin
        assert_eq!(bins[9].count, 11);
        assert_eq!(bins[0].count, 10);
    }

    #[test]
    fn test_histogram_constant_values() {
        let bins = histogram(&[3.0, 3.0, 3.0], 10);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins[0].start, 2.5);
        assert_eq!(bins[9].end, 3.5);
        assert_eq!(bins[5].count, 3);
    }

    #[test]
    fn test_histogram_empty() {
        assert!(histogram(&[], 10).is_empty());
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
    }

    #[test]
    fn test_describe() {
        let summary = describe(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, 2.5);
        assert_eq!(summary.median, 2.5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 4.0);
        assert!((summary.std_dev - 1.2909944487358056).abs() < 1e-12);

        let single = describe(&[7.0]).unwrap();
        assert_eq!(single.median, 7.0);
        assert_eq!(single.std_dev, 0.0);

        assert!(describe(&[]).is_none());
    }

    #[test]
    fn test_explicit_percentage() {
        let tracks = vec![
            test_track("A", 2000, true, 1.0),
            test_track("B", 2000, false, 1.0),
            test_track("C", 2000, false, 1.0),
            test_track("D", 2000, false, 1.0),
        ];
        assert_eq!(explicit_percentage(&tracks), Some(25.0));
        assert_eq!(explicit_percentage::<Track>(&[]), None);
    }

    #[test]
    fn test_top_artists_by_count() {
        let tracks = vec![
            test_track("B", 2000, false, 1.0),
            test_track("A", 2000, false, 1.0),
            test_track("C", 2000, false, 1.0),
            test_track("C", 2001, false, 1.0),
            test_track("A", 2001, false, 1.0),
            test_track("C", 2002, false, 1.0),
        ];
        let ranking = top_artists_by_count(&tracks, 2);

        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].artists, "C");
        assert_eq!(ranking[0].score, 3);
        assert_eq!(ranking[1].artists, "A");
        assert_eq!(ranking[1].score, 2);
    }

    #[test]
    fn test_top_artists_by_count_tie_break() {
        let tracks = vec![
            test_track("Zed", 2000, false, 1.0),
            test_track("Abba", 2000, false, 1.0),
        ];
        let ranking = top_artists_by_count(&tracks, 10);
        assert_eq!(ranking[0].artists, "Abba");
        assert_eq!(ranking[1].artists, "Zed");
    }

    #[test]
    fn test_top_artists_by_popularity() {
        let tracks = vec![
            test_track("A", 2000, false, 10.0),
            test_track("A", 2000, false, 15.0),
            test_track("B", 2000, false, 30.0),
            test_track("C", 2000, false, 5.0),
        ];
        let ranking = top_artists_by_popularity(&tracks, 10);

        assert_eq!(ranking.len(), 3);
        assert_eq!(ranking[0].artists, "B");
        assert_eq!(ranking[0].score, 30.0);
        assert_eq!(ranking[1].artists, "A");
        assert_eq!(ranking[1].score, 25.0);
        assert_eq!(ranking[2].artists, "C");
    }

    #[test]
    fn test_year_groups_mark_missing_years() {
        let tracks = vec![
            test_track("A", 2000, true, 10.0),
            test_track("B", 2000, false, 20.0),
            test_track("C", 2002, false, 30.0),
            test_track("D", 1990, false, 40.0),
        ];
        let groups = YearGroups::new(&tracks, 2000..=2002);
        let series = groups.series(|year_tracks| explicit_percentage(year_tracks));

        assert_eq!(
            series,
            vec![(2000, Some(50.0)), (2001, None), (2002, Some(0.0))]
        );
    }

    #[test]
    fn test_year_groups_reused_for_several_series() {
        let tracks = vec![
            test_track("A", 2000, false, 10.0),
            test_track("B", 2000, false, 30.0),
            test_track("C", 2001, false, 50.0),
        ];
        let groups = YearGroups::new(&tracks, 2000..=2001);

        let popularity =
            groups.series(|year_tracks| mean(&Category::Popularity.values(year_tracks)));
        let counts = groups.series(|year_tracks| Some(year_tracks.len() as f64));
        assert_eq!(popularity, vec![(2000, Some(20.0)), (2001, Some(50.0))]);
        assert_eq!(counts, vec![(2000, Some(2.0)), (2001, Some(1.0))]);
    }

    #[test]
    fn test_non_finite_values_are_skipped() {
        let values = [f64::NAN, 0.5, 0.9, f64::INFINITY];

        let bins = histogram(&values, 10);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[0].start, 0.5);
        assert_eq!(bins[9].end, 0.9);

        assert!((mean(&values).unwrap() - 0.7).abs() < 1e-12);

        let summary = describe(&values).unwrap();
        assert_eq!(summary.count, 2);
        assert!((summary.median - 0.7).abs() < 1e-12);
        assert_eq!(summary.min, 0.5);
        assert_eq!(summary.max, 0.9);
        assert!(summary.std_dev.is_finite());

        assert!(histogram(&[f64::NAN], 10).is_empty());
        assert_eq!(mean(&[f64::NAN]), None);
        assert!(describe(&[f64::NAN, f64::NAN]).is_none());
    }

    #[test]
    fn test_popularity_ranking_skips_non_finite() {
        let tracks = vec![
            test_track("A", 2000, false, 10.0),
            test_track("A", 2000, false, f64::NAN),
            test_track("B", 2000, false, 5.0),
        ];
        let ranking = top_artists_by_popularity(&tracks, 10);

        assert_eq!(ranking[0].artists, "A");
        assert_eq!(ranking[0].score, 10.0);
        assert_eq!(ranking[1].score, 5.0);
    }
}
