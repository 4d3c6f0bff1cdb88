//! ASCII tables for the plain-text summaries
//!
//! This module provides the row types written next to the chart images:
//! - [`StatisticsRow`] for descriptive statistics of every category
//! - [`RankingRow`] for artist rankings
//! - [`CorrelationRow`] for the strongest correlations
//!
//! Formatting uses the [`tabled`] crate.

use super::data_structures::{Category, Track};
use super::stats::{describe, ArtistScore};
use crate::analysis::correlation::StrongCorrelations;
use tabled::{Table, Tabled};

/// Descriptive statistics of a single category
#[derive(Debug, Clone, Tabled)]
pub struct StatisticsRow {
    #[tabled(rename = "Category")]
    pub category: &'static str,
    #[tabled(rename = "Count")]
    pub count: usize,
    #[tabled(rename = "Mean")]
    pub mean: String,
    #[tabled(rename = "Median")]
    pub median: String,
    #[tabled(rename = "Std Dev")]
    pub std_dev: String,
    #[tabled(rename = "Min")]
    pub min: String,
    #[tabled(rename = "Max")]
    pub max: String,
}

/// A single ranked artist
#[derive(Debug, Clone, Tabled)]
pub struct RankingRow {
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[tabled(rename = "Artists")]
    pub artists: String,
    #[tabled(rename = "Score")]
    pub score: String,
}

/// A single strongly correlated pair
#[derive(Debug, Clone, Tabled)]
pub struct CorrelationRow {
    #[tabled(rename = "First")]
    pub first: &'static str,
    #[tabled(rename = "Second")]
    pub second: &'static str,
    #[tabled(rename = "Coefficient")]
    pub coefficient: String,
}

/// One row per category with mean, median, standard deviation and extremes
pub fn statistics_rows(tracks: &[Track]) -> Vec<StatisticsRow> {
    Category::ALL
        .iter()
        .filter_map(|&category| {
            let summary = describe(&category.values(tracks))?;
            Some(StatisticsRow {
                category: category.name(),
                count: summary.count,
                mean: format!("{:.3}", summary.mean),
                median: format!("{:.3}", summary.median),
                std_dev: format!("{:.3}", summary.std_dev),
                min: format!("{:.3}", summary.min),
                max: format!("{:.3}", summary.max),
            })
        })
        .collect()
}

/// Numbered rows for an artist ranking
pub fn ranking_rows<T: std::fmt::Display>(ranking: &[ArtistScore<T>]) -> Vec<RankingRow> {
    ranking
        .iter()
        .enumerate()
        .map(|(index, entry)| RankingRow {
            rank: index + 1,
            artists: entry.artists.clone(),
            score: entry.score.to_string(),
        })
        .collect()
}

/// Negative findings first, then positive ones
pub fn correlation_rows(findings: &StrongCorrelations) -> Vec<CorrelationRow> {
    findings
        .negative
        .iter()
        .chain(&findings.positive)
        .map(|finding| CorrelationRow {
            first: finding.first,
            second: finding.second,
            coefficient: format!("{:.3}", finding.coefficient),
        })
        .collect()
}

/// Formats rows as an ASCII table using the [`tabled`] crate
///
/// # Arguments
/// * `rows` - The rows to format
/// * `title` - Optional title for the table
///
/// # Returns
/// A formatted ASCII table as a [`String`]
pub fn format_table<R: Tabled>(rows: &[R], title: Option<&str>) -> String {
    let table = if rows.is_empty() {
        "No data available".to_string()
    } else {
        Table::new(rows).to_string()
    };

    if let Some(title) = title {
        format!("{}\n{}\n{}", title, "=".repeat(title.len()), table)
    } else {
        table
    }
}
