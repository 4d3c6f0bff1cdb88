//! Comparison of two decades
//!
//! This module renders side-by-side charts for two decades and writes the
//! report comparing them.

use super::decade::{decade_hint, parse_decade_pair, Decade};
use super::{
    announce_image, chart_path, chart_progress, load_dataset, report_charts, write_summary,
    AnalysisError, Result, RunOutcome, REPORT_TITLE,
};
use crate::common::data_structures::{Category, Track};
use crate::common::plots::{
    create_bar_chart, create_histogram_comparison, create_pie_comparison, BarPanel,
    HistogramPanel, PiePanel,
};
use crate::common::stats::{
    explicit_percentage, histogram, top_artists_by_count, top_artists_by_popularity,
    HISTOGRAM_BINS,
};
use crate::common::tables::{format_table, ranking_rows, statistics_rows};
use crate::output::{check_report_path, prepare_image_dir, prepare_results_dir, Proceed};
use crate::prompt::Confirm;
use crate::report::{write_report, ReportPage};
use crate::settings::{ReportInfo, Settings};
use std::path::Path;
use tracing::debug;

/// Number of artists shown in each ranking
const TOP_ARTISTS: usize = 10;

/// The tracks of one decade
#[derive(Debug)]
pub struct DecadeSelection {
    pub decade: Decade,
    pub tracks: Vec<Track>,
}

impl DecadeSelection {
    /// Selects the tracks of `decade`, failing when it has none
    pub fn new(decade: Decade, tracks: &[Track]) -> Result<Self> {
        let tracks = decade.tracks_in(tracks);
        if tracks.is_empty() {
            return Err(AnalysisError::EmptySelection(period(&decade)));
        }
        debug!(decade = %decade, tracks = tracks.len(), "selected decade");
        Ok(Self { decade, tracks })
    }

    /// `<start> and <end>`, as used in chart titles
    fn period(&self) -> String {
        period(&self.decade)
    }
}

fn period(decade: &Decade) -> String {
    format!("{} and {}", decade.start_year(), decade.end_year())
}

/// Image directory name of a comparison, e.g. `80s-90s`
pub fn comparison_dirname(first: &Decade, second: &Decade) -> String {
    format!("{}-{}", first.token(), second.token())
}

/// Years string shown in the report header
pub fn comparison_years(first: &Decade, second: &Decade) -> String {
    format!("{} in comparison to {}", first.label(), second.label())
}

/// Compares the decades named by `first` and `second` and writes the report
///
/// # Arguments
/// * `first`, `second` - Decade tokens such as `80s`
/// * `settings` - Input and output locations
/// * `info` - Author block shown in the report header
/// * `confirm` - Asked before anything is overwritten
///
/// # Returns
/// * `Ok(RunOutcome::Completed)` - With the path of the written report
/// * `Ok(RunOutcome::Aborted)` - If the tokens were invalid or the user declined
/// * `Err(AnalysisError)` - If loading, plotting or writing failed
pub fn compare_decades(
    first: &str,
    second: &str,
    settings: &Settings,
    info: &ReportInfo,
    confirm: &mut dyn Confirm,
) -> Result<RunOutcome> {
    let (first, second) = match parse_decade_pair(first, second) {
        Ok(pair) => pair,
        Err(e) => {
            println!("{e}");
            println!("{}", decade_hint());
            return Ok(RunOutcome::Aborted);
        }
    };

    let report_path = settings.report_path();
    if check_report_path(&report_path, confirm)? == Proceed::Declined {
        return Ok(RunOutcome::Aborted);
    }

    let tracks = load_dataset(settings)?;
    let earlier = DecadeSelection::new(first, &tracks)?;
    let later = DecadeSelection::new(second, &tracks)?;

    let dirname = comparison_dirname(&first, &second);
    let image_dir = settings.image_dir(&dirname);
    if prepare_image_dir(&image_dir, confirm)? == Proceed::Declined {
        return Ok(RunOutcome::Aborted);
    }

    println!("Creating graphs, please wait...");
    generate_comparison_plots(&earlier, &later, &image_dir)?;
    write_summary(&image_dir, &generate_comparison_summary(&earlier, &later))?;

    println!("Creating report page, please wait...");
    prepare_results_dir(&settings.results_dir)?;
    let page = ReportPage {
        title: REPORT_TITLE.to_string(),
        years: comparison_years(&first, &second),
        charts: report_charts(settings, &dirname, &[]),
        correlation_notes: None,
        info: info.clone(),
    };
    let saved = write_report(&page, &report_path)?;
    Ok(RunOutcome::Completed(saved))
}

/// Renders every comparison chart into `image_dir`
///
/// One histogram figure per category, then `explicit.png`, `top10.png` and
/// `top10popular.png`.
pub fn generate_comparison_plots(
    earlier: &DecadeSelection,
    later: &DecadeSelection,
    image_dir: &Path,
) -> Result<()> {
    let selections = [earlier, later];
    let pb = chart_progress((Category::ALL.len() + 3) as u64);

    for category in Category::ALL {
        let panels: Vec<HistogramPanel> = selections
            .iter()
            .map(|selection| HistogramPanel {
                title: format!(
                    "Music's {} histogram between {}",
                    category.name(),
                    selection.period()
                ),
                bins: histogram(&category.values(&selection.tracks), HISTOGRAM_BINS),
            })
            .collect();

        let path = chart_path(image_dir, category.name());
        create_histogram_comparison(&panels, category.name(), &path)?;
        announce_image(&pb, &path);
    }

    let pies: Vec<PiePanel> = selections
        .iter()
        .map(|selection| PiePanel {
            title: format!(
                "Percentage of explicit songs in between {}",
                selection.period()
            ),
            percentage: explicit_percentage(&selection.tracks).unwrap_or(0.0),
        })
        .collect();
    let path = chart_path(image_dir, "explicit");
    create_pie_comparison(&pies, &path)?;
    announce_image(&pb, &path);

    let by_count: Vec<BarPanel> = selections
        .iter()
        .map(|selection| BarPanel {
            title: format!("Top 10 artists between {}", selection.period()),
            bars: top_artists_by_count(&selection.tracks, TOP_ARTISTS)
                .into_iter()
                .map(|entry| (entry.artists, entry.score as f64))
                .collect(),
        })
        .collect();
    let path = chart_path(image_dir, "top10");
    create_bar_chart(&by_count, "Number of songs", &path)?;
    announce_image(&pb, &path);

    let by_popularity: Vec<BarPanel> = selections
        .iter()
        .map(|selection| BarPanel {
            title: format!("Top 10 most popular artists between {}", selection.period()),
            bars: top_artists_by_popularity(&selection.tracks, TOP_ARTISTS)
                .into_iter()
                .map(|entry| (entry.artists, entry.score))
                .collect(),
        })
        .collect();
    let path = chart_path(image_dir, "top10popular");
    create_bar_chart(&by_popularity, "Summed popularity", &path)?;
    announce_image(&pb, &path);

    pb.finish_and_clear();
    Ok(())
}

/// Statistics and rankings of both decades as text tables
pub fn generate_comparison_summary(
    earlier: &DecadeSelection,
    later: &DecadeSelection,
) -> Vec<String> {
    let mut sections = Vec::new();
    for selection in [earlier, later] {
        let period = selection.period();
        let explicit = explicit_percentage(&selection.tracks).unwrap_or(0.0);

        sections.push(format!(
            "{}\n{}\nSongs: {}\nExplicit songs: {:.2}%",
            selection.decade.label(),
            "=".repeat(selection.decade.label().len()),
            selection.tracks.len(),
            explicit
        ));
        sections.push(format_table(
            &statistics_rows(&selection.tracks),
            Some(&format!("Statistics between {period}")),
        ));
        sections.push(format_table(
            &ranking_rows(&top_artists_by_count(&selection.tracks, TOP_ARTISTS)),
            Some(&format!("Top 10 artists between {period}")),
        ));
        sections.push(format_table(
            &ranking_rows(&top_artists_by_popularity(&selection.tracks, TOP_ARTISTS)),
            Some(&format!("Top 10 most popular artists between {period}")),
        ));
    }
    sections
}
