//! Analysis procedures
//!
//! This module contains the two procedures a run can perform:
//! - Comparing two decades ([`compare`])
//! - Analysing every year of the dataset ([`history`])
//!
//! Both share the helpers below for loading, progress output and summaries.

pub mod compare;
pub mod correlation;
pub mod decade;
pub mod history;

use crate::common::{Category, PlotError, Track};
use crate::parsing::{load_tracks, ParsingError};
use crate::report::{Chart, ReportError};
use crate::settings::{Settings, SettingsError};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Title shown at the top of every report page
pub const REPORT_TITLE: &str = "Music report";

/// Errors that can occur during an analysis run
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Parsing error: {0}")]
    Parsing(#[from] ParsingError),

    #[error("Plot error: {0}")]
    Plot(#[from] PlotError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("No songs in the dataset were released between {0}")]
    EmptySelection(String),
}

pub type Result<T> = core::result::Result<T, AnalysisError>;

/// How a run ended when no error occurred
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The report was written to this path
    Completed(PathBuf),
    /// Invalid arguments or a declined prompt stopped the run
    Aborted,
}

/// File names of the charts every report shows after the category charts
const SUMMARY_CHARTS: [&str; 3] = ["explicit", "top10", "top10popular"];

/// Loads the dataset named by the settings
pub(crate) fn load_dataset(settings: &Settings) -> Result<Vec<Track>> {
    println!("Preparing data, please wait...");
    let loaded = load_tracks(&settings.data_path)?;
    info!(
        tracks = loaded.tracks.len(),
        duplicates = loaded.duplicates,
        skipped = loaded.skipped,
        path = %settings.data_path.display(),
        "loaded dataset"
    );
    Ok(loaded.tracks)
}

/// Progress bar shown while the charts of a run are rendered
pub(crate) fn chart_progress(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    pb.set_style(style);
    pb.set_message("Charts");
    pb
}

/// Announces a saved image without tearing the progress bar, then advances it
pub(crate) fn announce_image(pb: &ProgressBar, path: &Path) {
    let saved = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    pb.suspend(|| println!("Image has been successfully saved to: {}", saved.display()));
    pb.inc(1);
}

/// Writes the plain-text summary next to the images of a run
pub(crate) fn write_summary(image_dir: &Path, sections: &[String]) -> Result<PathBuf> {
    let path = image_dir.join("summary.txt");
    fs::write(&path, sections.join("\n\n") + "\n")?;
    debug!(path = %path.display(), "wrote summary");
    Ok(path)
}

/// Charts in report order: every category, the summary charts, then `extra`
pub(crate) fn report_charts(settings: &Settings, dirname: &str, extra: &[&str]) -> Vec<Chart> {
    Category::ALL
        .iter()
        .map(|category| category.name())
        .chain(SUMMARY_CHARTS)
        .chain(extra.iter().copied())
        .map(|name| Chart {
            name: name.to_string(),
            link: settings.image_link(dirname, &format!("{name}.png")),
        })
        .collect()
}

/// Path of a chart image inside the image directory of a run
pub(crate) fn chart_path(image_dir: &Path, name: &str) -> PathBuf {
    image_dir.join(format!("{name}.png"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_charts_order() {
        let charts = report_charts(&Settings::default(), "all_decades", &["coefs"]);

        assert_eq!(charts.len(), Category::ALL.len() + 4);
        assert_eq!(charts[0].name, "valence");
        assert_eq!(charts[0].link, "../img/all_decades/valence.png");
        let names: Vec<&str> = charts[12..].iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["explicit", "top10", "top10popular", "coefs"]);
    }

    #[test]
    fn test_write_summary() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_summary(
            temp_dir.path(),
            &["first".to_string(), "second".to_string()],
        )
        .unwrap();

        assert_eq!(path, temp_dir.path().join("summary.txt"));
        assert_eq!(fs::read_to_string(path).unwrap(), "first\n\nsecond\n");
    }

    #[test]
    fn test_load_dataset_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            data_path: temp_dir.path().join("missing.csv"),
            ..Settings::default()
        };
        assert!(matches!(
            load_dataset(&settings),
            Err(AnalysisError::Parsing(ParsingError::FileRead(_)))
        ));
    }
}
