//! Analysis of the whole dataset history
//!
//! Charts yearly averages of every category, the explicit share per year,
//! all-time artist rankings and the correlation heatmap.

use super::correlation::{
    describe_findings, CorrelationMatrix, StrongCorrelations, CORRELATION_THRESHOLD,
    FINDINGS_PER_SIGN,
};
use super::{
    announce_image, chart_path, chart_progress, load_dataset, report_charts, write_summary,
    AnalysisError, Result, RunOutcome, REPORT_TITLE,
};
use crate::common::{Category, Measure, Track};
use crate::common::plots::{
    create_bar_chart, create_heatmap, create_line_chart, BarPanel, LineChart,
};
use crate::common::stats::{
    explicit_percentage, mean, top_artists_by_count, top_artists_by_popularity, YearGroups,
};
use crate::common::tables::{correlation_rows, format_table, ranking_rows, statistics_rows};
use crate::output::{check_report_path, prepare_image_dir, prepare_results_dir, Proceed};
use crate::prompt::Confirm;
use crate::report::{write_report, ReportPage};
use crate::settings::{ReportInfo, Settings};
use std::ops::RangeInclusive;
use std::path::Path;

/// Years covered by the yearly charts
pub const HISTORY_YEARS: RangeInclusive<i32> = 1921..=2020;

/// Image directory name of a history run
pub const HISTORY_DIRNAME: &str = "all_decades";

/// Heatmap colours saturate at this coefficient magnitude
const HEATMAP_SATURATION: f64 = 0.9;

const TOP_ARTISTS: usize = 10;

/// `1921 and 2020`
pub fn history_years() -> String {
    format!("{} and {}", HISTORY_YEARS.start(), HISTORY_YEARS.end())
}

/// Per-year aggregates of the whole dataset
#[derive(Debug)]
pub struct YearlyStatistics {
    /// Explicit share in percent, per year
    pub explicit: Vec<(i32, Option<f64>)>,
    /// Mean of every category per year, in [`Category::ALL`] order
    pub averages: Vec<(Category, Vec<(i32, Option<f64>)>)>,
}

impl YearlyStatistics {
    pub fn compute(tracks: &[Track]) -> Self {
        let groups = YearGroups::new(tracks, HISTORY_YEARS);
        let explicit = groups.series(|year_tracks| explicit_percentage(year_tracks));
        let averages = Category::ALL
            .iter()
            .map(|&category| {
                let series =
                    groups.series(|year_tracks| mean(&category.values(year_tracks)));
                (category, series)
            })
            .collect();
        Self { explicit, averages }
    }
}

/// Analyses every year of the dataset and writes the report
///
/// Aborts without error when the user declines an overwrite.
pub fn analyze_history(
    settings: &Settings,
    info: &ReportInfo,
    confirm: &mut dyn Confirm,
) -> Result<RunOutcome> {
    let report_path = settings.report_path();
    if check_report_path(&report_path, confirm)? == Proceed::Declined {
        return Ok(RunOutcome::Aborted);
    }

    let tracks = load_dataset(settings)?;
    if !tracks.iter().any(|track| HISTORY_YEARS.contains(&track.year)) {
        return Err(AnalysisError::EmptySelection(history_years()));
    }
    let yearly = YearlyStatistics::compute(&tracks);
    let matrix = CorrelationMatrix::compute(&tracks, &Measure::all());
    let findings = matrix.strong_correlations(CORRELATION_THRESHOLD, FINDINGS_PER_SIGN);

    let image_dir = settings.image_dir(HISTORY_DIRNAME);
    if prepare_image_dir(&image_dir, confirm)? == Proceed::Declined {
        return Ok(RunOutcome::Aborted);
    }

    println!("Creating graphs, please wait...");
    generate_history_plots(&tracks, &yearly, &matrix, &image_dir)?;
    write_summary(&image_dir, &generate_history_summary(&tracks, &findings))?;

    println!("Creating report page, please wait...");
    prepare_results_dir(&settings.results_dir)?;
    let page = ReportPage {
        title: REPORT_TITLE.to_string(),
        years: history_years(),
        charts: report_charts(settings, HISTORY_DIRNAME, &["coefs"]),
        correlation_notes: (!findings.is_empty()).then(|| describe_findings(&findings)),
        info: info.clone(),
    };
    let saved = write_report(&page, &report_path)?;
    Ok(RunOutcome::Completed(saved))
}

/// Renders every history chart into `image_dir`
pub fn generate_history_plots(
    tracks: &[Track],
    yearly: &YearlyStatistics,
    matrix: &CorrelationMatrix,
    image_dir: &Path,
) -> Result<()> {
    let pb = chart_progress((yearly.averages.len() + 4) as u64);
    let years = (*HISTORY_YEARS.start() - 1) as f64..(*HISTORY_YEARS.end() + 1) as f64;

    for (category, series) in &yearly.averages {
        let title = format!("Average {} of songs", category.name());
        let chart = LineChart {
            title: &title,
            y_label: category.name(),
            x_range: years.clone(),
            y_range: None,
        };
        let path = chart_path(image_dir, category.name());
        create_line_chart(series, &chart, &path)?;
        announce_image(&pb, &path);
    }

    let chart = LineChart {
        title: "Percentage of explicit songs",
        y_label: "Explicitness [%]",
        x_range: years,
        y_range: Some(0.0..51.0),
    };
    let path = chart_path(image_dir, "explicit");
    create_line_chart(&yearly.explicit, &chart, &path)?;
    announce_image(&pb, &path);

    let by_count = BarPanel {
        title: format!("Top 10 artists between {}", history_years()),
        bars: top_artists_by_count(tracks, TOP_ARTISTS)
            .into_iter()
            .map(|entry| (entry.artists, entry.score as f64))
            .collect(),
    };
    let path = chart_path(image_dir, "top10");
    create_bar_chart(&[by_count], "Number of songs", &path)?;
    announce_image(&pb, &path);

    let by_popularity = BarPanel {
        title: format!("Top 10 most popular artists between {}", history_years()),
        bars: top_artists_by_popularity(tracks, TOP_ARTISTS)
            .into_iter()
            .map(|entry| (entry.artists, entry.score))
            .collect(),
    };
    let path = chart_path(image_dir, "top10popular");
    create_bar_chart(&[by_popularity], "Summed popularity", &path)?;
    announce_image(&pb, &path);

    let path = chart_path(image_dir, "coefs");
    create_heatmap(
        &matrix.names(),
        &matrix.values,
        "Table of correlation coefficients between all categories",
        HEATMAP_SATURATION,
        &path,
    )?;
    announce_image(&pb, &path);

    pb.finish_and_clear();
    Ok(())
}

/// Whole-dataset statistics, rankings and strong correlations as text tables
pub fn generate_history_summary(tracks: &[Track], findings: &StrongCorrelations) -> Vec<String> {
    let period = history_years();
    vec![
        format!(
            "Summary\n{}\nSongs: {}\nExplicit songs: {:.2}%",
            "=".repeat(7),
            tracks.len(),
            explicit_percentage(tracks).unwrap_or(0.0)
        ),
        format_table(&statistics_rows(tracks), Some("Statistics of all songs")),
        format_table(
            &ranking_rows(&top_artists_by_count(tracks, TOP_ARTISTS)),
            Some(&format!("Top 10 artists between {period}")),
        ),
        format_table(
            &ranking_rows(&top_artists_by_popularity(tracks, TOP_ARTISTS)),
            Some(&format!("Top 10 most popular artists between {period}")),
        ),
        format_table(&correlation_rows(findings), Some("Strong correlations")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::data_structures::test_track;
    use crate::output::REPORT_EXISTS_PROMPT;
    use crate::prompt::ScriptedConfirm;
    use std::fs;

    fn settings_in(root: &Path) -> Settings {
        Settings {
            data_path: root.join("data.csv"),
            image_root: root.join("img"),
            results_dir: root.join("results"),
            ..Settings::default()
        }
    }

    const DATASET: &str = "\
artists;year;explicit;valence;acousticness;danceability;energy;instrumentalness;key;liveness;loudness;popularity;speechiness;tempo;length
['Bessie Smith'];1921;0;0.2;0.9;0.4;0.2;0.1;3;0.2;-15.0;10;0.05;100.0;180000
['Queen'];1980;0;0.5;0.1;0.6;0.8;0.0;5;0.1;-6.0;70;0.05;120.0;210000
['Eminem'];2002;1;0.6;0.05;0.8;0.7;0.0;1;0.1;-4.0;85;0.3;95.0;240000
";

    #[test]
    fn test_history_years() {
        assert_eq!(history_years(), "1921 and 2020");
    }

    #[test]
    fn test_yearly_statistics() {
        let tracks = vec![
            test_track("A", 1921, true, 10.0),
            test_track("B", 1921, false, 30.0),
            test_track("C", 2020, false, 50.0),
            test_track("D", 2021, true, 90.0),
        ];
        let yearly = YearlyStatistics::compute(&tracks);

        assert_eq!(yearly.explicit.len(), 100);
        assert_eq!(yearly.explicit[0], (1921, Some(50.0)));
        assert_eq!(yearly.explicit[1], (1922, None));
        assert_eq!(yearly.explicit[99], (2020, Some(0.0)));

        let (category, popularity) = &yearly.averages[8];
        assert_eq!(*category, Category::Popularity);
        assert_eq!(popularity[0], (1921, Some(20.0)));
        assert_eq!(popularity[99], (2020, Some(50.0)));
    }

    #[test]
    fn test_yearly_averages_skip_missing_measurements() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("data.csv");
        let header = DATASET.lines().next().unwrap();
        fs::write(
            &path,
            format!(
                "{header}\n\
                 ['Queen'];1980;0;nan;0.1;0.6;0.8;0.0;5;0.1;-6.0;70;0.05;120.0;210000\n\
                 ['ABBA'];1980;0;0.4;0.2;0.7;0.6;0.0;2;0.2;-8.0;60;0.04;110.0;200000\n"
            ),
        )
        .unwrap();
        let tracks = crate::parsing::load_tracks(&path).unwrap().tracks;
        assert_eq!(tracks.len(), 2);

        let yearly = YearlyStatistics::compute(&tracks);
        let (category, valence) = &yearly.averages[0];
        assert_eq!(*category, Category::Valence);
        assert_eq!(valence[1980 - 1921], (1980, Some(0.4)));

        let summary = generate_history_summary(&tracks, &StrongCorrelations::default()).join("\n");
        assert!(!summary.contains("NaN"));
    }

    #[test]
    fn test_declined_report_overwrite() {
        let temp_dir = tempfile::tempdir().unwrap();
        let settings = settings_in(temp_dir.path());
        fs::write(&settings.data_path, DATASET).unwrap();
        fs::create_dir_all(&settings.results_dir).unwrap();
        fs::write(settings.report_path(), "old").unwrap();
        let mut confirm = ScriptedConfirm::new(&[false]);

        let outcome = analyze_history(&settings, &ReportInfo::default(), &mut confirm).unwrap();

        assert_eq!(outcome, RunOutcome::Aborted);
        assert_eq!(confirm.asked, vec![REPORT_EXISTS_PROMPT]);
        assert!(!settings.image_root.exists());
    }

    #[test]
    fn test_no_tracks_in_history_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let settings = settings_in(temp_dir.path());
        let header = DATASET.lines().next().unwrap();
        fs::write(&settings.data_path, format!("{header}\n")).unwrap();
        let mut confirm = ScriptedConfirm::new(&[]);

        let result = analyze_history(&settings, &ReportInfo::default(), &mut confirm);
        assert!(matches!(result, Err(AnalysisError::EmptySelection(_))));
    }

    #[test]
    fn test_generate_history_summary() {
        let tracks = vec![
            test_track("Queen", 1980, false, 70.0),
            test_track("Eminem", 2002, true, 85.0),
        ];
        let summary = generate_history_summary(&tracks, &StrongCorrelations::default()).join("\n");

        assert!(summary.contains("Songs: 2\nExplicit songs: 50.00%"));
        assert!(summary.contains("Top 10 most popular artists between 1921 and 2020"));
        assert!(summary.contains("Strong correlations\n===================\nNo data available"));
    }

    #[test]
    #[ignore = "Font rendering not available in test environment"]
    fn test_analyze_history_success() {
        let temp_dir = tempfile::tempdir().unwrap();
        let settings = settings_in(temp_dir.path());
        fs::write(&settings.data_path, DATASET).unwrap();
        let mut confirm = ScriptedConfirm::new(&[]);

        let outcome = analyze_history(&settings, &ReportInfo::default(), &mut confirm).unwrap();

        let image_dir = settings.image_dir(HISTORY_DIRNAME);
        for name in ["valence", "explicit", "top10", "top10popular", "coefs"] {
            assert!(chart_path(&image_dir, name).exists(), "{name}.png missing");
        }
        match outcome {
            RunOutcome::Completed(path) => {
                let html = fs::read_to_string(path).unwrap();
                assert!(html.contains("Songs released between 1921 and 2020"));
                assert!(html.contains("../img/all_decades/coefs.png"));
            }
            RunOutcome::Aborted => panic!("run was aborted"),
        }
    }
}
