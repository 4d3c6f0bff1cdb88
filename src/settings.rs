//! Run configuration
//!
//! Paths and the report name come from the command line; the author block shown
//! in the report header comes from an optional JSON file.

use serde::Deserialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Default location of the track dataset
pub const DEFAULT_DATA_PATH: &str = "./data/new_dane.csv";

/// Default root for per-run image directories
pub const DEFAULT_IMAGE_ROOT: &str = "./img";

/// Default directory for generated reports
pub const DEFAULT_RESULTS_DIR: &str = "./results";

/// Default report name, without extension
pub const DEFAULT_REPORT_NAME: &str = "rep";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read report info file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse report info file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid report name `{0}`: it must be non-empty and contain no path separators")]
    InvalidName(String),
}

type Result<T> = core::result::Result<T, SettingsError>;

/// Where a run reads its data and writes its artifacts
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_path: PathBuf,
    pub image_root: PathBuf,
    pub results_dir: PathBuf,
    pub report_name: String,
}

impl Settings {
    pub fn new(
        data_path: PathBuf,
        image_root: PathBuf,
        results_dir: PathBuf,
        report_name: String,
    ) -> Result<Self> {
        if report_name.is_empty() || report_name.contains(['/', '\\']) {
            return Err(SettingsError::InvalidName(report_name));
        }

        Ok(Self {
            data_path,
            image_root,
            results_dir,
            report_name,
        })
    }

    /// Path of the HTML report, `<results>/<name>.html`
    pub fn report_path(&self) -> PathBuf {
        self.results_dir.join(format!("{}.html", self.report_name))
    }

    /// Directory holding the images of one run, `<img>/<dirname>`
    pub fn image_dir(&self, dirname: &str) -> PathBuf {
        self.image_root.join(dirname)
    }

    /// Link to an image as seen from the report's directory, with `/` separators
    pub fn image_link(&self, dirname: &str, file_name: &str) -> String {
        let image = self.image_dir(dirname).join(file_name);
        let relative = relative_path(&absolute(&image), &absolute(&self.results_dir));
        relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            image_root: PathBuf::from(DEFAULT_IMAGE_ROOT),
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            report_name: DEFAULT_REPORT_NAME.to_string(),
        }
    }
}

/// Author block printed in the report header
///
/// Missing fields are empty; an empty `date` is replaced by today's date on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportInfo {
    pub date: String,
    pub author: String,
    pub country: String,
    pub academy: String,
    pub faculty: String,
}

impl ReportInfo {
    /// Loads the author block from a JSON file, or uses an empty block
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let info = match path {
            Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
            None => ReportInfo::default(),
        };
        Ok(info.with_default_date())
    }

    fn with_default_date(mut self) -> Self {
        if self.date.trim().is_empty() {
            self.date = chrono::Local::now().format("%d/%m/%Y").to_string();
        }
        self
    }

    /// Labelled fields in display order, skipping empty ones
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("Date", self.date.as_str()),
            ("Author", self.author.as_str()),
            ("Country", self.country.as_str()),
            ("Academy", self.academy.as_str()),
            ("Faculty", self.faculty.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .collect()
    }
}

/// Absolute, lexically normalised form of `path`
fn absolute(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|dir| dir.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut normalised = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalised.pop();
            }
            other => normalised.push(other.as_os_str()),
        }
    }
    normalised
}

/// Lexical path from `base` to `target`; both must be normalised
fn relative_path(target: &Path, base: &Path) -> PathBuf {
    let target_components: Vec<Component> = target.components().collect();
    let base_components: Vec<Component> = base.components().collect();
    let common = target_components
        .iter()
        .zip(&base_components)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_components.len() {
        relative.push("..");
    }
    for component in &target_components[common..] {
        relative.push(component.as_os_str());
    }
    relative
}
