//! HTML report generation
//!
//! Generates a static HTML page with inline CSS that links the chart images of a run.

use crate::settings::ReportInfo;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    Write(#[from] std::io::Error),
}

/// One chart image shown on the page
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    /// Caption, usually the category name
    pub name: String,
    /// Link relative to the report file
    pub link: String,
}

/// Everything shown on a report page
#[derive(Debug, Clone)]
pub struct ReportPage {
    pub title: String,
    /// Period covered, e.g. `1921 and 2020`
    pub years: String,
    pub charts: Vec<Chart>,
    /// Trusted HTML fragment describing detected correlations
    pub correlation_notes: Option<String>,
    pub info: ReportInfo,
}

/// Render a report page as a complete HTML document
pub fn render_report(page: &ReportPage) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        {header}
        {info}
        {charts}
        {correlations}
    </div>
</body>
</html>
"#,
        title = escape_html(&page.title),
        css = inline_css(),
        header = render_header(page),
        info = render_info(&page.info),
        charts = render_charts(&page.charts),
        correlations = page
            .correlation_notes
            .as_deref()
            .filter(|notes| !notes.is_empty())
            .map(render_correlations)
            .unwrap_or_default(),
    )
}

/// Writes the rendered page and announces where it went
pub fn write_report(page: &ReportPage, path: &Path) -> Result<PathBuf, ReportError> {
    fs::write(path, render_report(page))?;
    let saved = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    println!("Report has been successfully saved to: {}", saved.display());
    Ok(saved)
}

fn render_header(page: &ReportPage) -> String {
    format!(
        r#"<header>
            <h1>{title}</h1>
            <p class="years">Songs released between {years}</p>
        </header>"#,
        title = escape_html(&page.title),
        years = escape_html(&page.years),
    )
}

fn render_info(info: &ReportInfo) -> String {
    let entries = info.entries();
    if entries.is_empty() {
        return String::new();
    }

    let rows: String = entries
        .iter()
        .map(|(label, value)| {
            format!(
                "<tr><th>{}</th><td>{}</td></tr>",
                label,
                escape_html(value)
            )
        })
        .collect();
    format!(r#"<table class="info">{rows}</table>"#)
}

fn render_charts(charts: &[Chart]) -> String {
    charts
        .iter()
        .map(|chart| {
            format!(
                r#"<figure>
            <img src="{link}" alt="{name}">
            <figcaption>{name}</figcaption>
        </figure>"#,
                link = escape_html(&chart.link),
                name = escape_html(&chart.name),
            )
        })
        .collect::<Vec<_>>()
        .join("\n        ")
}

fn render_correlations(notes: &str) -> String {
    format!(
        r#"<section class="correlations">
            <h2>Detected correlations</h2>
            <p>{notes}</p>
        </section>"#
    )
}

fn inline_css() -> &'static str {
    r#"
body { font-family: sans-serif; background: #f7f7f7; color: #222; margin: 0; }
.container { max-width: 1600px; margin: 0 auto; padding: 24px; }
header h1 { margin-bottom: 4px; }
.years { color: #555; margin-top: 0; }
table.info { border-collapse: collapse; margin: 16px 0; }
table.info th { text-align: left; padding: 4px 16px 4px 0; color: #555; }
table.info td { padding: 4px 0; }
figure { background: #fff; margin: 24px 0; padding: 16px; border: 1px solid #ddd; }
figure img { max-width: 100%; }
figcaption { text-transform: capitalize; color: #555; margin-top: 8px; }
.correlations { background: #fff; padding: 16px; border: 1px solid #ddd; }
"#
}

/// Escapes text for use in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
