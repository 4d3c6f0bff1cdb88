//! Plotting infrastructure for report charts
//!
//! This module renders the report images using the [`plotters`] crate: side-by-side
//! histograms, explicit-share pie charts, horizontal artist rankings, yearly line
//! charts and the correlation heatmap. Every chart is saved as a PNG file.
//!
//! Multi-panel figures are split evenly into one column per panel.

use super::stats::HistogramBin;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;
use std::path::Path;
use thiserror::Error;

/// Canvas size of side-by-side comparison figures
pub const COMPARISON_SIZE: (u32, u32) = (1500, 450);

/// Canvas size of single charts
pub const SINGLE_SIZE: (u32, u32) = (1000, 700);

/// Canvas size of the correlation heatmap
pub const HEATMAP_SIZE: (u32, u32) = (2000, 1000);

const FONT: &str = "sans-serif";
const BAR_FILL: RGBColor = RGBColor(31, 119, 180);
const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);
const EXPLICIT_COLOR: RGBColor = RGBColor(31, 119, 180);
const NON_EXPLICIT_COLOR: RGBColor = RGBColor(255, 127, 14);

/// Ten-step spectral palette used for artist rankings
const SPECTRAL: [RGBColor; 10] = [
    RGBColor(158, 1, 66),
    RGBColor(213, 62, 79),
    RGBColor(244, 109, 67),
    RGBColor(253, 174, 97),
    RGBColor(254, 224, 139),
    RGBColor(230, 245, 152),
    RGBColor(171, 221, 164),
    RGBColor(102, 194, 165),
    RGBColor(50, 136, 189),
    RGBColor(94, 79, 162),
];

/// Endpoints of the diverging heatmap palette
const DIVERGING_NEGATIVE: RGBColor = RGBColor(1, 102, 94);
const DIVERGING_NEUTRAL: RGBColor = RGBColor(245, 245, 245);
const DIVERGING_POSITIVE: RGBColor = RGBColor(140, 81, 10);

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = core::result::Result<T, PlotError>;

/// One histogram panel of a comparison figure
#[derive(Debug, Clone)]
pub struct HistogramPanel {
    pub title: String,
    pub bins: Vec<HistogramBin>,
}

/// One pie panel: the share of explicit songs
#[derive(Debug, Clone)]
pub struct PiePanel {
    pub title: String,
    /// Explicit share in percent (0-100)
    pub percentage: f64,
}

/// One horizontal bar chart panel, bars in ranking order (largest first)
#[derive(Debug, Clone)]
pub struct BarPanel {
    pub title: String,
    pub bars: Vec<(String, f64)>,
}

/// Settings of a yearly line chart
#[derive(Debug, Clone)]
pub struct LineChart<'a> {
    pub title: &'a str,
    pub y_label: &'a str,
    pub x_range: Range<f64>,
    /// Fixed Y range; padded around the data when `None`
    pub y_range: Option<Range<f64>>,
}

/// Draws side-by-side histograms and saves them as a PNG file
///
/// # Arguments
/// * `panels` - One panel per column, usually the two compared decades
/// * `x_label` - Label for the X-axis of every panel
/// * `output_path` - Path where the PNG file should be saved
///
/// # Returns
/// * `Ok(())` - If the chart was successfully created and saved
/// * `Err(PlotError)` - If a panel has no data or drawing failed
pub fn create_histogram_comparison(
    panels: &[HistogramPanel],
    x_label: &str,
    output_path: &Path,
) -> Result<()> {
    if panels.iter().any(|panel| panel.bins.is_empty()) {
        return Err(PlotError::InvalidData(
            "Histogram bins cannot be empty".to_string(),
        ));
    }

    render_panels(output_path, COMPARISON_SIZE, panels, |area, panel| {
        draw_histogram_panel(area, panel, x_label)
    })
}

/// Draws side-by-side pie charts of the explicit share and saves them as a PNG file
pub fn create_pie_comparison(panels: &[PiePanel], output_path: &Path) -> Result<()> {
    for panel in panels {
        if !(0.0..=100.0).contains(&panel.percentage) {
            return Err(PlotError::InvalidData(format!(
                "Percentage {:.2} is outside valid range 0-100",
                panel.percentage
            )));
        }
    }

    render_panels(output_path, COMPARISON_SIZE, panels, draw_pie_panel)
}

/// Draws one horizontal bar chart per panel and saves them as a PNG file
///
/// A single panel is rendered on the single-chart canvas, several panels on the
/// comparison canvas.
pub fn create_bar_chart(panels: &[BarPanel], x_label: &str, output_path: &Path) -> Result<()> {
    if panels.iter().any(|panel| panel.bars.is_empty()) {
        return Err(PlotError::InvalidData("Bars cannot be empty".to_string()));
    }

    let size = if panels.len() > 1 {
        COMPARISON_SIZE
    } else {
        SINGLE_SIZE
    };
    render_panels(output_path, size, panels, |area, panel| {
        draw_bar_panel(area, panel, x_label)
    })
}

/// Draws a yearly line chart and saves it as a PNG file
///
/// Years with a `None` value split the line into separate segments; isolated
/// points are marked with a dot.
pub fn create_line_chart(
    series: &[(i32, Option<f64>)],
    chart: &LineChart<'_>,
    output_path: &Path,
) -> Result<()> {
    let present: Vec<f64> = series
        .iter()
        .filter_map(|(_, value)| *value)
        .filter(|value| value.is_finite())
        .collect();
    if present.is_empty() {
        return Err(PlotError::InvalidData(
            "Series has no values to plot".to_string(),
        ));
    }
    let y_range = match chart.y_range.clone() {
        Some(range) => range,
        None => padded_range(&present)?,
    };

    let root = BitMapBackend::new(output_path, SINGLE_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let mut chart_context = ChartBuilder::on(&root)
        .caption(chart.title, (FONT, 32))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(85)
        .build_cartesian_2d(chart.x_range.clone(), y_range)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart_context
        .configure_mesh()
        .x_desc("Year")
        .y_desc(chart.y_label)
        .x_label_formatter(&|x| format!("{:.0}", x))
        .label_style((FONT, 20))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    for segment in contiguous_segments(series) {
        if segment.len() == 1 {
            chart_context
                .draw_series(
                    segment
                        .iter()
                        .map(|&point| Circle::new(point, 3, LINE_COLOR.filled())),
                )
                .map_err(|e| PlotError::Drawing(e.to_string()))?;
        } else {
            chart_context
                .draw_series(LineSeries::new(segment, &LINE_COLOR))
                .map_err(|e| PlotError::Drawing(e.to_string()))?;
        }
    }

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

/// Draws an annotated heatmap of a square matrix and saves it as a PNG file
///
/// Colours saturate at `saturation`; NaN cells are left blank.
pub fn create_heatmap(
    names: &[&str],
    values: &[Vec<f64>],
    title: &str,
    saturation: f64,
    output_path: &Path,
) -> Result<()> {
    let size = names.len();
    if size == 0 || values.len() != size || values.iter().any(|row| row.len() != size) {
        return Err(PlotError::InvalidData(
            "Heatmap needs a non-empty square matrix matching its labels".to_string(),
        ));
    }

    let root = BitMapBackend::new(output_path, HEATMAP_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let extent = size as f64 - 0.5;
    let mut chart_context = ChartBuilder::on(&root)
        .caption(title, (FONT, 40))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(180)
        .build_cartesian_2d(-0.5..extent, -0.5..extent)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    // Row 0 is drawn at the top
    let x_formatter = |x: &f64| index_label(*x, names, false);
    let y_formatter = |y: &f64| index_label(*y, names, true);
    chart_context
        .configure_mesh()
        .disable_mesh()
        .x_labels(size)
        .y_labels(size)
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .label_style((FONT, 22))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let cells = (0..size).flat_map(|row| (0..size).map(move |column| (row, column)));
    chart_context
        .draw_series(cells.clone().map(|(row, column)| {
            let x = column as f64;
            let y = (size - 1 - row) as f64;
            let color = diverging_color(values[row][column], saturation);
            Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], color.filled())
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let annotation_style =
        TextStyle::from((FONT, 18).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
    chart_context
        .draw_series(
            cells
                .filter(|&(row, column)| !values[row][column].is_nan())
                .map(|(row, column)| {
                    let x = column as f64;
                    let y = (size - 1 - row) as f64;
                    Text::new(
                        format!("{:.2}", values[row][column]),
                        (x, y),
                        annotation_style.clone(),
                    )
                }),
        )
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

/// Splits the canvas into one column per item and draws each item into its column
fn render_panels<'p, T, F>(
    output_path: &'p Path,
    size: (u32, u32),
    items: &[T],
    mut draw: F,
) -> Result<()>
where
    F: FnMut(&DrawingArea<BitMapBackend<'p>, Shift>, &T) -> Result<()>,
{
    if items.is_empty() {
        return Err(PlotError::InvalidData("No panels to draw".to_string()));
    }

    let root = BitMapBackend::new(output_path, size).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let areas = root.split_evenly((1, items.len()));
    for (area, item) in areas.iter().zip(items) {
        draw(area, item)?;
    }

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

fn draw_histogram_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &HistogramPanel,
    x_label: &str,
) -> Result<()> {
    let x_min = panel.bins.first().map(|bin| bin.start).unwrap_or(0.0);
    let x_max = panel.bins.last().map(|bin| bin.end).unwrap_or(1.0);
    let highest = panel.bins.iter().map(|bin| bin.count).max().unwrap_or(0);
    let y_max = (highest.max(1) as f64) * 1.05;

    let mut chart_context = ChartBuilder::on(area)
        .caption(&panel.title, (FONT, 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart_context
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(x_label)
        .y_desc("Number of songs")
        .y_label_formatter(&|y| format!("{:.0}", y))
        .label_style((FONT, 14))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart_context
        .draw_series(panel.bins.iter().map(|bin| {
            Rectangle::new(
                [(bin.start, 0.0), (bin.end, bin.count as f64)],
                BAR_FILL.filled(),
            )
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    // Black edges around every bar
    chart_context
        .draw_series(panel.bins.iter().map(|bin| {
            Rectangle::new(
                [(bin.start, 0.0), (bin.end, bin.count as f64)],
                BLACK.stroke_width(1),
            )
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

fn draw_pie_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &PiePanel,
) -> Result<()> {
    let area = area
        .titled(&panel.title, (FONT, 20))
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let (width, height) = area.dim_in_pixel();
    let center = (width as f64 / 2.0, height as f64 / 2.0);
    let radius = width.min(height) as f64 * 0.4;

    let label_style =
        TextStyle::from((FONT, 18).into_font()).pos(Pos::new(HPos::Center, VPos::Center));

    // Counter-clockwise from 12 o'clock
    let slices = [
        (panel.percentage, EXPLICIT_COLOR, "Explicit"),
        (100.0 - panel.percentage, NON_EXPLICIT_COLOR, ""),
    ];
    let mut start_angle = 90.0_f64;
    for (share, color, label) in slices {
        if share <= 0.0 {
            continue;
        }
        let sweep = share / 100.0 * 360.0;
        let end_angle = start_angle + sweep;

        area.draw(&Polygon::new(
            wedge_points(center, radius, start_angle, end_angle),
            color.filled(),
        ))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

        let middle = start_angle + sweep / 2.0;
        area.draw(&Text::new(
            format!("{:.1}%", share),
            polar_point(center, radius * 0.6, middle),
            label_style.clone(),
        ))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

        if !label.is_empty() {
            area.draw(&Text::new(
                label.to_string(),
                polar_point(center, radius * 1.15, middle),
                label_style.clone(),
            ))
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
        }

        start_angle = end_angle;
    }

    Ok(())
}

fn draw_bar_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &BarPanel,
    x_label: &str,
) -> Result<()> {
    let count = panel.bars.len();
    let highest = panel
        .bars
        .iter()
        .map(|(_, value)| *value)
        .fold(0.0_f64, f64::max);
    let x_max = if highest > 0.0 { highest * 1.05 } else { 1.0 };
    let names: Vec<&str> = panel.bars.iter().map(|(name, _)| name.as_str()).collect();

    let mut chart_context = ChartBuilder::on(area)
        .caption(&panel.title, (FONT, 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(230)
        .build_cartesian_2d(0.0..x_max, -0.5..(count as f64 - 0.5))
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    // The first bar is drawn at the top
    let y_formatter = |y: &f64| truncate_label(&index_label(*y, &names, true), 32);
    chart_context
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(count)
        .y_label_formatter(&y_formatter)
        .x_desc(x_label)
        .label_style((FONT, 14))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart_context
        .draw_series(panel.bars.iter().enumerate().map(|(rank, (_, value))| {
            let y = (count - 1 - rank) as f64;
            Rectangle::new(
                [(0.0, y - 0.4), (*value, y + 0.4)],
                SPECTRAL[rank % SPECTRAL.len()].filled(),
            )
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

/// Pads the data range by 1% of its extent on each side
///
/// A constant series gets half a unit of room on each side. Non-finite values
/// are ignored; without any finite value there is no range to draw.
pub fn padded_range(values: &[f64]) -> Result<Range<f64>> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Err(PlotError::InvalidData(
            "No finite values to derive an axis range from".to_string(),
        ));
    }
    let (min, max) = super::stats::min_max(&finite);
    let extent = max - min;
    let pad = if extent > 0.0 { extent * 0.01 } else { 0.5 };
    Ok((min - pad)..(max + pad))
}

/// Splits a yearly series into runs of consecutive present values
fn contiguous_segments(series: &[(i32, Option<f64>)]) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    for &(year, value) in series {
        match value {
            Some(value) if value.is_finite() => current.push((year as f64, value)),
            _ if !current.is_empty() => segments.push(std::mem::take(&mut current)),
            _ => {}
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Maps an axis key point back to the label at that index
///
/// Key points that are not whole indices get no label. With `reversed`, index 0
/// sits at the top of the axis.
fn index_label(position: f64, names: &[&str], reversed: bool) -> String {
    let rounded = position.round();
    if (position - rounded).abs() > 1e-6 || rounded < 0.0 || rounded >= names.len() as f64 {
        return String::new();
    }
    let index = rounded as usize;
    let index = if reversed {
        names.len() - 1 - index
    } else {
        index
    };
    names[index].to_string()
}

fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let mut truncated: String = label.chars().take(max_chars - 1).collect();
    truncated.push('…');
    truncated
}

/// Diverging colour for a coefficient, saturating at `±saturation`
fn diverging_color(value: f64, saturation: f64) -> RGBColor {
    if value.is_nan() {
        return WHITE;
    }
    let t = (value / saturation).clamp(-1.0, 1.0);
    let target = if t < 0.0 {
        DIVERGING_NEGATIVE
    } else {
        DIVERGING_POSITIVE
    };
    let weight = t.abs();
    let blend = |from: u8, to: u8| (from as f64 + (to as f64 - from as f64) * weight).round() as u8;
    RGBColor(
        blend(DIVERGING_NEUTRAL.0, target.0),
        blend(DIVERGING_NEUTRAL.1, target.1),
        blend(DIVERGING_NEUTRAL.2, target.2),
    )
}

/// Pixel position at `angle` degrees (counter-clockwise from 3 o'clock) around `center`
fn polar_point(center: (f64, f64), radius: f64, angle: f64) -> (i32, i32) {
    let radians = angle.to_radians();
    (
        (center.0 + radius * radians.cos()).round() as i32,
        (center.1 - radius * radians.sin()).round() as i32,
    )
}

/// Polygon outline of a pie wedge, one vertex per degree of arc
fn wedge_points(center: (f64, f64), radius: f64, start: f64, end: f64) -> Vec<(i32, i32)> {
    let steps = ((end - start).abs().ceil() as usize).max(1);
    let mut points = Vec::with_capacity(steps + 2);
    points.push((center.0.round() as i32, center.1.round() as i32));
    for step in 0..=steps {
        let angle = start + (end - start) * step as f64 / steps as f64;
        points.push(polar_point(center, radius, angle));
    }
    points
}
