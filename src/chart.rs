//! PNG rendering of burndown series.

use crate::counter::DailyCounts;
use chrono::NaiveDate;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 12x6 inches at 300 dpi.
pub const CHART_SIZE: (u32, u32) = (3600, 1800);

const FONT: &str = "sans-serif";
const OPEN_COLOR: RGBColor = RED;
const CLOSED_COLOR: RGBColor = RGBColor(0, 128, 0);

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("series lengths differ: {dates} dates, {open} open counts, {closed} closed counts")]
    LengthMismatch {
        dates: usize,
        open: usize,
        closed: usize,
    },

    #[error("nothing to plot for `{0}`")]
    Empty(String),

    #[error("failed to prepare chart directory {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to draw {path}: {message}")]
    Draw { path: PathBuf, message: String },
}

/// Turns one window's counts into an image somewhere.
pub trait ChartRenderer {
    /// Renders `counts` under `file_name` and returns where the chart was written.
    fn render(&self, counts: &DailyCounts, file_name: &str, title: &str) -> Result<PathBuf, ChartError>;
}

/// Writes PNG files into a single output directory.
#[derive(Debug, Clone)]
pub struct PngChartRenderer {
    output_dir: PathBuf,
}

impl PngChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl ChartRenderer for PngChartRenderer {
    fn render(&self, counts: &DailyCounts, file_name: &str, title: &str) -> Result<PathBuf, ChartError> {
        validate(counts, title)?;

        std::fs::create_dir_all(&self.output_dir).map_err(|source| ChartError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let path = self.output_dir.join(file_name);
        draw(counts, &path, title).map_err(|message| ChartError::Draw {
            path: path.clone(),
            message,
        })?;

        tracing::debug!(path = %path.display(), days = counts.len(), "Rendered chart");
        Ok(path)
    }
}

fn validate(counts: &DailyCounts, title: &str) -> Result<(), ChartError> {
    let (dates, open, closed) = (
        counts.dates.len(),
        counts.open_count.len(),
        counts.closed_count.len(),
    );
    if dates != open || dates != closed {
        return Err(ChartError::LengthMismatch {
            dates,
            open,
            closed,
        });
    }
    if dates == 0 {
        return Err(ChartError::Empty(title.to_string()));
    }
    Ok(())
}

/// Draws the chart. Plotters errors are generic over the backend, so they are
/// flattened to their message here.
fn draw(counts: &DailyCounts, path: &Path, title: &str) -> Result<(), String> {
    let (Some(&first), Some(&last)) = (counts.dates.first(), counts.dates.last()) else {
        return Err("no dates to plot".to_string());
    };
    // A one-day window still needs a non-empty x range.
    let x_end = last.succ_opt().unwrap_or(last);
    let y_max = counts
        .open_count
        .iter()
        .chain(&counts.closed_count)
        .copied()
        .max()
        .unwrap_or(0);
    // Headroom above the tallest point so markers are not clipped.
    let y_end = y_max + (y_max / 10).max(1);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| e.to_string())?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 64))
        .margin(40)
        .x_label_area_size(220)
        .y_label_area_size(140)
        .build_cartesian_2d(first..x_end, 0usize..y_end)
        .map_err(|e| e.to_string())?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Number of Issues")
        .axis_desc_style((FONT, 40))
        .x_labels(counts.len().min(20))
        .x_label_formatter(&|date: &NaiveDate| date.format("%Y-%m-%d").to_string())
        .x_label_style((FONT, 32).into_font().transform(FontTransform::Rotate90))
        .y_label_style((FONT, 32))
        .bold_line_style(BLACK.mix(0.25))
        .light_line_style(BLACK.mix(0.08))
        .draw()
        .map_err(|e| e.to_string())?;

    chart
        .draw_series(
            LineSeries::new(
                counts.dates.iter().copied().zip(counts.open_count.iter().copied()),
                OPEN_COLOR.stroke_width(4),
            )
            .point_size(8),
        )
        .map_err(|e| e.to_string())?
        .label("Open Issues")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 40, y)], OPEN_COLOR.stroke_width(4)));

    chart
        .draw_series(
            LineSeries::new(
                counts.dates.iter().copied().zip(counts.closed_count.iter().copied()),
                CLOSED_COLOR.stroke_width(4),
            )
            .point_size(8),
        )
        .map_err(|e| e.to_string())?
        .label("Closed Issues")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 40, y)], CLOSED_COLOR.stroke_width(4)));

    chart
        .configure_series_labels()
        .label_font((FONT, 36))
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()
        .map_err(|e| e.to_string())?;

    root.present().map_err(|e| e.to_string())?;
    Ok(())
}
