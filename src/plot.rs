/*!
Static line and scatter charts rendered to SVG.
*/

use std::ops::Range;
use std::path::Path;

use plotters::prelude::*;

use crate::error::{HydroError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Line,
    Scatter,
    LineAndScatter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    pub marker: Marker,
}

impl Series {
    pub fn new(label: impl Into<String>, points: Vec<(f64, f64)>, marker: Marker) -> Self {
        Series {
            label: label.into(),
            points,
            marker,
        }
    }

    pub fn from_columns(label: impl Into<String>, x: &[f64], y: &[f64], marker: Marker) -> Self {
        let points = x.iter().copied().zip(y.iter().copied()).collect();
        Series::new(label, points, marker)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub size: (u32, u32),
    pub series: Vec<Series>,
}

const PALETTE: [RGBColor; 4] = [BLUE, RED, GREEN, MAGENTA];

impl Chart {
    pub fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Chart {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            size: (800, 600),
            series: Vec::new(),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn with_series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    // Axis ranges over every finite point, padded by 5%
    fn ranges(&self) -> Result<(Range<f64>, Range<f64>)> {
        let mut points = self
            .series
            .iter()
            .flat_map(|s| s.points.iter())
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .peekable();
        let &(x0, y0) = *points.peek().ok_or(HydroError::Empty("chart points"))?;

        let (mut x_min, mut x_max, mut y_min, mut y_max) = (x0, x0, y0, y0);
        for &(x, y) in points {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        Ok((padded(x_min, x_max), padded(y_min, y_max)))
    }

    pub fn render_svg(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let plot_error = |reason: String| HydroError::Plot {
            path: path.to_path_buf(),
            reason,
        };
        let (x_range, y_range) = self.ranges()?;

        let root = SVGBackend::new(path, self.size).into_drawing_area();
        root.fill(&WHITE).map_err(|e| plot_error(e.to_string()))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&self.title, ("sans-serif", 22).into_font())
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)
            .map_err(|e| plot_error(e.to_string()))?;

        chart
            .configure_mesh()
            .x_desc(self.x_label.as_str())
            .y_desc(self.y_label.as_str())
            .draw()
            .map_err(|e| plot_error(e.to_string()))?;

        for (series, color) in self.series.iter().zip(PALETTE.iter().cycle()) {
            let color = *color;
            if matches!(series.marker, Marker::Line | Marker::LineAndScatter) {
                chart
                    .draw_series(LineSeries::new(series.points.iter().copied(), color.stroke_width(2)))
                    .map_err(|e| plot_error(e.to_string()))?
                    .label(series.label.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }
            if matches!(series.marker, Marker::Scatter | Marker::LineAndScatter) {
                let drawn = chart
                    .draw_series(
                        series
                            .points
                            .iter()
                            .map(|&point| Circle::new(point, 3, color.filled())),
                    )
                    .map_err(|e| plot_error(e.to_string()))?;
                if series.marker == Marker::Scatter {
                    drawn
                        .label(series.label.as_str())
                        .legend(move |(x, y)| Circle::new((x + 10, y), 3, color.filled()));
                }
            }
        }

        if self.series.len() > 1 {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(|e| plot_error(e.to_string()))?;
        }

        root.present().map_err(|e| plot_error(e.to_string()))?;
        log::info!("wrote {}", path.display());
        Ok(())
    }
}

fn padded(min: f64, max: f64) -> Range<f64> {
    let span = max - min;
    let pad = if span > 0.0 { 0.05 * span } else { min.abs().max(1.0) * 0.05 };
    (min - pad)..(max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_cover_all_series_with_padding() {
        let chart = Chart::new("t", "x", "y")
            .with_series(Series::new("a", vec![(0.0, 1.0), (10.0, 3.0)], Marker::Line))
            .with_series(Series::new("b", vec![(5.0, -1.0), (f64::NAN, 100.0)], Marker::Scatter));
        let (x, y) = chart.ranges().unwrap();
        assert_eq!(x, -0.5..10.5);
        assert_eq!(y, -1.2..3.2);
    }

    #[test]
    fn flat_series_still_has_a_range() {
        let range = padded(2.0, 2.0);
        assert!(range.start < 2.0 && range.end > 2.0);
    }

    #[test]
    fn chart_without_points_is_rejected() {
        let chart = Chart::new("empty", "x", "y");
        assert!(matches!(chart.ranges(), Err(HydroError::Empty(_))));
    }

    #[test]
    fn renders_svg_file() {
        let path = std::env::temp_dir().join(format!("watershed_hydro_chart_{}.svg", std::process::id()));
        Chart::new("Unit hydrograph", "Time (hrs)", "Flow (m3/s per cm)")
            .with_series(Series::from_columns(
                "unit hydrograph",
                &[0.0, 1.0, 2.0, 3.0],
                &[0.0, 4.0, 2.5, 0.5],
                Marker::LineAndScatter,
            ))
            .render_svg(&path)
            .unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Unit hydrograph"));
    }
}
