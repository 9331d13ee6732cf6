//! Static Chart Renderer
//! Draws [`ChartData`] with plotters: SVG for the web page, PNG for the deck.

use crate::charts::{ChartData, ChartKind};
use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("No data to plot for '{0}'")]
    NoData(String),
    #[error("Failed to draw chart: {0}")]
    Render(String),
    #[error("Failed to encode chart image: {0}")]
    Encode(String),
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render to an inline `<svg>` document.
    pub fn render_svg(chart: &ChartData, width: u32, height: u32) -> Result<String, ChartError> {
        if chart.is_empty() {
            return Err(ChartError::NoData(chart.title.clone()));
        }

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
            Self::draw(root, chart).map_err(|e| ChartError::Render(e.to_string()))?;
        }
        Ok(svg)
    }

    /// Render to PNG bytes.
    pub fn render_png(chart: &ChartData, width: u32, height: u32) -> Result<Vec<u8>, ChartError> {
        if chart.is_empty() {
            return Err(ChartError::NoData(chart.title.clone()));
        }

        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            Self::draw(root, chart).map_err(|e| ChartError::Render(e.to_string()))?;
        }

        let image = RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| ChartError::Encode("pixel buffer size mismatch".to_string()))?;
        let mut png = Cursor::new(Vec::new());
        image
            .write_to(&mut png, ImageFormat::Png)
            .map_err(|e| ChartError::Encode(e.to_string()))?;
        Ok(png.into_inner())
    }

    fn draw<DB>(root: DrawingArea<DB, Shift>, chart: &ChartData) -> Result<(), Box<dyn std::error::Error>>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;

        let n = chart.points.len();
        let y_max = (chart.max_value() * 1.15).max(1.0);
        let labels: Vec<&str> = chart.points.iter().map(|(l, _)| l.as_str()).collect();
        let label_of = |v: &SegmentValue<usize>| -> String {
            match v {
                SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => {
                    labels.get(*i).map(|s| s.to_string()).unwrap_or_default()
                }
                SegmentValue::Last => String::new(),
            }
        };

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 18))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d((0..n).into_segmented(), 0f64..y_max)?;

        ctx.configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&label_of)
            .x_desc(chart.x_desc.as_str())
            .y_desc(chart.y_desc.as_str())
            .label_style(("sans-serif", 11))
            .draw()?;

        match chart.kind {
            ChartKind::Bar => {
                for (i, (_, value)) in chart.points.iter().enumerate() {
                    let color = chart.color(i);
                    ctx.draw_series(
                        Histogram::vertical(&ctx)
                            .style(color.mix(0.8).filled())
                            .margin(12)
                            .data(std::iter::once((i, *value))),
                    )?;
                }
            }
            ChartKind::Histogram => {
                let color = chart.color(0);
                ctx.draw_series(
                    Histogram::vertical(&ctx)
                        .style(color.mix(0.8).filled())
                        .margin(1)
                        .data(chart.points.iter().enumerate().map(|(i, (_, v))| (i, *v))),
                )?;
            }
            ChartKind::Line => {
                let color = chart.color(0);
                let points: Vec<(SegmentValue<usize>, f64)> = chart
                    .points
                    .iter()
                    .enumerate()
                    .map(|(i, (_, v))| (SegmentValue::CenterOf(i), *v))
                    .collect();
                ctx.draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?;
                ctx.draw_series(
                    points
                        .into_iter()
                        .map(|p| Circle::new(p, 3, color.filled())),
                )?;
            }
        }

        root.present()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartPlotter;
    use crate::stats::DashboardSummary;

    #[test]
    fn empty_chart_is_not_rendered() {
        let charts = ChartPlotter::dashboard_charts(&DashboardSummary::default());
        let err = StaticChartRenderer::render_svg(&charts[0], 400, 300).expect_err("no data");
        assert!(matches!(err, ChartError::NoData(_)));
        let err = StaticChartRenderer::render_png(&charts[0], 400, 300).expect_err("no data");
        assert!(matches!(err, ChartError::NoData(_)));
    }
}
